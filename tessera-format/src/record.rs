use crate::{
    Def, ErrorKind, FormatReader, FormatWriter, Model, Parent, ReadError, Result, ScalarValue,
    Shape, VariantKind, debug, trace,
};

/// A type written as an object of named fields.
///
/// Derived for structs with named fields. Flattened members contribute their
/// own fields to the parent's object through `write_fields`/`read_fields`.
pub trait Record: Model {
    /// Number of keys this record contributes to its object, counting
    /// flattened members' fields.
    const FIELD_COUNT: usize;

    /// Reject keys that match no visible field.
    const DENY_UNKNOWN_FIELDS: bool = false;

    /// Keys in declaration order, flattened members nested.
    const KEYS: &'static [RecordKey];

    /// Emit each field into an already-open object.
    fn write_fields<W: FormatWriter>(&self, writer: &mut W, object: &mut W::Object);

    /// Read each field from an object node.
    fn read_fields<'de, R: FormatReader<'de>>(reader: &R, object: R::Object) -> Result<Self>;
}

impl<T: Record> Record for Box<T> {
    const FIELD_COUNT: usize = T::FIELD_COUNT;
    const DENY_UNKNOWN_FIELDS: bool = T::DENY_UNKNOWN_FIELDS;
    const KEYS: &'static [RecordKey] = T::KEYS;

    fn write_fields<W: FormatWriter>(&self, writer: &mut W, object: &mut W::Object) {
        (**self).write_fields(writer, object)
    }

    fn read_fields<'de, R: FormatReader<'de>>(reader: &R, object: R::Object) -> Result<Self> {
        T::read_fields(reader, object).map(Box::new)
    }
}

/// One entry of [`Record::KEYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    /// A key written by the record itself.
    Name(&'static str),
    /// The keys of a flattened member.
    Flatten(&'static [RecordKey]),
}

const fn same_key(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn occurrences(keys: &[RecordKey], name: &str) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < keys.len() {
        count += match keys[i] {
            RecordKey::Name(key) => same_key(key, name) as usize,
            RecordKey::Flatten(inner) => occurrences(inner, name),
        };
        i += 1;
    }
    count
}

const fn first_repeated(
    keys: &'static [RecordKey],
    all: &'static [RecordKey],
) -> Option<&'static str> {
    let mut i = 0;
    while i < keys.len() {
        match keys[i] {
            RecordKey::Name(key) => {
                if occurrences(all, key) > 1 {
                    return Some(key);
                }
            }
            RecordKey::Flatten(inner) => {
                if let Some(key) = first_repeated(inner, all) {
                    return Some(key);
                }
            }
        }
        i += 1;
    }
    None
}

/// The first key that occurs twice once flattened members are expanded.
///
/// Usable in constants; derived records assert at compile time that this is
/// `None`.
pub const fn duplicate_key(keys: &'static [RecordKey]) -> Option<&'static str> {
    first_repeated(keys, keys)
}

/// Write a record as one object holding all of its visible fields.
pub fn write_record<T: Record, W: FormatWriter>(value: &T, writer: &mut W, parent: Parent<'_, W>) {
    const {
        assert!(
            duplicate_key(T::KEYS).is_none(),
            "record has two fields with the same key"
        )
    };
    trace!(type_name = T::SHAPE.type_identifier, "write_record");
    let mut object = parent.add_object(writer, T::FIELD_COUNT);
    value.write_fields(writer, &mut object);
    writer.end_object(object);
}

/// Read a record from an object node.
pub fn read_record<'de, T: Record, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<T> {
    const {
        assert!(
            duplicate_key(T::KEYS).is_none(),
            "record has two fields with the same key"
        )
    };
    trace!(type_name = T::SHAPE.type_identifier, "read_record");
    let object = reader.to_object(var)?;
    if T::DENY_UNKNOWN_FIELDS {
        reject_unknown_fields(T::SHAPE, reader, object)?;
    }
    T::read_fields(reader, object)
}

fn reject_unknown_fields<'de, R: FormatReader<'de>>(
    shape: &'static Shape,
    reader: &R,
    object: R::Object,
) -> Result<()> {
    let fields = shape.visible_fields();
    reader.read_object(object, |key, _| {
        if fields.iter().any(|f| f.name == key) {
            Ok(())
        } else {
            Err(ErrorKind::UnknownField {
                field: key.to_owned(),
                type_name: shape.type_identifier,
            }
            .into())
        }
    })
}

/// Write one keyed field into an open object.
pub fn write_field<T: Model, W: FormatWriter>(
    value: &T,
    name: &str,
    writer: &mut W,
    object: &mut W::Object,
) {
    value.write(writer, Parent::Object(object, name));
}

/// Read one keyed field.
///
/// An absent key yields the type's vacancy when it has one (`None` for
/// options) and `FieldNotFound` otherwise. Errors from below are tagged with
/// the field's name.
pub fn read_field<'de, T: Model, R: FormatReader<'de>>(
    reader: &R,
    object: R::Object,
    name: &str,
) -> Result<T> {
    match reader.get_field(name, object) {
        Ok(var) => T::read(reader, var).map_err(|e| e.with_field(name)),
        Err(err) if err.is_field_not_found() => match T::vacant() {
            Some(value) => {
                trace!(field = name, "absent field is vacant");
                Ok(value)
            }
            None => Err(err),
        },
        Err(err) => Err(err),
    }
}

/// Read one keyed field, falling back to `Default` when the key is absent.
pub fn read_field_or_default<'de, T: Model + Default, R: FormatReader<'de>>(
    reader: &R,
    object: R::Object,
    name: &str,
) -> Result<T> {
    match reader.get_field(name, object) {
        Ok(var) => T::read(reader, var).map_err(|e| e.with_field(name)),
        Err(err) if err.is_field_not_found() => Ok(T::default()),
        Err(err) => Err(err),
    }
}

/// Read a flattened member from the parent's own object.
pub fn read_flattened<'de, T: Record, R: FormatReader<'de>>(
    reader: &R,
    object: R::Object,
) -> Result<T> {
    T::read_fields(reader, object)
}

/// Read one positional item of an array.
pub fn read_element<'de, T: Model, R: FormatReader<'de>>(
    reader: &R,
    array: R::Array,
    index: usize,
) -> Result<T> {
    let var = reader.get_field_by_index(index, array)?;
    T::read(reader, var).map_err(|e| e.with_index(index))
}

/// Write an enum variant carrying a payload as `{ tag: payload }`.
///
/// `payload` writes exactly one node at the parent it is handed.
pub fn write_tagged<W, F>(tag: &str, writer: &mut W, parent: Parent<'_, W>, payload: F)
where
    W: FormatWriter,
    F: FnOnce(&mut W, Parent<'_, W>),
{
    let mut object = parent.add_object(writer, 1);
    payload(writer, Parent::Object(&mut object, tag));
    writer.end_object(object);
}

/// Split an enum node into its tag and optional payload.
///
/// A bare string is a unit variant. An object with exactly one key is a
/// variant carrying the key's value. Anything else is `TypeMismatch`.
pub fn read_variant_tag<'de, R: FormatReader<'de>>(
    reader: &R,
    var: R::Var,
) -> Result<(String, Option<R::Var>)> {
    if let Ok(object) = reader.to_object(var) {
        let mut found = None;
        let mut count = 0usize;
        reader.read_object(object, |key, value| {
            count += 1;
            if found.is_none() {
                found = Some((key.to_owned(), value));
            }
            Ok(())
        })?;
        return match (found, count) {
            (Some((tag, payload)), 1) => Ok((tag, Some(payload))),
            _ => Err(ReadError::type_mismatch(
                "object with exactly one variant key",
                format!("object with {count} keys"),
            )),
        };
    }
    match reader.to_basic_type::<String>(var) {
        Ok(tag) => Ok((tag, None)),
        Err(_) => Err(ReadError::type_mismatch(
            "enum variant",
            reader.kind_name(var),
        )),
    }
}

/// Error for a tag that matched no arm of a derived enum reader.
///
/// A declared tag whose payload presence is wrong (a unit variant written
/// with a payload or the reverse) is a `TypeMismatch`; an undeclared tag is
/// `UnknownVariant`.
pub fn unexpected_variant(shape: &'static Shape, tag: &str) -> ReadError {
    let declared = match shape.def {
        Def::Enum(variants) => variants.iter().find(|v| v.name == tag),
        _ => None,
    };
    let err = match declared {
        Some(variant) => {
            let (expected, got) = match variant.kind {
                VariantKind::Unit => ("bare variant name", "variant with payload"),
                _ => ("variant with payload", "bare variant name"),
            };
            ReadError::type_mismatch(expected, got).with_field(tag)
        }
        None => ErrorKind::UnknownVariant {
            variant: tag.to_owned(),
            type_name: shape.type_identifier,
        }
        .into(),
    };
    debug!(%err, "enum read failed");
    err
}

/// Write a unit variant as its bare tag.
pub fn write_unit_variant<W: FormatWriter>(tag: &str, writer: &mut W, parent: Parent<'_, W>) {
    parent.add_value(writer, ScalarValue::Str(tag));
}
