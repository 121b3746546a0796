use crate::ScalarKind;

/// Lazily resolved reference to another shape.
///
/// Shapes refer to each other through function pointers so that recursive
/// types (a record holding a `Box` of itself) can still be described by
/// `'static` constants.
pub type ShapeFn = fn() -> &'static Shape;

/// Static description of how a type maps onto a tree.
#[derive(Debug)]
pub struct Shape {
    /// Name used in diagnostics.
    pub type_identifier: &'static str,
    /// Layout of the type's tree node.
    pub def: Def,
    /// True when the type takes over its own reading from a single node.
    pub custom_constructor: bool,
}

/// Tree layout of a type.
#[derive(Debug, Clone, Copy)]
pub enum Def {
    /// Written as null; only a null node reads back.
    Unit,
    /// A single scalar node.
    Scalar(ScalarKind),
    /// Null or the inner type.
    Option(ShapeFn),
    /// Heap indirection with the inner type's tree shape.
    Pointer(ShapeFn),
    /// Variable-length array of one item type.
    List(ShapeFn),
    /// Fixed-length array of one item type.
    Array {
        /// Item type.
        item: ShapeFn,
        /// Required length.
        len: usize,
    },
    /// Fixed-length array of positional items.
    Tuple(&'static [ShapeFn]),
    /// Object with string keys and one value type.
    Map(ShapeFn),
    /// Object with declared fields.
    Record(&'static [Field]),
    /// One of several tagged variants.
    Enum(&'static [Variant]),
}

/// How the record traversal treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar child.
    Scalar,
    /// An array child.
    Array,
    /// An object child.
    Object,
    /// Fields promoted into the parent object.
    Flatten,
    /// A child that may be null or absent.
    Optional,
    /// A child read by its type's custom constructor.
    Custom,
}

/// One declared field of a record.
#[derive(Debug)]
pub struct Field {
    /// Key in the tree, after any renaming.
    pub name: &'static str,
    /// The field's type.
    pub shape: ShapeFn,
    /// The field's own fields are promoted into the parent.
    pub flatten: bool,
    /// An absent key reads as the type's default value.
    pub has_default: bool,
}

impl Field {
    /// A plain keyed field.
    pub const fn new(name: &'static str, shape: ShapeFn) -> Self {
        Field {
            name,
            shape,
            flatten: false,
            has_default: false,
        }
    }

    /// A field whose record is inlined into the parent.
    pub const fn flattened(name: &'static str, shape: ShapeFn) -> Self {
        Field {
            name,
            shape,
            flatten: true,
            has_default: false,
        }
    }

    /// Mark the field as defaulted when absent.
    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Classify the field for traversal.
    pub fn kind(&self) -> FieldKind {
        if self.flatten {
            return FieldKind::Flatten;
        }
        classify((self.shape)())
    }
}

fn classify(shape: &Shape) -> FieldKind {
    if shape.custom_constructor {
        return FieldKind::Custom;
    }
    match shape.def {
        Def::Pointer(inner) => classify(inner()),
        Def::Option(_) => FieldKind::Optional,
        Def::Unit | Def::Scalar(_) => FieldKind::Scalar,
        Def::List(_) | Def::Array { .. } | Def::Tuple(_) => FieldKind::Array,
        Def::Map(_) | Def::Record(_) | Def::Enum(_) => FieldKind::Object,
    }
}

/// One declared variant of an enum.
#[derive(Debug)]
pub struct Variant {
    /// Tag in the tree, after any renaming.
    pub name: &'static str,
    /// Payload layout.
    pub kind: VariantKind,
}

/// Payload carried by an enum variant.
#[derive(Debug, Clone, Copy)]
pub enum VariantKind {
    /// No payload; written as the bare tag string.
    Unit,
    /// A single unnamed payload.
    Newtype(ShapeFn),
    /// Several positional payloads.
    Tuple(&'static [ShapeFn]),
    /// Named payload fields.
    Record(&'static [Field]),
}

impl Shape {
    /// A scalar shape.
    pub const fn scalar(type_identifier: &'static str, kind: ScalarKind) -> Self {
        Shape {
            type_identifier,
            def: Def::Scalar(kind),
            custom_constructor: false,
        }
    }

    /// Shape of a given layout.
    pub const fn new(type_identifier: &'static str, def: Def) -> Self {
        Shape {
            type_identifier,
            def,
            custom_constructor: false,
        }
    }

    /// Mark the type as reading itself through a custom constructor.
    pub const fn with_custom_constructor(mut self) -> Self {
        self.custom_constructor = true;
        self
    }

    /// The declared fields when this is a record, looking through pointers.
    pub fn record_fields(&self) -> Option<&'static [Field]> {
        match self.def {
            Def::Record(fields) => Some(fields),
            Def::Pointer(inner) => inner().record_fields(),
            _ => None,
        }
    }

    /// The fields that appear as keys of this record's object node.
    ///
    /// Flattened fields are replaced by their own visible fields, transitively,
    /// so the result is the flat key set in write order.
    pub fn visible_fields(&self) -> Vec<&'static Field> {
        let mut out = Vec::new();
        if let Some(fields) = self.record_fields() {
            collect_visible(fields, &mut out);
        }
        out
    }

    /// First key that appears more than once among the visible fields.
    pub fn duplicate_field_name(&self) -> Option<&'static str> {
        let fields = self.visible_fields();
        fields.iter().enumerate().find_map(|(i, field)| {
            fields[..i]
                .iter()
                .any(|earlier| earlier.name == field.name)
                .then_some(field.name)
        })
    }
}

fn collect_visible(fields: &'static [Field], out: &mut Vec<&'static Field>) {
    for field in fields {
        if field.flatten {
            if let Some(inner) = (field.shape)().record_fields() {
                collect_visible(inner, out);
            }
        } else {
            out.push(field);
        }
    }
}
