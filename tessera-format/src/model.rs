use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;

use crate::{
    BasicType, Def, FormatReader, FormatWriter, Parent, ReadError, Result, ScalarKind,
    ScalarValue, Shape, ShapeFn, read_element, trace,
};

/// A type with a tree representation.
///
/// `read` turns a node into a value and `write` emits the value as exactly one
/// node at `parent`. Usually derived with `#[derive(Model)]`.
pub trait Model: Sized {
    /// Static description of the tree layout.
    const SHAPE: &'static Shape;

    /// Read a value from `var`.
    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self>;

    /// Write the value as one node at `parent`.
    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>);

    /// The value an absent field takes, if the type tolerates absence.
    fn vacant() -> Option<Self> {
        None
    }
}

/// The shape of `T`, usable as a [`ShapeFn`].
pub fn shape_of<T: Model>() -> &'static Shape {
    T::SHAPE
}

macro_rules! impl_model_basic {
    ($($ty:ty),*) => {$(
        impl Model for $ty {
            const SHAPE: &'static Shape =
                &Shape::scalar(stringify!($ty), <$ty as BasicType>::KIND);

            fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
                reader.to_basic_type(var)
            }

            fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
                parent.add_value(writer, self.to_scalar_value());
            }
        }
    )*};
}

impl_model_basic!(
    String, bool, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize
);

impl Model for char {
    const SHAPE: &'static Shape = &Shape::scalar("char", ScalarKind::String);

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let text: String = reader.to_basic_type(var)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ReadError::type_mismatch(
                "single character",
                format!("string {text:?}"),
            )),
        }
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        let mut buf = [0u8; 4];
        parent.add_value(writer, ScalarValue::Str(self.encode_utf8(&mut buf)));
    }
}

impl Model for () {
    const SHAPE: &'static Shape = &Shape::new("()", Def::Unit);

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        if reader.is_empty(var) {
            Ok(())
        } else {
            Err(ReadError::type_mismatch("null", reader.kind_name(var)))
        }
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        parent.add_null(writer);
    }
}

impl<T: Model> Model for Option<T> {
    const SHAPE: &'static Shape = &Shape::new("Option", Def::Option(shape_of::<T>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        if reader.is_empty(var) {
            Ok(None)
        } else {
            T::read(reader, var).map(Some)
        }
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        match self {
            Some(value) => value.write(writer, parent),
            None => {
                parent.add_null(writer);
            }
        }
    }

    fn vacant() -> Option<Self> {
        Some(None)
    }
}

impl<T: Model> Model for Box<T> {
    const SHAPE: &'static Shape = &Shape::new("Box", Def::Pointer(shape_of::<T>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        T::read(reader, var).map(Box::new)
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        (**self).write(writer, parent)
    }

    fn vacant() -> Option<Self> {
        T::vacant().map(Box::new)
    }
}

fn read_items<'de, T, R>(reader: &R, var: R::Var, mut push: impl FnMut(T)) -> Result<()>
where
    T: Model,
    R: FormatReader<'de>,
{
    let array = reader.to_array(var)?;
    let mut index = 0;
    reader.read_array(array, |item| {
        let value = T::read(reader, item).map_err(|e| e.with_index(index))?;
        push(value);
        index += 1;
        Ok(())
    })
}

fn write_items<'a, T, W>(
    items: impl ExactSizeIterator<Item = &'a T>,
    writer: &mut W,
    parent: Parent<'_, W>,
) where
    T: Model + 'a,
    W: FormatWriter,
{
    let mut array = parent.add_array(writer, items.len());
    for item in items {
        item.write(writer, Parent::Array(&mut array));
    }
    writer.end_array(array);
}

impl<T: Model> Model for Vec<T> {
    const SHAPE: &'static Shape = &Shape::new("Vec", Def::List(shape_of::<T>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let mut out = Vec::new();
        read_items(reader, var, |v| out.push(v))?;
        Ok(out)
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        write_items(self.iter(), writer, parent)
    }
}

impl<T: Model> Model for VecDeque<T> {
    const SHAPE: &'static Shape = &Shape::new("VecDeque", Def::List(shape_of::<T>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let mut out = VecDeque::new();
        read_items(reader, var, |v| out.push_back(v))?;
        Ok(out)
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        write_items(self.iter(), writer, parent)
    }
}

impl<T: Model, const N: usize> Model for [T; N] {
    const SHAPE: &'static Shape = &Shape::new(
        "array",
        Def::Array {
            item: shape_of::<T>,
            len: N,
        },
    );

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let mut out = Vec::with_capacity(N);
        read_items(reader, var, |v| out.push(v))?;
        out.try_into().map_err(|items: Vec<T>| {
            ReadError::type_mismatch("fixed-length array", format!("array of {} items", items.len()))
        })
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        write_items(self.iter(), writer, parent)
    }
}

/// Item shapes of a tuple type, kept in an associated constant so the slice
/// is a top-level borrow.
struct TupleItems<T>(core::marker::PhantomData<T>);

macro_rules! impl_model_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Model),+> TupleItems<($($name,)+)> {
            const ITEMS: &'static [ShapeFn] = &[$(shape_of::<$name>),+];
        }

        impl<$($name: Model),+> Model for ($($name,)+) {
            const SHAPE: &'static Shape =
                &Shape::new("tuple", Def::Tuple(TupleItems::<($($name,)+)>::ITEMS));

            fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
                let array = reader.to_array(var)?;
                Ok(($(read_element(reader, array, $idx)?,)+))
            }

            fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
                let mut array = parent.add_array(writer, [$($idx),+].len());
                $(self.$idx.write(writer, Parent::Array(&mut array));)+
                writer.end_array(array);
            }
        }
    };
}

impl_model_tuple!(A: 0);
impl_model_tuple!(A: 0, B: 1);
impl_model_tuple!(A: 0, B: 1, C: 2);
impl_model_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_model_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_model_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

fn read_entries<'de, V, R>(reader: &R, var: R::Var, mut insert: impl FnMut(String, V)) -> Result<()>
where
    V: Model,
    R: FormatReader<'de>,
{
    let object = reader.to_object(var)?;
    reader.read_object(object, |key, value| {
        let value = V::read(reader, value).map_err(|e| e.with_field(key))?;
        insert(key.to_owned(), value);
        Ok(())
    })
}

fn write_entries<'a, V, W>(
    entries: impl ExactSizeIterator<Item = (&'a String, &'a V)>,
    writer: &mut W,
    parent: Parent<'_, W>,
) where
    V: Model + 'a,
    W: FormatWriter,
{
    let mut object = parent.add_object(writer, entries.len());
    for (key, value) in entries {
        value.write(writer, Parent::Object(&mut object, key));
    }
    writer.end_object(object);
}

impl<V: Model, H: BuildHasher + Default> Model for HashMap<String, V, H> {
    const SHAPE: &'static Shape = &Shape::new("HashMap", Def::Map(shape_of::<V>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let mut out = HashMap::default();
        read_entries(reader, var, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }

    // keys are sorted so the written form does not depend on hasher state
    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        trace!(len = entries.len(), "writing map");
        write_entries(entries.into_iter(), writer, parent)
    }
}

impl<V: Model> Model for BTreeMap<String, V> {
    const SHAPE: &'static Shape = &Shape::new("BTreeMap", Def::Map(shape_of::<V>));

    fn read<'de, R: FormatReader<'de>>(reader: &R, var: R::Var) -> Result<Self> {
        let mut out = BTreeMap::new();
        read_entries(reader, var, |k, v| {
            out.insert(k, v);
        })?;
        Ok(out)
    }

    fn write<W: FormatWriter>(&self, writer: &mut W, parent: Parent<'_, W>) {
        write_entries(self.iter(), writer, parent)
    }
}
