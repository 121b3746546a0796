use crate::ScalarValue;

/// Builder for a backend's tree.
///
/// Container handles are moved into [`FormatWriter::end_array`] and
/// [`FormatWriter::end_object`], so a closed container cannot receive more
/// children. Containers close in strictly nested order: every child is closed
/// before its parent.
pub trait FormatWriter {
    /// Handle to an open array.
    type Array;
    /// Handle to an open object.
    type Object;
    /// Handle to a finished leaf.
    type Var;

    /// Open an array as the root. `size` is a hint.
    fn array_as_root(&mut self, size: usize) -> Self::Array;
    /// Open an object as the root. `size` is a hint.
    fn object_as_root(&mut self, size: usize) -> Self::Object;
    /// Make the root null.
    fn null_as_root(&mut self) -> Self::Var;
    /// Make the root a scalar.
    fn value_as_root(&mut self, value: ScalarValue<'_>) -> Self::Var;

    /// Append an array to an array.
    fn add_array_to_array(&mut self, size: usize, parent: &mut Self::Array) -> Self::Array;
    /// Append an array under `name`.
    fn add_array_to_object(
        &mut self,
        name: &str,
        size: usize,
        parent: &mut Self::Object,
    ) -> Self::Array;
    /// Append an object to an array.
    fn add_object_to_array(&mut self, size: usize, parent: &mut Self::Array) -> Self::Object;
    /// Append an object under `name`.
    fn add_object_to_object(
        &mut self,
        name: &str,
        size: usize,
        parent: &mut Self::Object,
    ) -> Self::Object;
    /// Append a scalar to an array.
    fn add_value_to_array(&mut self, value: ScalarValue<'_>, parent: &mut Self::Array)
    -> Self::Var;
    /// Append a scalar under `name`.
    fn add_value_to_object(
        &mut self,
        name: &str,
        value: ScalarValue<'_>,
        parent: &mut Self::Object,
    ) -> Self::Var;
    /// Append a null to an array.
    fn add_null_to_array(&mut self, parent: &mut Self::Array) -> Self::Var;
    /// Append a null under `name`.
    fn add_null_to_object(&mut self, name: &str, parent: &mut Self::Object) -> Self::Var;

    /// Close an array.
    fn end_array(&mut self, array: Self::Array);
    /// Close an object.
    fn end_object(&mut self, object: Self::Object);
}

/// Where the node being written goes.
pub enum Parent<'p, W: FormatWriter + ?Sized> {
    /// The root of the tree.
    Root,
    /// The next item of an open array.
    Array(&'p mut W::Array),
    /// A keyed entry of an open object.
    Object(&'p mut W::Object, &'p str),
}

impl<W: FormatWriter + ?Sized> Parent<'_, W> {
    /// Open an array at this position.
    pub fn add_array(self, writer: &mut W, size: usize) -> W::Array {
        match self {
            Parent::Root => writer.array_as_root(size),
            Parent::Array(array) => writer.add_array_to_array(size, array),
            Parent::Object(object, name) => writer.add_array_to_object(name, size, object),
        }
    }

    /// Open an object at this position.
    pub fn add_object(self, writer: &mut W, size: usize) -> W::Object {
        match self {
            Parent::Root => writer.object_as_root(size),
            Parent::Array(array) => writer.add_object_to_array(size, array),
            Parent::Object(object, name) => writer.add_object_to_object(name, size, object),
        }
    }

    /// Write a scalar at this position.
    pub fn add_value(self, writer: &mut W, value: ScalarValue<'_>) -> W::Var {
        match self {
            Parent::Root => writer.value_as_root(value),
            Parent::Array(array) => writer.add_value_to_array(value, array),
            Parent::Object(object, name) => writer.add_value_to_object(name, value, object),
        }
    }

    /// Write a null at this position.
    pub fn add_null(self, writer: &mut W) -> W::Var {
        match self {
            Parent::Root => writer.null_as_root(),
            Parent::Array(array) => writer.add_null_to_array(array),
            Parent::Object(object, name) => writer.add_null_to_object(name, object),
        }
    }
}
