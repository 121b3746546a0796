use core::{fmt, str};
use std::io;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number, Value};
use tessera_format::{Built, Model, ScalarValue, TreeWriter, serialize_root};

use crate::{JsonError, trace};

/// Options for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Whether to pretty-print with indentation (default: false)
    pub pretty: bool,

    /// Indentation string for pretty-printing (default: "  ")
    pub indent: &'static str,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ",
        }
    }
}

impl SerializeOptions {
    /// Create new default options (compact output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing with default indentation.
    pub const fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Set a custom indentation string (implies pretty-printing).
    pub const fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self.pretty = true;
        self
    }
}

/// Writer building a `serde_json::Value`.
pub type JsonWriter = TreeWriter<Value>;

fn leaf(value: ScalarValue<'_>) -> Value {
    match value {
        ScalarValue::Str(s) => Value::String(s.to_owned()),
        ScalarValue::Bool(b) => Value::Bool(b),
        // NaN and infinities have no JSON form and become null
        ScalarValue::F64(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        ScalarValue::I64(v) => Value::Number(v.into()),
        ScalarValue::U64(v) => Value::Number(v.into()),
    }
}

/// Create a writer whose tree is assembled into a `Value`.
pub fn json_writer() -> JsonWriter {
    TreeWriter::new(leaf)
}

/// Assemble a finished writer into its `Value`.
pub fn finish(writer: JsonWriter) -> Value {
    writer.finish(|built| match built {
        Built::Null => Value::Null,
        Built::Leaf(value) => value,
        Built::Array(items) => Value::Array(items),
        Built::Object(entries) => Value::Object(entries.into_iter().collect::<Map<_, _>>()),
    })
}

/// Convert a value to a `serde_json::Value`.
pub fn to_value<T: Model>(value: &T) -> Value {
    trace!(type_name = T::SHAPE.type_identifier, "to_value");
    let mut writer = json_writer();
    serialize_root(value, &mut writer);
    finish(writer)
}

/// Serialize a value to a compact JSON string.
pub fn to_string<T: Model>(value: &T) -> String {
    to_value(value).to_string()
}

/// Serialize a value to JSON indented with two spaces.
pub fn to_string_pretty<T: Model>(value: &T) -> String {
    format!("{:#}", to_value(value))
}

/// Serialize a value to a JSON string with custom options.
pub fn to_string_with_options<T: Model>(value: &T, options: &SerializeOptions) -> String {
    Rendered {
        value: &to_value(value),
        options,
    }
    .to_string()
}

/// Serialize a value to compact JSON bytes.
pub fn to_vec<T: Model>(value: &T) -> Vec<u8> {
    to_string(value).into_bytes()
}

/// Serialize a value to JSON bytes with custom options.
pub fn to_vec_with_options<T: Model>(value: &T, options: &SerializeOptions) -> Vec<u8> {
    to_string_with_options(value, options).into_bytes()
}

/// Serialize a value as compact JSON into an `io::Write`.
pub fn to_writer<W: io::Write, T: Model>(writer: W, value: &T) -> Result<(), JsonError> {
    to_writer_with_options(writer, value, &SerializeOptions::default())
}

/// Serialize a value as JSON into an `io::Write` with custom options.
pub fn to_writer_with_options<W: io::Write, T: Model>(
    writer: W,
    value: &T,
    options: &SerializeOptions,
) -> Result<(), JsonError> {
    write_value(writer, &to_value(value), options)
}

fn write_value<W: io::Write>(
    writer: W,
    value: &Value,
    options: &SerializeOptions,
) -> Result<(), JsonError> {
    if options.pretty {
        let formatter = PrettyFormatter::with_indent(options.indent.as_bytes());
        emit(writer, value, formatter)
    } else {
        emit(writer, value, CompactFormatter)
    }
}

/// A value rendered under some options through `Display`.
struct Rendered<'a> {
    value: &'a Value,
    options: &'a SerializeOptions,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(FmtWriter { inner: f }, self.value, self.options).map_err(|_| fmt::Error)
    }
}

/// `io::Write` over a formatter. serde_json writes whole UTF-8 runs.
struct FmtWriter<'a, 'b> {
    inner: &'a mut fmt::Formatter<'b>,
}

impl io::Write for FmtWriter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            str::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.inner.write_str(text).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn emit<W: io::Write, F: Formatter>(writer: W, value: &Value, formatter: F) -> Result<(), JsonError> {
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut ser)?;
    Ok(())
}
