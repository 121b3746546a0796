#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use core::fmt::{Debug, Display};
use std::collections::BTreeMap;
use std::error::Error;

use indoc::formatdoc;
use tessera::{CustomConstructor, ErrorKind, FormatReader, Model, ReadError};

/// Trait every format backend implements to participate in the suite.
///
/// Each method returning a [`CaseSpec`] corresponds to a canonical case. A
/// new case adds a required method, so every backend has to provide its
/// input.
pub trait FormatSuite {
    /// Backend error type.
    type Error: Debug + Display;

    /// Human-readable name for diagnostics.
    fn format_name() -> &'static str;

    /// Read `input` as a `T`.
    fn deserialize<T: Model>(input: &[u8]) -> Result<T, Self::Error>;

    /// Write `value` out. Writing never fails.
    fn serialize<T: Model>(value: &T) -> Vec<u8>;

    /// The engine error inside a backend error, if there is one.
    fn read_error(error: &Self::Error) -> Option<&ReadError>;

    /// Case: object with a single string field.
    fn struct_single_field() -> CaseSpec;
    /// Case: array of unsigned integers.
    fn sequence_numbers() -> CaseSpec;
    /// Case: record holding a child record and a string list.
    fn struct_nested() -> CaseSpec;
    /// Case: two records flattened into a third, as one flat object.
    fn flatten_composition() -> CaseSpec;
    /// Case: absent optional field reads as `None`.
    fn optional_missing() -> CaseSpec;
    /// Case: absent required field is `FieldNotFound`.
    fn required_missing() -> CaseSpec;
    /// Case: string where a number is expected is `TypeMismatch`.
    fn string_for_number() -> CaseSpec;
    /// Case: array where an object is expected is `TypeMismatch`.
    fn array_for_object() -> CaseSpec;
    /// Case: tuple read from an array that is too short.
    fn tuple_too_short() -> CaseSpec;
    /// Case: unit variants as bare strings.
    fn enum_unit() -> CaseSpec;
    /// Case: tag that names no variant.
    fn enum_unknown_variant() -> CaseSpec;
    /// Case: struct variant as a single-key object.
    fn enum_complex() -> CaseSpec;
    /// Case: extreme signed values at every width, and -1.
    fn signed_boundaries() -> CaseSpec;
    /// Case: custom constructor accepting a node the field model would reject.
    fn custom_constructor() -> CaseSpec;
    /// Case: string-keyed map of integers.
    fn map_of_scalars() -> CaseSpec;
}

/// Enumerate every canonical case with its typed descriptor.
pub fn all_cases<S: FormatSuite>() -> Vec<SuiteCase> {
    vec![
        SuiteCase::new::<S, StructSingleField>(&CASE_STRUCT_SINGLE_FIELD, S::struct_single_field),
        SuiteCase::new::<S, Vec<u64>>(&CASE_SEQUENCE_NUMBERS, S::sequence_numbers),
        SuiteCase::new::<S, NestedParent>(&CASE_STRUCT_NESTED, S::struct_nested),
        SuiteCase::new::<S, Composite>(&CASE_FLATTEN_COMPOSITION, S::flatten_composition),
        SuiteCase::new::<S, Profile>(&CASE_OPTIONAL_MISSING, S::optional_missing),
        SuiteCase::new::<S, Profile>(&CASE_REQUIRED_MISSING, S::required_missing),
        SuiteCase::new::<S, Counter>(&CASE_STRING_FOR_NUMBER, S::string_for_number),
        SuiteCase::new::<S, NestedParent>(&CASE_ARRAY_FOR_OBJECT, S::array_for_object),
        SuiteCase::new::<S, (u8, u8)>(&CASE_TUPLE_TOO_SHORT, S::tuple_too_short),
        SuiteCase::new::<S, Vec<Color>>(&CASE_ENUM_UNIT, S::enum_unit),
        SuiteCase::new::<S, Color>(&CASE_ENUM_UNKNOWN_VARIANT, S::enum_unknown_variant),
        SuiteCase::new::<S, ComplexEnum>(&CASE_ENUM_COMPLEX, S::enum_complex),
        SuiteCase::new::<S, Boundaries>(&CASE_SIGNED_BOUNDARIES, S::signed_boundaries),
        SuiteCase::new::<S, Point>(&CASE_CUSTOM_CONSTRUCTOR, S::custom_constructor),
        SuiteCase::new::<S, BTreeMap<String, i32>>(&CASE_MAP_OF_SCALARS, S::map_of_scalars),
    ]
}

/// Specification returned by each trait method.
#[derive(Debug, Clone, Copy)]
pub struct CaseSpec {
    input: &'static [u8],
    note: Option<&'static str>,
}

impl CaseSpec {
    /// Provide raw bytes for the case input.
    pub const fn from_bytes(input: &'static [u8]) -> Self {
        Self { input, note: None }
    }

    /// Convenience for UTF-8 inputs.
    #[allow(clippy::should_implement_trait)]
    pub const fn from_str(input: &'static str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Attach an optional note for diagnostics.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }
}

enum Expected<T> {
    Value(fn() -> T),
    Error {
        kind: &'static str,
        matches: fn(&ErrorKind) -> bool,
    },
}

struct CaseDescriptor<T> {
    id: &'static str,
    description: &'static str,
    expected: Expected<T>,
}

/// Result of running one case.
#[derive(Debug)]
pub enum CaseOutcome {
    /// Every check held.
    Passed,
    /// A check failed; the message says which.
    Failed(String),
}

/// One runnable case bound to a backend.
pub struct SuiteCase {
    /// Stable identifier, e.g. `struct::nested`.
    pub id: &'static str,
    /// One-line description.
    pub description: &'static str,
    runner: Box<dyn Fn() -> CaseOutcome + Send + Sync + 'static>,
}

impl SuiteCase {
    fn new<S, T>(desc: &'static CaseDescriptor<T>, provider: fn() -> CaseSpec) -> Self
    where
        S: FormatSuite,
        T: Model + Debug + PartialEq + 'static,
    {
        let spec = provider();
        let runner = move || execute_case::<S, T>(desc, spec);
        Self {
            id: desc.id,
            description: desc.description,
            runner: Box::new(runner),
        }
    }

    /// Run the case.
    pub fn run(&self) -> CaseOutcome {
        (self.runner)()
    }
}

fn execute_case<S, T>(desc: &'static CaseDescriptor<T>, spec: CaseSpec) -> CaseOutcome
where
    S: FormatSuite,
    T: Model + Debug + PartialEq,
{
    let input = spec.input;
    tracing::debug!(format = S::format_name(), case = desc.id, "running case");
    emit_case_showcase::<S, T>(desc, &spec, input);

    match &desc.expected {
        Expected::Error { kind, matches } => match S::deserialize::<T>(input) {
            Ok(value) => CaseOutcome::Failed(format!(
                "{} ({}): expected a {kind} error, read {value:?}",
                desc.id, desc.description
            )),
            Err(err) => match S::read_error(&err) {
                Some(read) if matches(read.kind()) => CaseOutcome::Passed,
                _ => CaseOutcome::Failed(format!(
                    "{} ({}): expected a {kind} error, got: {err}",
                    desc.id, desc.description
                )),
            },
        },
        Expected::Value(make) => check_value::<S, T>(desc, input, make()),
    }
}

fn check_value<S, T>(
    desc: &'static CaseDescriptor<T>,
    input: &[u8],
    expected: T,
) -> CaseOutcome
where
    S: FormatSuite,
    T: Model + Debug + PartialEq,
{
    let actual = match S::deserialize::<T>(input) {
        Ok(value) => value,
        Err(err) => {
            return CaseOutcome::Failed(format!("{}: deserialize failed: {err}", desc.id));
        }
    };
    if actual != expected {
        return CaseOutcome::Failed(formatdoc!(
            "
            {id} ({description}) produced unexpected value
            expected: {expected:#?}
              actual: {actual:#?}
            ",
            id = desc.id,
            description = desc.description,
        ));
    }

    let first = S::serialize(&actual);
    let again = match S::deserialize::<T>(&first) {
        Ok(value) => value,
        Err(err) => {
            return CaseOutcome::Failed(format!(
                "{}: round-trip deserialize failed: {err}\noutput: {}",
                desc.id,
                render_bytes(&first)
            ));
        }
    };
    if again != actual {
        return CaseOutcome::Failed(format!(
            "{}: round-trip mismatch\nbefore: {actual:#?}\n after: {again:#?}",
            desc.id
        ));
    }

    let second = S::serialize(&again);
    if first != second {
        return CaseOutcome::Failed(format!(
            "{}: writing is not a fixed point\n first: {}\nsecond: {}",
            desc.id,
            render_bytes(&first),
            render_bytes(&second)
        ));
    }
    CaseOutcome::Passed
}

/// UTF-8 text as is, anything else as hex.
fn render_bytes(bytes: &[u8]) -> String {
    match core::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn emit_case_showcase<S, T>(desc: &CaseDescriptor<T>, spec: &CaseSpec, input: &[u8])
where
    S: FormatSuite,
{
    let note_line = spec.note.map(|n| format!("note: {n}\n")).unwrap_or_default();
    println!(
        "{}",
        formatdoc!(
            "
            ── tessera-format-suite :: {format_name} :: {case_id} ──
            description: {description}
            {note_line}input:
            {input}
            ",
            format_name = S::format_name(),
            case_id = desc.id,
            description = desc.description,
            input = render_bytes(input),
        )
    );
}

const CASE_STRUCT_SINGLE_FIELD: CaseDescriptor<StructSingleField> = CaseDescriptor {
    id: "struct::single_field",
    description: "single-field object parsed into StructSingleField",
    expected: Expected::Value(|| StructSingleField {
        name: "tessera".into(),
    }),
};

const CASE_SEQUENCE_NUMBERS: CaseDescriptor<Vec<u64>> = CaseDescriptor {
    id: "sequence::numbers",
    description: "array of unsigned integers parsed into Vec<u64>",
    expected: Expected::Value(|| vec![1, 2, 3]),
};

const CASE_STRUCT_NESTED: CaseDescriptor<NestedParent> = CaseDescriptor {
    id: "struct::nested",
    description: "struct containing nested child and tag list",
    expected: Expected::Value(|| NestedParent {
        id: 42,
        child: NestedChild {
            code: "alpha".into(),
            active: true,
        },
        tags: vec!["core".into(), "wire".into()],
    }),
};

const CASE_FLATTEN_COMPOSITION: CaseDescriptor<Composite> = CaseDescriptor {
    id: "struct::flatten_composition",
    description: "flat object with keys f1..f5 parsed into two flattened records plus f5",
    expected: Expected::Value(|| Composite {
        a: PartA {
            f1: "one".into(),
            f2: -2,
        },
        b: PartB {
            f3: true,
            f4: vec![0.5, 1.5],
        },
        f5: 5,
    }),
};

const CASE_OPTIONAL_MISSING: CaseDescriptor<Profile> = CaseDescriptor {
    id: "field::optional_missing",
    description: "absent optional field reads as None",
    expected: Expected::Value(|| Profile {
        name: "ada".into(),
        nickname: None,
    }),
};

const CASE_REQUIRED_MISSING: CaseDescriptor<Profile> = CaseDescriptor {
    id: "field::required_missing",
    description: "absent required field `name` is FieldNotFound",
    expected: Expected::Error {
        kind: "FieldNotFound(name)",
        matches: |kind| matches!(kind, ErrorKind::FieldNotFound { field } if field == "name"),
    },
};

const CASE_STRING_FOR_NUMBER: CaseDescriptor<Counter> = CaseDescriptor {
    id: "mismatch::string_for_number",
    description: "string node where u32 is expected",
    expected: Expected::Error {
        kind: "TypeMismatch",
        matches: |kind| matches!(kind, ErrorKind::TypeMismatch { .. }),
    },
};

const CASE_ARRAY_FOR_OBJECT: CaseDescriptor<NestedParent> = CaseDescriptor {
    id: "mismatch::array_for_object",
    description: "array node where the child record is expected",
    expected: Expected::Error {
        kind: "TypeMismatch(object)",
        matches: |kind| matches!(kind, ErrorKind::TypeMismatch { expected: "object", .. }),
    },
};

const CASE_TUPLE_TOO_SHORT: CaseDescriptor<(u8, u8)> = CaseDescriptor {
    id: "sequence::tuple_too_short",
    description: "one-element array read as a pair",
    expected: Expected::Error {
        kind: "IndexOutOfBounds",
        matches: |kind| matches!(kind, ErrorKind::IndexOutOfBounds { index: 1, len: 1 }),
    },
};

const CASE_ENUM_UNIT: CaseDescriptor<Vec<Color>> = CaseDescriptor {
    id: "enum::unit",
    description: "unit variants written as their names",
    expected: Expected::Value(|| vec![Color::Red, Color::Blue]),
};

const CASE_ENUM_UNKNOWN_VARIANT: CaseDescriptor<Color> = CaseDescriptor {
    id: "enum::unknown_variant",
    description: "tag naming no variant of Color",
    expected: Expected::Error {
        kind: "UnknownVariant",
        matches: |kind| matches!(kind, ErrorKind::UnknownVariant { .. }),
    },
};

const CASE_ENUM_COMPLEX: CaseDescriptor<ComplexEnum> = CaseDescriptor {
    id: "enum::complex",
    description: "struct variant as a single-key object",
    expected: Expected::Value(|| ComplexEnum::Label {
        name: "tessera".into(),
        level: 7,
    }),
};

const CASE_SIGNED_BOUNDARIES: CaseDescriptor<Boundaries> = CaseDescriptor {
    id: "scalar::signed_boundaries",
    description: "minimum values of i8..i64, -1, and i64::MAX",
    expected: Expected::Value(|| Boundaries {
        min8: i8::MIN,
        min16: i16::MIN,
        min32: i32::MIN,
        min64: i64::MIN,
        minus_one: -1,
        max64: i64::MAX,
    }),
};

const CASE_CUSTOM_CONSTRUCTOR: CaseDescriptor<Point> = CaseDescriptor {
    id: "custom::constructor",
    description: "Point built by its constructor from a two-element array",
    expected: Expected::Value(|| Point { x: 1.5, y: -2.0 }),
};

const CASE_MAP_OF_SCALARS: CaseDescriptor<BTreeMap<String, i32>> = CaseDescriptor {
    id: "map::scalars",
    description: "string-keyed map of signed integers",
    expected: Expected::Value(|| {
        BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), -2)])
    }),
};

/// Fixture for the single-field case.
#[derive(Model, Debug, Clone, PartialEq)]
pub struct StructSingleField {
    pub name: String,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct NestedParent {
    pub id: u64,
    pub child: NestedChild,
    pub tags: Vec<String>,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct NestedChild {
    pub code: String,
    pub active: bool,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct PartA {
    pub f1: String,
    pub f2: i64,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct PartB {
    pub f3: bool,
    pub f4: Vec<f64>,
}

/// Fixture for the flatten case: keys `f1`..`f5` in one object.
#[derive(Model, Debug, Clone, PartialEq)]
pub struct Composite {
    #[tessera(flatten)]
    pub a: PartA,
    #[tessera(flatten)]
    pub b: PartB,
    pub f5: u32,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub nickname: Option<String>,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct Counter {
    pub count: u32,
}

#[derive(Model, Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Red,
    Green,
    Blue,
}

#[derive(Model, Debug, Clone, PartialEq)]
pub enum ComplexEnum {
    Empty,
    Count(u64),
    Label { name: String, level: u8 },
}

#[derive(Model, Debug, Clone, PartialEq)]
pub struct Boundaries {
    pub min8: i8,
    pub min16: i16,
    pub min32: i32,
    pub min64: i64,
    pub minus_one: i64,
    pub max64: i64,
}

/// Read through its constructor: accepts `[x, y]` as well as `{x, y}`.
#[derive(Model, Debug, Clone, Copy, PartialEq)]
#[tessera(custom)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl CustomConstructor for Point {
    fn from_var<'de, R: FormatReader<'de>>(
        reader: &R,
        var: R::Var,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        if let Ok(array) = reader.to_array(var) {
            return Ok(Point {
                x: reader.to_basic_type(reader.get_field_by_index(0, array)?)?,
                y: reader.to_basic_type(reader.get_field_by_index(1, array)?)?,
            });
        }
        let object = reader.to_object(var)?;
        Ok(Point {
            x: reader.to_basic_type(reader.get_field("x", object)?)?,
            y: reader.to_basic_type(reader.get_field("y", object)?)?,
        })
    }
}
