#![forbid(unsafe_code)]

use libtest_mimic::{Arguments, Failed, Trial};
use tessera::{Model, ReadError};
use tessera_cbor::CborError;
use tessera_format_suite::{CaseOutcome, CaseSpec, FormatSuite, all_cases};

struct Cbor;

impl FormatSuite for Cbor {
    type Error = CborError;

    fn format_name() -> &'static str {
        "tessera-cbor"
    }

    fn deserialize<T: Model>(input: &[u8]) -> Result<T, Self::Error> {
        tessera_cbor::from_slice(input)
    }

    fn serialize<T: Model>(value: &T) -> Vec<u8> {
        tessera_cbor::to_vec(value)
    }

    fn read_error(error: &Self::Error) -> Option<&ReadError> {
        error.as_read_error()
    }

    fn struct_single_field() -> CaseSpec {
        // {"name": "tessera"}
        CaseSpec::from_bytes(b"\xa1\x64name\x67tessera")
    }

    fn sequence_numbers() -> CaseSpec {
        // [1, 2, 3]
        CaseSpec::from_bytes(b"\x83\x01\x19\x00\x02\x1a\x00\x00\x00\x03")
            .with_note("items stored in 0, 2 and 4-byte widths")
    }

    fn struct_nested() -> CaseSpec {
        CaseSpec::from_bytes(
            b"\xa3\x62id\x18\x2a\
              \x65child\xa2\x64code\x65alpha\x66active\xf5\
              \x64tags\x82\x64core\x64wire",
        )
    }

    fn flatten_composition() -> CaseSpec {
        // {"f5": 5, "f1": "one", "f2": -2, "f3": true, "f4": [0.5, 1.5]}
        CaseSpec::from_bytes(
            b"\xa5\x62f5\x05\x62f1\x63one\x62f2\x21\x62f3\xf5\
              \x62f4\x82\xf9\x38\x00\xf9\x3e\x00",
        )
        .with_note("half-precision floats, keys out of declaration order")
    }

    fn optional_missing() -> CaseSpec {
        CaseSpec::from_bytes(b"\xa1\x64name\x63ada")
    }

    fn required_missing() -> CaseSpec {
        CaseSpec::from_bytes(b"\xa1\x68nickname\x68countess")
    }

    fn string_for_number() -> CaseSpec {
        CaseSpec::from_bytes(b"\xa1\x65count\x63ten")
    }

    fn array_for_object() -> CaseSpec {
        // {"id": 1, "child": [], "tags": []}
        CaseSpec::from_bytes(b"\xa3\x62id\x01\x65child\x80\x64tags\x80")
    }

    fn tuple_too_short() -> CaseSpec {
        CaseSpec::from_bytes(b"\x81\x01")
    }

    fn enum_unit() -> CaseSpec {
        CaseSpec::from_bytes(b"\x82\x63Red\x64Blue")
    }

    fn enum_unknown_variant() -> CaseSpec {
        CaseSpec::from_bytes(b"\x66Purple")
    }

    fn enum_complex() -> CaseSpec {
        CaseSpec::from_bytes(b"\xa1\x65Label\xa2\x64name\x67tessera\x65level\x07")
    }

    fn signed_boundaries() -> CaseSpec {
        CaseSpec::from_bytes(
            b"\xa6\
              \x64min8\x38\x7f\
              \x65min16\x39\x7f\xff\
              \x65min32\x3a\x7f\xff\xff\xff\
              \x65min64\x3b\x7f\xff\xff\xff\xff\xff\xff\xff\
              \x69minus_one\x20\
              \x65max64\x1b\x7f\xff\xff\xff\xff\xff\xff\xff",
        )
        .with_note("each minimum is the largest magnitude its width holds")
    }

    fn custom_constructor() -> CaseSpec {
        // [1.5, -2.0]
        CaseSpec::from_bytes(b"\x82\xfa\x3f\xc0\x00\x00\xf9\xc0\x00")
    }

    fn map_of_scalars() -> CaseSpec {
        CaseSpec::from_bytes(b"\xa2\x61b\x21\x61a\x01")
    }
}

fn main() {
    let args = Arguments::from_args();
    let trials: Vec<Trial> = all_cases::<Cbor>()
        .into_iter()
        .map(|case| {
            let name = format!("{}::{}", Cbor::format_name(), case.id);
            Trial::test(name, move || match case.run() {
                CaseOutcome::Passed => Ok(()),
                CaseOutcome::Failed(msg) => Err(Failed::from(msg)),
            })
        })
        .collect();

    libtest_mimic::run(&args, trials).exit()
}
