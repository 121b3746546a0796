#![forbid(unsafe_code)]

use indoc::indoc;
use libtest_mimic::{Arguments, Failed, Trial};
use tessera::{Model, ReadError};
use tessera_format_suite::{CaseOutcome, CaseSpec, FormatSuite, all_cases};
use tessera_yaml::YamlError;

struct Yaml;

impl FormatSuite for Yaml {
    type Error = YamlError;

    fn format_name() -> &'static str {
        "tessera-yaml"
    }

    fn deserialize<T: Model>(input: &[u8]) -> Result<T, Self::Error> {
        tessera_yaml::from_slice(input)
    }

    fn serialize<T: Model>(value: &T) -> Vec<u8> {
        tessera_yaml::to_string(value).into_bytes()
    }

    fn read_error(error: &Self::Error) -> Option<&ReadError> {
        error.as_read_error()
    }

    fn struct_single_field() -> CaseSpec {
        CaseSpec::from_str("name: tessera\n")
    }

    fn sequence_numbers() -> CaseSpec {
        CaseSpec::from_str("[1, 2, 3]").with_note("flow sequence")
    }

    fn struct_nested() -> CaseSpec {
        CaseSpec::from_str(indoc! {"
            id: 42
            child:
              code: alpha
              active: true
            tags:
              - core
              - wire
        "})
    }

    fn flatten_composition() -> CaseSpec {
        CaseSpec::from_str(indoc! {"
            f5: 5
            f1: one
            f2: -2
            f3: true
            f4: [0.5, 1.5]
        "})
        .with_note("keys in a different order than declared")
    }

    fn optional_missing() -> CaseSpec {
        CaseSpec::from_str("name: ada\n")
    }

    fn required_missing() -> CaseSpec {
        CaseSpec::from_str("nickname: countess\n")
    }

    fn string_for_number() -> CaseSpec {
        CaseSpec::from_str("count: ten\n")
    }

    fn array_for_object() -> CaseSpec {
        CaseSpec::from_str("id: 1\nchild: []\ntags: []\n")
    }

    fn tuple_too_short() -> CaseSpec {
        CaseSpec::from_str("- 1\n")
    }

    fn enum_unit() -> CaseSpec {
        CaseSpec::from_str("- Red\n- Blue\n")
    }

    fn enum_unknown_variant() -> CaseSpec {
        CaseSpec::from_str("Purple\n")
    }

    fn enum_complex() -> CaseSpec {
        CaseSpec::from_str(indoc! {"
            Label:
              name: tessera
              level: 7
        "})
    }

    fn signed_boundaries() -> CaseSpec {
        CaseSpec::from_str(indoc! {"
            min8: -128
            min16: -32768
            min32: -2147483648
            min64: -9223372036854775808
            minus_one: -1
            max64: 9223372036854775807
        "})
    }

    fn custom_constructor() -> CaseSpec {
        CaseSpec::from_str("[1.5, -2.0]")
    }

    fn map_of_scalars() -> CaseSpec {
        CaseSpec::from_str("b: -2\na: 1\n")
    }
}

fn main() {
    let args = Arguments::from_args();
    let trials: Vec<Trial> = all_cases::<Yaml>()
        .into_iter()
        .map(|case| {
            let name = format!("{}::{}", Yaml::format_name(), case.id);
            Trial::test(name, move || match case.run() {
                CaseOutcome::Passed => Ok(()),
                CaseOutcome::Failed(msg) => Err(Failed::from(msg)),
            })
        })
        .collect();

    libtest_mimic::run(&args, trials).exit()
}
