use std::collections::BTreeMap;

use indoc::indoc;
use insta::assert_snapshot;
use tessera::{ErrorKind, Model};
use tessera_yaml::{Node, YamlError, from_str, to_string};

#[derive(Model, Debug, Clone, PartialEq)]
#[tessera(rename_all = "kebab-case")]
struct Config {
    service_name: String,
    replicas: u8,
    ratio: f64,
    enabled: bool,
    owner: Option<String>,
    #[tessera(default)]
    labels: BTreeMap<String, String>,
    endpoints: Vec<Endpoint>,
}

#[derive(Model, Debug, Clone, PartialEq)]
struct Endpoint {
    path: String,
    methods: Vec<String>,
}

#[derive(Model, Debug, Clone, PartialEq)]
enum Step {
    Noop,
    Sleep(u32),
    Copy { from: String, to: String },
}

fn config() -> Config {
    Config {
        service_name: "gateway".into(),
        replicas: 3,
        ratio: 0.5,
        enabled: true,
        owner: None,
        labels: BTreeMap::from([("tier".to_owned(), "edge".to_owned())]),
        endpoints: vec![
            Endpoint {
                path: "/health".into(),
                methods: vec!["GET".into()],
            },
            Endpoint {
                path: "/items".into(),
                methods: vec![],
            },
        ],
    }
}

#[tessera_testhelpers::test]
fn block_output() {
    assert_snapshot!(to_string(&config()), @r"
    service-name: gateway
    replicas: 3
    ratio: 0.5
    enabled: true
    owner: null
    labels:
      tier: edge
    endpoints:
      - path: /health
        methods:
          - GET
      - path: /items
        methods: []
    ");
}

#[tessera_testhelpers::test]
fn reads_what_it_writes() {
    let text = to_string(&config());
    assert_eq!(from_str::<Config>(&text).unwrap(), config());
}

#[tessera_testhelpers::test]
fn hand_written_documents() {
    let parsed: Config = from_str(indoc! {"
        # comments and flow style are fine
        endpoints:
          - {path: /health, methods: [GET]}
          - path: /items
            methods: []
        enabled: True
        ratio: 5e-1
        replicas: 0x3
        service-name: gateway
        labels: {tier: edge}
        owner: ~
    "})
    .unwrap();
    assert_eq!(parsed, config());
}

#[tessera_testhelpers::test]
fn strings_that_look_like_other_scalars_are_quoted() {
    let endpoint = Endpoint {
        path: "true".into(),
        methods: vec!["12".into(), "".into(), "a: b".into(), "null".into()],
    };
    let text = to_string(&endpoint);
    assert_snapshot!(text, @r#"
    path: "true"
    methods:
      - "12"
      - ""
      - "a: b"
      - "null"
    "#);
    assert_eq!(from_str::<Endpoint>(&text).unwrap(), endpoint);
}

#[tessera_testhelpers::test]
fn plain_scalars_follow_the_target_type() {
    let endpoint: Endpoint = from_str("path: 404\nmethods: [1, true]\n").unwrap();
    assert_eq!(endpoint.path, "404");
    assert_eq!(endpoint.methods, ["1", "true"]);

    let err = from_str::<Vec<u8>>("[1, two]").unwrap_err();
    assert_snapshot!(err.to_string(), @r#"type mismatch: expected u8, got string "two" (at [1])"#);
}

#[tessera_testhelpers::test]
fn quoted_numbers_are_strings() {
    #[derive(Model, Debug)]
    struct Count {
        n: u32,
    }
    let err = from_str::<Count>("n: '5'\n").unwrap_err();
    assert_snapshot!(err.to_string(), @r#"type mismatch: expected u32, got string "5" (at n)"#);
}

#[tessera_testhelpers::test]
fn errors_name_the_path() {
    let err = from_str::<Config>(indoc! {"
        service-name: gateway
        replicas: 3
        ratio: 0.5
        enabled: true
        endpoints:
          - path: /a
            methods: [GET]
          - path: /b
            methods: GET
    "})
    .unwrap_err();
    assert_snapshot!(err.to_string(), @"type mismatch: expected sequence, got scalar (at endpoints[1].methods)");
}

#[tessera_testhelpers::test]
fn enums() {
    let steps = vec![
        Step::Noop,
        Step::Sleep(10),
        Step::Copy {
            from: "a".into(),
            to: "b".into(),
        },
    ];
    let text = to_string(&steps);
    assert_snapshot!(text, @r"
    - Noop
    - Sleep: 10
    - Copy:
        from: a
        to: b
    ");
    assert_eq!(from_str::<Vec<Step>>(&text).unwrap(), steps);
}

#[tessera_testhelpers::test]
fn anchors_and_aliases() {
    let endpoints: Vec<Endpoint> = from_str(indoc! {"
        - &health
          path: /health
          methods: [GET]
        - *health
    "})
    .unwrap();
    assert_eq!(endpoints[0], endpoints[1]);
}

#[tessera_testhelpers::test]
fn non_string_keys_are_rejected() {
    let err = from_str::<BTreeMap<String, u8>>("? [a, b]\n: 1\n").unwrap_err();
    assert!(matches!(err.kind(), Some(ErrorKind::KeyTypeError { .. })), "{err}");
}

#[tessera_testhelpers::test]
fn parse_errors_are_not_read_errors() {
    let err = from_str::<Config>("a: [1, 2\n").unwrap_err();
    assert!(matches!(err, YamlError::Syntax(_)));
    assert!(err.as_read_error().is_none());
}

#[tessera_testhelpers::test]
fn nodes_and_io() {
    let node = tessera_yaml::to_node(&vec![1u8, 2]);
    assert_eq!(node, Node::Sequence(vec![Node::plain("1"), Node::plain("2")]));
    assert_eq!(tessera_yaml::from_node::<Vec<u8>>(&node).unwrap(), [1, 2]);

    let mut out = Vec::new();
    tessera_yaml::to_writer(&mut out, &Step::Sleep(1)).unwrap();
    assert_eq!(out, b"Sleep: 1\n");
    let step: Step = tessera_yaml::from_reader(out.as_slice()).unwrap();
    assert_eq!(step, Step::Sleep(1));
}

#[tessera_testhelpers::test]
fn scalar_roots_and_special_floats() {
    assert_eq!(to_string(&1.0f64), "1.0\n");
    assert_eq!(to_string(&f64::INFINITY), ".inf\n");
    assert!(from_str::<f64>(".nan").unwrap().is_nan());
    assert_eq!(from_str::<Option<u8>>("").unwrap(), None);
    assert_eq!(from_str::<Option<u8>>("7").unwrap(), Some(7));
}

#[tessera_testhelpers::test]
fn integer_scalars_do_not_read_as_floats() {
    assert_eq!(from_str::<f64>("5.0").unwrap(), 5.0);
    assert_eq!(from_str::<f32>("1e3").unwrap(), 1000.0);
    let err = from_str::<f64>("5").unwrap_err();
    assert_snapshot!(err.to_string(), @"type mismatch: expected f64, got integer 5");
    let err = from_str::<f32>("1e300").unwrap_err();
    assert!(
        matches!(err.kind(), Some(ErrorKind::TypeMismatch { expected: "f32", .. })),
        "{err}"
    );
}

#[tessera_testhelpers::test]
fn alias_expansion_is_capped() {
    let doc = indoc! {"
        a: &a [lol, lol, lol, lol, lol, lol, lol, lol, lol, lol]
        b: &b [*a, *a, *a, *a, *a, *a, *a, *a, *a, *a]
        c: &c [*b, *b, *b, *b, *b, *b, *b, *b, *b, *b]
        d: &d [*c, *c, *c, *c, *c, *c, *c, *c, *c, *c]
        e: &e [*d, *d, *d, *d, *d, *d, *d, *d, *d, *d]
        f: &f [*e, *e, *e, *e, *e, *e, *e, *e, *e, *e]
    "};
    let err = from_str::<BTreeMap<String, Vec<String>>>(doc).unwrap_err();
    assert!(matches!(err, YamlError::AliasLimit { .. }), "{err}");
    assert!(err.as_read_error().is_none());
    assert!(err.to_string().contains("100000 copied nodes"), "{err}");
}
