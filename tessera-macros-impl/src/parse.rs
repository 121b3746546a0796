//! Parsing of the derive input into plain data.
//!
//! The outer declaration and each field/variant are parsed with `unsynn`.
//! Field lists are split at top-level commas first, so that commas inside
//! generic arguments (`HashMap<String, u32>`) never end a field.

use proc_macro2::{Delimiter, Span, TokenStream as TokenStream2, TokenTree};
use quote::quote_spanned;
use unsynn::*;

use crate::RenameRule;

keyword! {
    KStruct = "struct";
    KEnum = "enum";
    KPub = "pub";
}

operator! {
    Assign = "=";
}

unsynn! {
    /// `pub` or `pub(...)`
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// `#[...]`
    struct Attribute {
        _pound: Pound,
        content: BracketGroup,
    }

    enum TypeKeyword {
        Struct(KStruct),
        Enum(KEnum),
    }

    /// Everything up to the type name; the body is interpreted by hand.
    struct TypeDecl {
        attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        keyword: TypeKeyword,
        name: Ident,
        rest: Vec<TokenTree>,
    }

    struct NamedFieldDecl {
        attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        ty: Vec<TokenTree>,
    }

    struct TupleFieldDecl {
        attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        ty: Vec<TokenTree>,
    }

    enum VariantBody {
        Named(BraceGroup),
        Tuple(ParenthesisGroup),
    }

    struct VariantDecl {
        attrs: Vec<Attribute>,
        name: Ident,
        body: Option<VariantBody>,
        _discriminant: Option<Cons<Assign, Vec<TokenTree>>>,
    }
}

/// Collected `compile_error!` invocations.
#[derive(Default)]
pub(crate) struct Errors(Vec<TokenStream2>);

impl Errors {
    pub(crate) fn push(&mut self, span: Span, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.0.push(quote_spanned! { span => ::core::compile_error!(#message); });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_tokens(self) -> TokenStream2 {
        self.0.into_iter().collect()
    }
}

#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub(crate) rename_all: Option<RenameRule>,
    pub(crate) deny_unknown_fields: bool,
    pub(crate) custom: bool,
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) rename: Option<String>,
    pub(crate) flatten: bool,
    pub(crate) default: bool,
    pub(crate) skip: bool,
}

pub(crate) struct ParsedField {
    /// Rust field name; `None` for tuple fields.
    pub(crate) ident: Option<Ident>,
    pub(crate) ty: TokenStream2,
    pub(crate) attrs: FieldAttrs,
    pub(crate) span: Span,
}

impl ParsedField {
    /// Key in the tree for a named field.
    pub(crate) fn key(&self, rule: Option<RenameRule>) -> String {
        let raw = self
            .ident
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_default();
        let raw = raw.trim_start_matches("r#");
        match (&self.attrs.rename, rule) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(raw),
            (None, None) => raw.to_owned(),
        }
    }
}

pub(crate) enum Fields {
    Named(Vec<ParsedField>),
    Tuple(Vec<ParsedField>),
    Unit,
}

pub(crate) struct ParsedVariant {
    pub(crate) ident: Ident,
    pub(crate) rename: Option<String>,
    pub(crate) fields: Fields,
}

impl ParsedVariant {
    pub(crate) fn tag(&self, rule: Option<RenameRule>) -> String {
        let raw = self.ident.to_string();
        match (&self.rename, rule) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(&raw),
            (None, None) => raw,
        }
    }
}

pub(crate) enum Body {
    Struct(Fields),
    Enum(Vec<ParsedVariant>),
}

pub(crate) struct ParsedType {
    pub(crate) name: Ident,
    pub(crate) attrs: ContainerAttrs,
    pub(crate) body: Body,
}

/// Parse the derive input, reporting problems through `errors`.
pub(crate) fn parse_type(input: TokenStream2, errors: &mut Errors) -> Option<ParsedType> {
    let mut iter = input.to_token_iter();
    let decl = match iter.parse::<TypeDecl>() {
        Ok(decl) => decl,
        Err(err) => {
            errors.push(
                Span::call_site(),
                format!("#[derive(Model)] could not parse this item: {err}"),
            );
            return None;
        }
    };

    let attrs = parse_container_attrs(&decl.attrs, errors);
    let rest = decl.rest;

    if let Some(TokenTree::Punct(p)) = rest.first()
        && p.as_char() == '<'
    {
        errors.push(p.span(), "#[derive(Model)] does not support generic types");
        return None;
    }

    let body = match decl.keyword {
        TypeKeyword::Struct(_) => Body::Struct(parse_struct_body(&decl.name, &rest, errors)?),
        TypeKeyword::Enum(_) => match rest.first() {
            Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Brace => {
                Body::Enum(parse_variants(g.stream(), errors))
            }
            _ => {
                errors.push(decl.name.span(), "expected enum body");
                return None;
            }
        },
    };

    Some(ParsedType {
        name: decl.name,
        attrs,
        body,
    })
}

fn parse_struct_body(name: &Ident, rest: &[TokenTree], errors: &mut Errors) -> Option<Fields> {
    match rest.first() {
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Brace => {
            Some(Fields::Named(parse_named_fields(g.stream(), errors)))
        }
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Parenthesis => {
            Some(Fields::Tuple(parse_tuple_fields(g.stream(), errors)))
        }
        Some(TokenTree::Punct(p)) if p.as_char() == ';' => Some(Fields::Unit),
        _ => {
            errors.push(name.span(), "expected struct body");
            None
        }
    }
}

fn parse_named_fields(stream: TokenStream2, errors: &mut Errors) -> Vec<ParsedField> {
    let mut fields = Vec::new();
    for chunk in split_top_level(stream) {
        let span = chunk_span(&chunk);
        let mut iter = chunk.to_token_iter();
        match iter.parse::<NamedFieldDecl>() {
            Ok(decl) => fields.push(ParsedField {
                attrs: parse_field_attrs(&decl.attrs, errors),
                span: decl.name.span(),
                ident: Some(decl.name),
                ty: decl.ty.into_iter().collect(),
            }),
            Err(err) => errors.push(span, format!("could not parse field: {err}")),
        }
    }
    fields
}

fn parse_tuple_fields(stream: TokenStream2, errors: &mut Errors) -> Vec<ParsedField> {
    let mut fields = Vec::new();
    for chunk in split_top_level(stream) {
        let span = chunk_span(&chunk);
        let mut iter = chunk.to_token_iter();
        match iter.parse::<TupleFieldDecl>() {
            Ok(decl) => fields.push(ParsedField {
                attrs: parse_field_attrs(&decl.attrs, errors),
                span,
                ident: None,
                ty: decl.ty.into_iter().collect(),
            }),
            Err(err) => errors.push(span, format!("could not parse field: {err}")),
        }
    }
    fields
}

fn parse_variants(stream: TokenStream2, errors: &mut Errors) -> Vec<ParsedVariant> {
    let mut variants = Vec::new();
    for chunk in split_top_level(stream) {
        let span = chunk_span(&chunk);
        let mut iter = chunk.to_token_iter();
        let decl = match iter.parse::<VariantDecl>() {
            Ok(decl) => decl,
            Err(err) => {
                errors.push(span, format!("could not parse variant: {err}"));
                continue;
            }
        };
        let rename = parse_variant_attrs(&decl.attrs, errors);
        let fields = match decl.body {
            None => Fields::Unit,
            Some(VariantBody::Named(group)) => {
                Fields::Named(parse_named_fields(group.0.stream(), errors))
            }
            Some(VariantBody::Tuple(group)) => {
                Fields::Tuple(parse_tuple_fields(group.0.stream(), errors))
            }
        };
        variants.push(ParsedVariant {
            ident: decl.name,
            rename,
            fields,
        });
    }
    variants
}

/// Split a field or variant list at commas that are not nested inside
/// angle brackets. Delimited groups are single token trees already.
fn split_top_level(stream: TokenStream2) -> Vec<TokenStream2> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    let mut prev_dash = false;
    for tt in stream {
        let mut is_dash = false;
        if let TokenTree::Punct(p) = &tt {
            match p.as_char() {
                '<' => depth += 1,
                // `->` in fn pointer types is not a closing bracket
                '>' if !prev_dash => depth = depth.saturating_sub(1),
                '-' => is_dash = true,
                ',' if depth == 0 => {
                    if !current.is_empty() {
                        chunks.push(current.drain(..).collect());
                    }
                    prev_dash = false;
                    continue;
                }
                _ => {}
            }
        }
        prev_dash = is_dash;
        current.push(tt);
    }
    if !current.is_empty() {
        chunks.push(current.into_iter().collect());
    }
    chunks
}

fn chunk_span(chunk: &TokenStream2) -> Span {
    chunk
        .clone()
        .into_iter()
        .next()
        .map(|tt| tt.span())
        .unwrap_or_else(Span::call_site)
}

struct AttrArg {
    key: Ident,
    value: Option<String>,
    span: Span,
}

/// The arguments of every `#[tessera(...)]` attribute in `attrs`.
fn tessera_args(attrs: &[Attribute], errors: &mut Errors) -> Vec<AttrArg> {
    let mut args = Vec::new();
    for attr in attrs {
        let mut tokens = attr.content.0.stream().into_iter();
        match tokens.next() {
            Some(TokenTree::Ident(ident)) if ident == "tessera" => {}
            _ => continue,
        }
        let inner = match tokens.next() {
            Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Parenthesis => g.stream(),
            other => {
                let span = other.map_or_else(Span::call_site, |t| t.span());
                errors.push(span, "expected #[tessera(...)]");
                continue;
            }
        };
        for chunk in split_top_level(inner) {
            let mut parts = chunk.into_iter();
            let key = match parts.next() {
                Some(TokenTree::Ident(key)) => key,
                Some(other) => {
                    errors.push(other.span(), "expected an attribute name");
                    continue;
                }
                None => continue,
            };
            let span = key.span();
            let value = match (parts.next(), parts.next()) {
                (None, _) => None,
                (Some(TokenTree::Punct(eq)), Some(TokenTree::Literal(lit))) if eq.as_char() == '=' => {
                    let text = lit.to_string();
                    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                        Some(inner) => Some(inner.to_owned()),
                        None => {
                            errors.push(lit.span(), "expected a string literal");
                            continue;
                        }
                    }
                }
                _ => {
                    errors.push(span, format!("malformed `{key}` attribute"));
                    continue;
                }
            };
            args.push(AttrArg { key, value, span });
        }
    }
    args
}

fn expect_flag(arg: &AttrArg, errors: &mut Errors) -> bool {
    if arg.value.is_some() {
        errors.push(arg.span, format!("`{}` takes no value", arg.key));
    }
    true
}

fn expect_value(arg: &AttrArg, errors: &mut Errors) -> Option<String> {
    if arg.value.is_none() {
        errors.push(arg.span, format!("`{}` needs a value: {} = \"...\"", arg.key, arg.key));
    }
    arg.value.clone()
}

fn parse_container_attrs(attrs: &[Attribute], errors: &mut Errors) -> ContainerAttrs {
    let mut out = ContainerAttrs::default();
    for arg in tessera_args(attrs, errors) {
        match arg.key.to_string().as_str() {
            "rename_all" => {
                if let Some(value) = expect_value(&arg, errors) {
                    match RenameRule::parse(&value) {
                        Some(rule) => out.rename_all = Some(rule),
                        None => errors.push(arg.span, format!("unknown rename rule `{value}`")),
                    }
                }
            }
            "deny_unknown_fields" => out.deny_unknown_fields = expect_flag(&arg, errors),
            "custom" => out.custom = expect_flag(&arg, errors),
            other => errors.push(arg.span, format!("unknown container attribute `{other}`")),
        }
    }
    out
}

fn parse_field_attrs(attrs: &[Attribute], errors: &mut Errors) -> FieldAttrs {
    let mut out = FieldAttrs::default();
    for arg in tessera_args(attrs, errors) {
        match arg.key.to_string().as_str() {
            "rename" => out.rename = expect_value(&arg, errors),
            "flatten" => out.flatten = expect_flag(&arg, errors),
            "default" => out.default = expect_flag(&arg, errors),
            "skip" => out.skip = expect_flag(&arg, errors),
            other => errors.push(arg.span, format!("unknown field attribute `{other}`")),
        }
    }
    out
}

fn parse_variant_attrs(attrs: &[Attribute], errors: &mut Errors) -> Option<String> {
    let mut rename = None;
    for arg in tessera_args(attrs, errors) {
        match arg.key.to_string().as_str() {
            "rename" => rename = expect_value(&arg, errors),
            other => errors.push(arg.span, format!("unknown variant attribute `{other}`")),
        }
    }
    rename
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn generic_commas_do_not_split_fields() {
        let chunks = split_top_level(quote! {
            a: HashMap<String, u32>,
            b: fn(u8) -> Vec<u8>,
            c: (u8, u8),
        });
        let rendered: Vec<_> = chunks.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered.len(), 3, "{rendered:?}");
        assert!(rendered[0].contains("HashMap"));
        assert!(rendered[1].contains("-> Vec < u8 >"));
    }

    #[test]
    fn named_struct_with_attributes() {
        let mut errors = Errors::default();
        let parsed = parse_type(
            quote! {
                #[derive(Debug)]
                #[tessera(rename_all = "camelCase", deny_unknown_fields)]
                pub struct User {
                    /// docs are ignored
                    pub user_name: String,
                    #[tessera(rename = "mail")]
                    email: Option<String>,
                    #[tessera(flatten)]
                    pub(crate) extra: Extra,
                }
            },
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
        assert!(parsed.attrs.deny_unknown_fields);
        let Body::Struct(Fields::Named(fields)) = parsed.body else {
            panic!("expected named fields");
        };
        let rule = parsed.attrs.rename_all;
        let keys: Vec<_> = fields.iter().map(|f| f.key(rule)).collect();
        assert_eq!(keys, ["userName", "mail", "extra"]);
        assert!(fields[2].attrs.flatten);
    }

    #[test]
    fn enum_variants() {
        let mut errors = Errors::default();
        let parsed = parse_type(
            quote! {
                enum Shape {
                    Empty,
                    #[tessera(rename = "circle")]
                    Circle(f64),
                    Pair(u8, u8),
                    Rect { w: f64, h: f64 },
                    Coded = 7,
                }
            },
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
        let Body::Enum(variants) = parsed.body else {
            panic!("expected enum");
        };
        let tags: Vec<_> = variants.iter().map(|v| v.tag(None)).collect();
        assert_eq!(tags, ["Empty", "circle", "Pair", "Rect", "Coded"]);
        assert!(matches!(&variants[2].fields, Fields::Tuple(f) if f.len() == 2));
        assert!(matches!(&variants[3].fields, Fields::Named(f) if f.len() == 2));
    }

    #[test]
    fn unknown_attributes_are_errors() {
        let mut errors = Errors::default();
        parse_type(
            quote! {
                struct S {
                    #[tessera(flaten)]
                    a: u8,
                }
            },
            &mut errors,
        );
        assert!(errors.into_tokens().to_string().contains("unknown field attribute `flaten`"));
    }

    #[test]
    fn generics_are_rejected() {
        let mut errors = Errors::default();
        let parsed = parse_type(quote! { struct W<T> { t: T } }, &mut errors);
        assert!(parsed.is_none());
        assert!(errors.into_tokens().to_string().contains("generic"));
    }
}
