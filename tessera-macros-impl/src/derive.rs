use proc_macro2::{Delimiter, Group, TokenStream, TokenTree};

use crate::emit_enum::emit_enum;
use crate::emit_struct::emit_struct;
use crate::parse::{Body, Errors, parse_type};

/// Unwraps `Delimiter::None` groups, which `macro_rules!` wraps around
/// captured fragments such as `$vis:vis`.
fn flatten_transparent_groups(input: TokenStream) -> TokenStream {
    input
        .into_iter()
        .flat_map(|tt| match tt {
            TokenTree::Group(group) if group.delimiter() == Delimiter::None => {
                flatten_transparent_groups(group.stream())
            }
            TokenTree::Group(group) => {
                let mut new_group =
                    Group::new(group.delimiter(), flatten_transparent_groups(group.stream()));
                new_group.set_span(group.span());
                std::iter::once(TokenTree::Group(new_group)).collect()
            }
            other => std::iter::once(other).collect(),
        })
        .collect()
}

/// Entry point of `#[derive(Model)]`.
///
/// Problems with the input are reported as `compile_error!` invocations
/// instead of panics.
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = flatten_transparent_groups(input);
    let mut errors = Errors::default();
    let Some(parsed) = parse_type(input, &mut errors) else {
        return errors.into_tokens();
    };

    let output = match &parsed.body {
        Body::Struct(fields) => emit_struct(&parsed.name, &parsed.attrs, fields, &mut errors),
        Body::Enum(variants) => emit_enum(&parsed.name, &parsed.attrs, variants, &mut errors),
    };

    if errors.is_empty() {
        output
    } else {
        errors.into_tokens()
    }
}
