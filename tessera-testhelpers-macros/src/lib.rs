use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    struct BeforeFn {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        before_fn: BeforeFn,
        _fn: KFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

impl quote::ToTokens for BeforeFn {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.items.to_tokens(tokens)
    }
}

/// Marks a test and installs tessera's test tracing before its body runs.
///
/// ```ignore
/// #[tessera_testhelpers::test]
/// fn reads_a_record() {
///     // subscriber is ready here
/// }
/// ```
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let decl = match iter.parse::<TestFn>() {
        Ok(decl) => decl,
        Err(_) => {
            return quote::quote! {
                ::core::compile_error!("#[tessera_testhelpers::test] expects a function");
            }
            .into();
        }
    };

    let TestFn {
        before_fn,
        name,
        signature,
        body,
        ..
    } = decl;
    let body = body.0.stream();

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #before_fn fn #name #signature {
            ::tessera_testhelpers::setup();

            #body
        }
    }
    .into()
}
