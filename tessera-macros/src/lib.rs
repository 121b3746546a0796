#![doc = include_str!("../README.md")]

#[proc_macro_derive(Model, attributes(tessera))]
pub fn derive_model(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    tessera_macros_impl::derive_model(input.into()).into()
}
