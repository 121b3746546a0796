use proc_macro2::{Ident, Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};

use crate::RenameRule;
use crate::parse::{ContainerAttrs, Errors, Fields, ParsedField};

/// Reject attribute combinations that have no meaning.
pub(crate) fn check_named_fields(fields: &[ParsedField], rule: Option<RenameRule>, errors: &mut Errors) {
    let mut seen: Vec<String> = Vec::new();
    for field in fields {
        let attrs = &field.attrs;
        if attrs.skip && (attrs.flatten || attrs.default || attrs.rename.is_some()) {
            errors.push(field.span, "`skip` cannot be combined with other field attributes");
            continue;
        }
        if attrs.flatten && (attrs.default || attrs.rename.is_some()) {
            errors.push(field.span, "a flattened field has no key of its own");
            continue;
        }
        if attrs.skip || attrs.flatten {
            continue;
        }
        let key = field.key(rule);
        if seen.contains(&key) {
            errors.push(field.span, format!("two fields are named `{key}`"));
        }
        seen.push(key);
    }
}

pub(crate) fn check_tuple_fields(fields: &[ParsedField], errors: &mut Errors) {
    for field in fields {
        let a = &field.attrs;
        if a.skip || a.flatten || a.default || a.rename.is_some() {
            errors.push(field.span, "field attributes need a named field");
        }
    }
}

/// `Field` descriptors of the keyed members, in declaration order.
pub(crate) fn field_descriptors(fields: &[ParsedField], rule: Option<RenameRule>) -> Vec<TokenStream2> {
    fields
        .iter()
        .filter(|f| !f.attrs.skip)
        .map(|f| {
            let ty = &f.ty;
            let key = Literal::string(&f.key(rule));
            if f.attrs.flatten {
                quote! { ::tessera::Field::flattened(#key, ::tessera::shape_of::<#ty>) }
            } else if f.attrs.default {
                quote! { ::tessera::Field::new(#key, ::tessera::shape_of::<#ty>).with_default() }
            } else {
                quote! { ::tessera::Field::new(#key, ::tessera::shape_of::<#ty>) }
            }
        })
        .collect()
}

/// Number of keys the fields put into their object.
pub(crate) fn field_count(fields: &[ParsedField]) -> TokenStream2 {
    let terms = fields.iter().filter(|f| !f.attrs.skip).map(|f| {
        let ty = &f.ty;
        if f.attrs.flatten {
            quote! { + <#ty as ::tessera::Record>::FIELD_COUNT }
        } else {
            quote! { + 1usize }
        }
    });
    quote! { 0usize #(#terms)* }
}

/// `RecordKey` list of the keyed members; flattened members nest their own.
pub(crate) fn key_list(fields: &[ParsedField], rule: Option<RenameRule>) -> TokenStream2 {
    let keys = fields.iter().filter(|f| !f.attrs.skip).map(|f| {
        let ty = &f.ty;
        if f.attrs.flatten {
            quote! { ::tessera::RecordKey::Flatten(<#ty as ::tessera::Record>::KEYS) }
        } else {
            let key = Literal::string(&f.key(rule));
            quote! { ::tessera::RecordKey::Name(#key) }
        }
    });
    quote! { &[#(#keys),*] }
}

/// Compile-time assertion that `keys` holds no key twice.
///
/// Flattened members are only known by type here, so the check runs when the
/// constant is evaluated.
pub(crate) fn key_check(keys: TokenStream2, owner: &str) -> TokenStream2 {
    let message = Literal::string(&format!(
        "two fields of `{owner}` share a key after flattening"
    ));
    quote! {
        const _: () = ::core::assert!(::tessera::duplicate_key(#keys).is_none(), #message);
    }
}

/// Statements writing each field into the open object `object`.
///
/// `access` renders the expression borrowing a field.
pub(crate) fn write_named(
    fields: &[ParsedField],
    rule: Option<RenameRule>,
    access: impl Fn(&Ident) -> TokenStream2,
) -> TokenStream2 {
    let stmts = fields.iter().filter(|f| !f.attrs.skip).filter_map(|f| {
        let ident = f.ident.as_ref()?;
        let value = access(ident);
        Some(if f.attrs.flatten {
            quote! { ::tessera::Record::write_fields(#value, writer, object); }
        } else {
            let key = Literal::string(&f.key(rule));
            quote! { ::tessera::write_field(#value, #key, writer, object); }
        })
    });
    quote! { #(#stmts)* }
}

/// Expression building `ctor { .. }` from the object `object`.
pub(crate) fn read_named(
    fields: &[ParsedField],
    rule: Option<RenameRule>,
    ctor: TokenStream2,
) -> TokenStream2 {
    let inits = fields.iter().filter_map(|f| {
        let ident = f.ident.as_ref()?;
        let key = Literal::string(&f.key(rule));
        let value = if f.attrs.skip {
            quote! { ::core::default::Default::default() }
        } else if f.attrs.flatten {
            quote! { ::tessera::read_flattened(reader, object)? }
        } else if f.attrs.default {
            quote! { ::tessera::read_field_or_default(reader, object, #key)? }
        } else {
            quote! { ::tessera::read_field(reader, object, #key)? }
        };
        Some(quote! { #ident: #value, })
    });
    quote! { #ctor { #(#inits)* } }
}

/// Shape-fn list of positional items.
pub(crate) fn item_shapes(fields: &[ParsedField]) -> Vec<TokenStream2> {
    fields
        .iter()
        .map(|f| {
            let ty = &f.ty;
            quote! { ::tessera::shape_of::<#ty> }
        })
        .collect()
}

/// Expression reading positional items from `array` into `ctor(..)`.
pub(crate) fn read_positional(count: usize, ctor: TokenStream2) -> TokenStream2 {
    let items = (0..count).map(|i| quote! { ::tessera::read_element(reader, array, #i)?, });
    quote! { #ctor( #(#items)* ) }
}

/// Statements writing `values` as one array at `parent`.
pub(crate) fn write_positional(values: &[TokenStream2]) -> TokenStream2 {
    let len = values.len();
    quote! {
        let mut array = parent.add_array(writer, #len);
        #( ::tessera::Model::write(#values, writer, ::tessera::Parent::Array(&mut array)); )*
        ::tessera::FormatWriter::end_array(writer, array);
    }
}

fn read_body(attrs: &ContainerAttrs, fallback: TokenStream2) -> TokenStream2 {
    if attrs.custom {
        quote! { ::tessera::FormatReader::use_custom_constructor(reader, var) }
    } else {
        fallback
    }
}

fn shape_expr(name: &Ident, attrs: &ContainerAttrs, def: TokenStream2) -> TokenStream2 {
    let ident = Literal::string(&name.to_string());
    if attrs.custom {
        quote! { &::tessera::Shape::new(#ident, #def).with_custom_constructor() }
    } else {
        quote! { &::tessera::Shape::new(#ident, #def) }
    }
}

pub(crate) fn emit_struct(
    name: &Ident,
    attrs: &ContainerAttrs,
    fields: &Fields,
    errors: &mut Errors,
) -> TokenStream2 {
    match fields {
        Fields::Named(fields) => emit_record(name, attrs, fields, errors),
        Fields::Tuple(fields) if fields.len() == 1 => {
            check_tuple_fields(fields, errors);
            emit_newtype(name, attrs, &fields[0])
        }
        Fields::Tuple(fields) => {
            check_tuple_fields(fields, errors);
            emit_tuple(name, attrs, fields)
        }
        Fields::Unit => emit_unit(name, attrs),
    }
}

fn emit_record(
    name: &Ident,
    attrs: &ContainerAttrs,
    fields: &[ParsedField],
    errors: &mut Errors,
) -> TokenStream2 {
    let rule = attrs.rename_all;
    check_named_fields(fields, rule, errors);

    let descriptors = field_descriptors(fields, rule);
    let keys = key_list(fields, rule);
    let check = key_check(quote! { <#name as ::tessera::Record>::KEYS }, &name.to_string());
    let count = field_count(fields);
    let deny = attrs.deny_unknown_fields;
    let write_fields = write_named(fields, rule, |ident| quote! { &self.#ident });
    let read_fields = read_named(fields, rule, quote! { #name });
    let shape = shape_expr(
        name,
        attrs,
        quote! { ::tessera::Def::Record(Self::__TESSERA_FIELDS) },
    );
    let read = read_body(
        attrs,
        quote! { ::tessera::read_record(reader, var) },
    );

    quote! {
        impl #name {
            #[doc(hidden)]
            const __TESSERA_FIELDS: &'static [::tessera::Field] = &[#(#descriptors),*];
        }

        impl ::tessera::Model for #name {
            const SHAPE: &'static ::tessera::Shape = #shape;

            fn read<'de, R: ::tessera::FormatReader<'de>>(
                reader: &R,
                var: R::Var,
            ) -> ::tessera::Result<Self> {
                #read
            }

            fn write<W: ::tessera::FormatWriter>(
                &self,
                writer: &mut W,
                parent: ::tessera::Parent<'_, W>,
            ) {
                ::tessera::write_record(self, writer, parent)
            }
        }

        impl ::tessera::Record for #name {
            const FIELD_COUNT: usize = #count;
            const DENY_UNKNOWN_FIELDS: bool = #deny;
            const KEYS: &'static [::tessera::RecordKey] = #keys;

            #[allow(unused_variables)]
            fn write_fields<W: ::tessera::FormatWriter>(
                &self,
                writer: &mut W,
                object: &mut W::Object,
            ) {
                #write_fields
            }

            #[allow(unused_variables)]
            fn read_fields<'de, R: ::tessera::FormatReader<'de>>(
                reader: &R,
                object: R::Object,
            ) -> ::tessera::Result<Self> {
                ::core::result::Result::Ok(#read_fields)
            }
        }

        #check
    }
}

/// A single-field tuple struct is transparent: it has its field's tree form.
fn emit_newtype(name: &Ident, attrs: &ContainerAttrs, field: &ParsedField) -> TokenStream2 {
    let ty = &field.ty;
    let shape = shape_expr(name, attrs, quote! { <#ty as ::tessera::Model>::SHAPE.def });
    let read = read_body(
        attrs,
        quote! { <#ty as ::tessera::Model>::read(reader, var).map(#name) },
    );
    let vacant = if attrs.custom {
        quote! {}
    } else {
        quote! {
            fn vacant() -> ::core::option::Option<Self> {
                <#ty as ::tessera::Model>::vacant().map(#name)
            }
        }
    };

    quote! {
        impl ::tessera::Model for #name {
            const SHAPE: &'static ::tessera::Shape = #shape;

            fn read<'de, R: ::tessera::FormatReader<'de>>(
                reader: &R,
                var: R::Var,
            ) -> ::tessera::Result<Self> {
                #read
            }

            fn write<W: ::tessera::FormatWriter>(
                &self,
                writer: &mut W,
                parent: ::tessera::Parent<'_, W>,
            ) {
                ::tessera::Model::write(&self.0, writer, parent)
            }

            #vacant
        }
    }
}

fn emit_tuple(name: &Ident, attrs: &ContainerAttrs, fields: &[ParsedField]) -> TokenStream2 {
    let shapes = item_shapes(fields);
    let shape = shape_expr(name, attrs, quote! { ::tessera::Def::Tuple(Self::__TESSERA_ITEMS) });
    let positional = read_positional(fields.len(), quote! { #name });
    let read = read_body(
        attrs,
        quote! {
            let array = ::tessera::FormatReader::to_array(reader, var)?;
            ::core::result::Result::Ok(#positional)
        },
    );
    let values: Vec<_> = (0..fields.len())
        .map(|i| {
            let index = Literal::usize_unsuffixed(i);
            quote! { &self.#index }
        })
        .collect();
    let write = write_positional(&values);

    quote! {
        impl #name {
            #[doc(hidden)]
            const __TESSERA_ITEMS: &'static [::tessera::ShapeFn] = &[#(#shapes),*];
        }

        impl ::tessera::Model for #name {
            const SHAPE: &'static ::tessera::Shape = #shape;

            fn read<'de, R: ::tessera::FormatReader<'de>>(
                reader: &R,
                var: R::Var,
            ) -> ::tessera::Result<Self> {
                #read
            }

            fn write<W: ::tessera::FormatWriter>(
                &self,
                writer: &mut W,
                parent: ::tessera::Parent<'_, W>,
            ) {
                #write
            }
        }
    }
}

fn emit_unit(name: &Ident, attrs: &ContainerAttrs) -> TokenStream2 {
    let shape = shape_expr(name, attrs, quote! { ::tessera::Def::Unit });
    let read = read_body(
        attrs,
        quote! { <() as ::tessera::Model>::read(reader, var).map(|()| #name) },
    );

    quote! {
        impl ::tessera::Model for #name {
            const SHAPE: &'static ::tessera::Shape = #shape;

            fn read<'de, R: ::tessera::FormatReader<'de>>(
                reader: &R,
                var: R::Var,
            ) -> ::tessera::Result<Self> {
                #read
            }

            fn write<W: ::tessera::FormatWriter>(
                &self,
                writer: &mut W,
                parent: ::tessera::Parent<'_, W>,
            ) {
                <() as ::tessera::Model>::write(&(), writer, parent)
            }
        }
    }
}

/// Binding names `f0, f1, ..` for positional payloads.
pub(crate) fn positional_bindings(count: usize) -> Vec<Ident> {
    (0..count).map(|i| format_ident!("f{}", i)).collect()
}
