use proc_macro2::{Ident, Literal, TokenStream as TokenStream2};
use quote::{format_ident, quote};

use crate::emit_struct::{
    check_named_fields, check_tuple_fields, field_count, field_descriptors, item_shapes,
    key_check, key_list, positional_bindings, read_named, read_positional, write_named,
    write_positional,
};
use crate::parse::{ContainerAttrs, Errors, Fields, ParsedVariant};

/// Local name for a struct-variant field, clear of the generated locals.
fn binding(member: &Ident) -> Ident {
    let text = member.to_string();
    let text = text.strip_prefix("r#").unwrap_or(&text);
    format_ident!("__tessera_{}", text)
}

/// Enums are externally tagged: a unit variant is its bare tag, any other
/// variant is an object with the tag as its only key.
pub(crate) fn emit_enum(
    name: &Ident,
    attrs: &ContainerAttrs,
    variants: &[ParsedVariant],
    errors: &mut Errors,
) -> TokenStream2 {
    let rule = attrs.rename_all;
    if attrs.deny_unknown_fields {
        errors.push(name.span(), "`deny_unknown_fields` applies to structs only");
    }

    let mut tags: Vec<String> = Vec::new();
    let mut consts = Vec::new();
    let mut descriptors = Vec::new();
    let mut read_arms = Vec::new();
    let mut write_arms = Vec::new();
    let mut checks = Vec::new();

    for (index, variant) in variants.iter().enumerate() {
        let ident = &variant.ident;
        let tag = variant.tag(rule);
        if tags.contains(&tag) {
            errors.push(ident.span(), format!("two variants are tagged `{tag}`"));
        }
        tags.push(tag.clone());
        let tag = Literal::string(&tag);

        match &variant.fields {
            Fields::Unit => {
                descriptors.push(quote! {
                    ::tessera::Variant { name: #tag, kind: ::tessera::VariantKind::Unit }
                });
                read_arms.push(quote! {
                    (#tag, ::core::option::Option::None) => ::core::result::Result::Ok(Self::#ident),
                });
                write_arms.push(quote! {
                    Self::#ident => ::tessera::write_unit_variant(#tag, writer, parent),
                });
            }
            Fields::Tuple(fields) if fields.len() == 1 => {
                check_tuple_fields(fields, errors);
                let ty = &fields[0].ty;
                descriptors.push(quote! {
                    ::tessera::Variant {
                        name: #tag,
                        kind: ::tessera::VariantKind::Newtype(::tessera::shape_of::<#ty>),
                    }
                });
                read_arms.push(quote! {
                    (#tag, ::core::option::Option::Some(payload)) => {
                        <#ty as ::tessera::Model>::read(reader, payload)
                            .map(Self::#ident)
                            .map_err(|e| e.with_field(#tag))
                    }
                });
                write_arms.push(quote! {
                    Self::#ident(f0) => ::tessera::write_tagged(#tag, writer, parent, |writer, parent| {
                        ::tessera::Model::write(f0, writer, parent)
                    }),
                });
            }
            Fields::Tuple(fields) => {
                check_tuple_fields(fields, errors);
                let items = format_ident!("__TESSERA_VARIANT_{}_ITEMS", index);
                let shapes = item_shapes(fields);
                consts.push(quote! {
                    #[doc(hidden)]
                    const #items: &'static [::tessera::ShapeFn] = &[#(#shapes),*];
                });
                descriptors.push(quote! {
                    ::tessera::Variant {
                        name: #tag,
                        kind: ::tessera::VariantKind::Tuple(Self::#items),
                    }
                });
                let positional = read_positional(fields.len(), quote! { Self::#ident });
                read_arms.push(quote! {
                    (#tag, ::core::option::Option::Some(payload)) => {
                        (|| -> ::tessera::Result<Self> {
                            let array = ::tessera::FormatReader::to_array(reader, payload)?;
                            ::core::result::Result::Ok(#positional)
                        })()
                        .map_err(|e| e.with_field(#tag))
                    }
                });
                let bindings = positional_bindings(fields.len());
                let values: Vec<_> = bindings.iter().map(|b| quote! { #b }).collect();
                let write = write_positional(&values);
                write_arms.push(quote! {
                    Self::#ident(#(#bindings),*) => {
                        ::tessera::write_tagged(#tag, writer, parent, |writer, parent| { #write })
                    }
                });
            }
            Fields::Named(fields) => {
                check_named_fields(fields, rule, errors);
                let field_consts = format_ident!("__TESSERA_VARIANT_{}_FIELDS", index);
                let field_list = field_descriptors(fields, rule);
                let key_consts = format_ident!("__TESSERA_VARIANT_{}_KEYS", index);
                let keys = key_list(fields, rule);
                consts.push(quote! {
                    #[doc(hidden)]
                    const #field_consts: &'static [::tessera::Field] = &[#(#field_list),*];
                    #[doc(hidden)]
                    const #key_consts: &'static [::tessera::RecordKey] = #keys;
                });
                checks.push(key_check(
                    quote! { #name::#key_consts },
                    &format!("{name}::{ident}"),
                ));
                descriptors.push(quote! {
                    ::tessera::Variant {
                        name: #tag,
                        kind: ::tessera::VariantKind::Record(Self::#field_consts),
                    }
                });
                let build = read_named(fields, rule, quote! { Self::#ident });
                read_arms.push(quote! {
                    (#tag, ::core::option::Option::Some(payload)) => {
                        (|| -> ::tessera::Result<Self> {
                            let object = ::tessera::FormatReader::to_object(reader, payload)?;
                            ::core::result::Result::Ok(#build)
                        })()
                        .map_err(|e| e.with_field(#tag))
                    }
                });
                let count = field_count(fields);
                let fill = write_named(fields, rule, |member| {
                    let local = binding(member);
                    quote! { #local }
                });
                let members: Vec<&Ident> = fields
                    .iter()
                    .filter(|f| !f.attrs.skip)
                    .filter_map(|f| f.ident.as_ref())
                    .collect();
                let bound: Vec<Ident> = members.iter().map(|member| binding(member)).collect();
                write_arms.push(quote! {
                    Self::#ident { #(#members: #bound,)* .. } => {
                        ::tessera::write_tagged(#tag, writer, parent, |writer, parent| {
                            let mut object = parent.add_object(writer, #count);
                            {
                                let object = &mut object;
                                #fill
                            }
                            ::tessera::FormatWriter::end_object(writer, object);
                        })
                    }
                });
            }
        }
    }

    // references to uninhabited enums are not empty to the match checker
    let scrutinee = if variants.is_empty() {
        quote! { *self }
    } else {
        quote! { self }
    };
    let type_name = Literal::string(&name.to_string());
    let shape = if attrs.custom {
        quote! {
            &::tessera::Shape::new(#type_name, ::tessera::Def::Enum(Self::__TESSERA_VARIANTS))
                .with_custom_constructor()
        }
    } else {
        quote! { &::tessera::Shape::new(#type_name, ::tessera::Def::Enum(Self::__TESSERA_VARIANTS)) }
    };
    let read = if attrs.custom {
        quote! { ::tessera::FormatReader::use_custom_constructor(reader, var) }
    } else {
        quote! {
            let (tag, payload) = ::tessera::read_variant_tag(reader, var)?;
            match (tag.as_str(), payload) {
                #(#read_arms)*
                (tag, _) => ::core::result::Result::Err(::tessera::unexpected_variant(Self::SHAPE, tag)),
            }
        }
    };

    quote! {
        impl #name {
            #(#consts)*

            #[doc(hidden)]
            const __TESSERA_VARIANTS: &'static [::tessera::Variant] = &[#(#descriptors),*];
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
                match #scrutinee {
                    #(#write_arms)*
                }
            }
        }

        #(#checks)*
    }
}
