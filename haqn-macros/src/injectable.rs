//! `#[derive(Injectable)]`

use darling::ast::Data;
use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<(), InjectField>,
    lifetime: Option<syn::LitStr>,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    #[darling(default)]
    default: bool,
}

pub(super) fn expand_injectable(input: &syn::DeriveInput) -> darling::Result<TokenStream> {
    let input = InjectableInput::from_derive_input(input)?;
    let lifetime = lifetime_variant(input.lifetime.as_ref())?;

    let fields = input
        .data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?;

    let injected: Vec<&InjectField> = fields.iter().filter(|field| !field.default).collect();
    let injected_types = injected.iter().map(|field| &field.ty);

    let construct = if fields.style.is_unit() {
        quote!(Self)
    } else {
        let values = fields.iter().map(|field| {
            let ident = &field.ident;
            let ty = &field.ty;
            if field.default {
                quote!(#ident: ::std::default::Default::default())
            } else {
                quote!(#ident: <#ty as ::haqn::injectable::FromResolver>::from_resolver(resolver)?)
            }
        });
        quote!(Self { #(#values),* })
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::haqn::injectable::Injectable for #ident #ty_generics #where_clause {
            #[inline]
            fn lifetime() -> ::haqn::lifetime::Lifetime {
                ::haqn::lifetime::Lifetime::#lifetime
            }

            #[allow(unused_mut)]
            fn dependencies() -> ::std::vec::Vec<::haqn::key::DependencyKey> {
                let mut dependencies = ::std::vec::Vec::new();
                #(dependencies.extend(<#injected_types as ::haqn::injectable::FromResolver>::dependency());)*
                dependencies
            }

            #[allow(unused_variables)]
            fn inject(resolver: &dyn ::haqn::registry::Resolver) -> ::haqn::error::Result<Self> {
                ::std::result::Result::Ok(#construct)
            }
        }
    })
}

fn lifetime_variant(lifetime: Option<&syn::LitStr>) -> darling::Result<syn::Ident> {
    let Some(lit) = lifetime else {
        return Ok(format_ident!("Transient"));
    };
    match lit.value().as_str() {
        "singleton" => Ok(format_ident!("Singleton")),
        "scoped" => Ok(format_ident!("Scoped")),
        "transient" => Ok(format_ident!("Transient")),
        other => Err(darling::Error::custom(format!(
            "unknown lifetime `{other}`, expected \"singleton\", \"scoped\" or \"transient\""
        ))
        .with_span(lit)),
    }
}
