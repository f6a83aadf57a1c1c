//! `#[derive(Bindable)]`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::collections::HashSet;
use syn::{Data, DeriveInput, Field, Fields, LitStr, parse_macro_input};

/// Options collected from the `#[bind(..)]` attributes of one field.
#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
    adder: Option<String>,
}

impl FieldOptions {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut options = FieldOptions::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    options.rename = Some(lit.value());
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("adder") {
                    let lit: LitStr = meta.value()?.parse()?;
                    options.adder = Some(lit.value());
                } else {
                    return Err(meta.error("unknown bind attribute, expected `rename`, `skip` or `adder`"));
                }
                Ok(())
            })?;
        }
        if options.skip && (options.rename.is_some() || options.adder.is_some()) {
            return Err(syn::Error::new_spanned(
                field,
                "`skip` cannot be combined with other bind attributes",
            ));
        }
        if options.rename.is_some() && options.adder.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "`rename` has no effect on an `adder` field; name the method in `adder` instead",
            ));
        }
        Ok(options)
    }
}

/// Implementation of `#[derive(Bindable)]`.
pub fn derive_bindable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Bindable cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Bindable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Bindable can only be derived for structs",
            ));
        }
    };

    let mut property_arms = Vec::new();
    let mut method_arms = Vec::new();
    let mut properties = HashSet::new();
    let mut methods = HashSet::new();

    for field in fields {
        let options = FieldOptions::parse(field)?;
        if options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };

        if let Some(adder) = &options.adder {
            if !methods.insert(adder.clone()) {
                return Err(duplicate(field, "method", adder));
            }
            method_arms.push(quote! {
                #adder => {
                    let __arg = ::trellis::single_arg(__method, __args)?;
                    self.#ident.push(::trellis::Value::convert(__arg)?);
                    ::core::result::Result::Ok(::core::option::Option::None)
                }
            });
            continue;
        }

        let property = options
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_owned());
        if !properties.insert(property.clone()) {
            return Err(duplicate(field, "property", &property));
        }
        let setter = format!("set_{property}");
        if !methods.insert(setter.clone()) {
            return Err(duplicate(field, "method", &setter));
        }

        property_arms.push(quote! {
            #property => {
                self.#ident = ::trellis::Value::convert(__value)?;
                ::core::result::Result::Ok(())
            }
        });
        method_arms.push(quote! {
            #setter => {
                let __arg = ::trellis::single_arg(__method, __args)?;
                self.#ident = ::trellis::Value::convert(__arg)?;
                ::core::result::Result::Ok(::core::option::Option::None)
            }
        });
    }

    let type_name = LitStr::new(&name.to_string(), Span::call_site());
    let value_ty = quote!(::trellis::Value);
    let error_ty = quote!(::trellis::BindError);

    Ok(quote! {
        impl ::trellis::Bindable for #name {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            #[allow(unused_variables)]
            fn set_property(
                &mut self,
                __name: &str,
                __value: #value_ty,
            ) -> ::core::result::Result<(), #error_ty> {
                match __name {
                    #(#property_arms)*
                    _ => ::core::result::Result::Err(::trellis::Bindable::unknown_property(self, __name)),
                }
            }

            #[allow(unused_variables)]
            fn invoke(
                &mut self,
                __method: &str,
                __args: ::std::vec::Vec<#value_ty>,
            ) -> ::core::result::Result<::core::option::Option<#value_ty>, #error_ty> {
                match __method {
                    #(#method_arms)*
                    _ => ::core::result::Result::Err(::trellis::Bindable::unknown_method(self, __method)),
                }
            }
        }

        impl ::trellis::FromValue for #name {
            fn from_value(value: #value_ty) -> ::core::result::Result<Self, #error_ty> {
                ::trellis::object_from_value(value)
            }
        }
    })
}

fn duplicate(field: &Field, kind: &str, name: &str) -> syn::Error {
    syn::Error::new_spanned(field, format!("duplicate bindable {kind} `{name}`"))
}
