use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let store_id = store_id(&input.attrs)?;
    let id_field = id_field(&input)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let store_id = match store_id {
        Some(id) => quote! { ::core::option::Option::Some(#id) },
        None => quote! { ::core::option::Option::None },
    };

    Ok(quote! {
        impl #impl_generics persistive_rust::Record for #name #ty_generics #where_clause {
            const STORE_ID: ::core::option::Option<&'static str> = #store_id;

            fn id(&self) -> &str {
                &self.#id_field
            }
        }
    })
}

/// The `store_id = "..."` of the container attributes, if any.
fn store_id(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut found: Option<LitStr> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("store_id") {
                return Err(meta.error(
                    "unsupported record attribute on a struct, expected `store_id = \"...\"`",
                ));
            }
            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(syn::Error::new_spanned(&value, "`store_id` must not be empty"));
            }
            if found.is_some() {
                return Err(meta.error("duplicate `store_id`"));
            }
            found = Some(value);
            Ok(())
        })?;
    }
    Ok(found)
}

/// The field marked `#[record(id)]`, else the field named `id`.
fn id_field(input: &DeriveInput) -> syn::Result<Ident> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record can only be derived for structs",
            ))
        }
    };

    let mut marked: Option<&Ident> = None;
    for field in fields {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("record")) {
            attr.parse_nested_meta(|meta| {
                if !meta.path.is_ident("id") {
                    return Err(
                        meta.error("unsupported record attribute on a field, expected `id`")
                    );
                }
                if marked.is_some() {
                    return Err(meta.error("only one field can be marked `#[record(id)]`"));
                }
                marked = field.ident.as_ref();
                Ok(())
            })?;
        }
    }

    marked
        .or_else(|| {
            fields
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .find(|ident| *ident == "id")
        })
        .cloned()
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "no field marked `#[record(id)]` and no field named `id`",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn error_of(input: DeriveInput) -> String {
        expand(input).unwrap_err().to_string()
    }

    #[test]
    fn expands_with_default_id_field() {
        let tokens = expand(parse_quote! {
            #[record(store_id = "todos")]
            struct Todo {
                id: String,
                title: String,
            }
        })
        .unwrap()
        .to_string();

        assert!(tokens.contains("Some (\"todos\")"));
        assert!(tokens.contains("& self . id"));
    }

    #[test]
    fn marked_field_wins_over_id_name() {
        let tokens = expand(parse_quote! {
            struct Contact {
                id: u64,
                #[record(id)]
                email: String,
            }
        })
        .unwrap()
        .to_string();

        assert!(tokens.contains("& self . email"));
        assert!(tokens.contains("None"));
    }

    #[test]
    fn misspelled_store_id_is_rejected() {
        let err = error_of(parse_quote! {
            #[record(storeid = "todos")]
            struct Todo {
                id: String,
            }
        });
        assert!(err.contains("expected `store_id"), "{}", err);
    }

    #[test]
    fn store_id_must_be_a_string() {
        let err = error_of(parse_quote! {
            #[record(store_id = 7)]
            struct Todo {
                id: String,
            }
        });
        assert!(!err.is_empty());
    }

    #[test]
    fn empty_store_id_is_rejected() {
        let err = error_of(parse_quote! {
            #[record(store_id = "")]
            struct Todo {
                id: String,
            }
        });
        assert!(err.contains("must not be empty"), "{}", err);
    }

    #[test]
    fn unknown_field_attribute_is_rejected() {
        let err = error_of(parse_quote! {
            struct Todo {
                #[record(key)]
                id: String,
            }
        });
        assert!(err.contains("expected `id`"), "{}", err);
    }

    #[test]
    fn two_id_fields_are_rejected() {
        let err = error_of(parse_quote! {
            struct Todo {
                #[record(id)]
                a: String,
                #[record(id)]
                b: String,
            }
        });
        assert!(err.contains("only one field"), "{}", err);
    }

    #[test]
    fn missing_id_field_is_an_error() {
        let err = error_of(parse_quote! {
            struct Todo {
                title: String,
            }
        });
        assert!(err.contains("no field named `id`"), "{}", err);
    }

    #[test]
    fn enums_are_rejected() {
        let err = error_of(parse_quote! {
            enum Todo {
                Open,
            }
        });
        assert!(err.contains("only be derived for structs"), "{}", err);
    }
}
