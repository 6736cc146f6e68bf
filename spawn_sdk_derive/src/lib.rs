use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

/// Derives `spawn_sdk::Message` for a serde-serializable type.
///
/// The wire type name defaults to `<module path>::<Ident>` and can be pinned
/// with `#[message(type_name = "...")]` so it stays stable across refactors.
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_message(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct MessageOptions {
    type_name: Option<String>,
}

fn expand_message(input: DeriveInput) -> syn::Result<TokenStream2> {
    let ident = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Message does not support generic types",
        ));
    }

    let options = parse_message_options(&input.attrs)?;
    let type_name = match options.type_name {
        Some(name) => {
            if name.trim().is_empty() {
                return Err(syn::Error::new(
                    ident.span(),
                    "message type_name must not be empty",
                ));
            }
            quote!(#name)
        }
        None => {
            let ident_str = ident.to_string();
            quote!(concat!(module_path!(), "::", #ident_str))
        }
    };

    Ok(quote! {
        impl ::spawn_sdk::Message for #ident {
            const TYPE_NAME: &'static str = #type_name;
        }
    })
}

fn parse_message_options(attrs: &[syn::Attribute]) -> syn::Result<MessageOptions> {
    let mut options = MessageOptions { type_name: None };

    for attr in attrs {
        if !attr.path().is_ident("message") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.type_name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error("Unsupported message attribute. Supported: type_name = \"...\""))
        })?;
    }

    Ok(options)
}
