//! Implementation of `#[capabilities]`.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, FnArg, Ident, ImplItem, ItemImpl, LitStr, Token, bracketed,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Methods that are never exposed as actions.
const EXCLUDED: &[&str] = &["new", "init"];

/// Arguments for the `#[capabilities]` macro.
pub(crate) struct CapabilitiesArgs {
    pub events: Vec<LitStr>,
}

impl Parse for CapabilitiesArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut events = Vec::new();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "events" => {
                    let content;
                    bracketed!(content in input);
                    let list = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    events = list.into_iter().collect();
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(CapabilitiesArgs { events })
    }
}

#[derive(Default)]
struct ActionOptions {
    skip: bool,
    rename: Option<String>,
}

// Strips `#[action(..)]` attributes, which are only meaningful to us.
fn take_action_options(attrs: &mut Vec<Attribute>) -> syn::Result<ActionOptions> {
    let mut options = ActionOptions::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                options.rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unknown action option, expected `skip` or `rename`"))
            }
        })?;
    }
    attrs.retain(|attr| !attr.path().is_ident("action"));
    Ok(options)
}

pub(crate) fn expand(args: CapabilitiesArgs, input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[capabilities] must be placed on an inherent impl block",
        ));
    }

    let mut entries = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let options = take_action_options(&mut method.attrs)?;
        let ident = &method.sig.ident;
        if options.skip || EXCLUDED.contains(&ident.to_string().as_str()) {
            continue;
        }

        match method.sig.inputs.first() {
            Some(FnArg::Receiver(receiver))
                if receiver.reference.is_some() && receiver.mutability.is_none() => {}
            Some(FnArg::Receiver(receiver)) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "action methods must take `&self`; mark others with #[action(skip)]",
                ));
            }
            // Associated functions are not actions.
            _ => continue,
        }

        if method.sig.asyncness.is_some() {
            return Err(syn::Error::new_spanned(
                &method.sig.fn_token,
                "action methods must not be async",
            ));
        }

        let call = match method.sig.inputs.len() {
            1 => quote! { this.#ident() },
            2 => quote! { this.#ident(payload) },
            _ => {
                return Err(syn::Error::new_spanned(
                    &method.sig.inputs,
                    "action methods take `&self` and at most one payload argument",
                ));
            }
        };

        let action_name = options.rename.unwrap_or_else(|| ident.to_string());
        entries.push(quote! {
            {
                let this = ::std::sync::Arc::clone(&self);
                (
                    ::std::string::String::from(#action_name),
                    ::switchboard::Callback::new(
                        move |payload: ::core::option::Option<&::switchboard::Payload>| {
                            let _ = &payload;
                            #call
                        },
                    ),
                )
            }
        });
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();
    let events = &args.events;

    Ok(quote! {
        #input

        impl #impl_generics ::switchboard::Capabilities for #self_ty #where_clause {
            fn actions(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::vec::Vec<(::std::string::String, ::switchboard::Callback)> {
                ::std::vec![#(#entries),*]
            }

            fn events(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#events)),*]
            }
        }
    })
}
