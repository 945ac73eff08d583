use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::ParseStream;
use syn::{Attribute, Ident, LitInt};

pub enum Status {
    Code(u16),
    Transparent,
}

pub struct StatusArm<'a> {
    pub ident: &'a Ident,
    pub source_field: Option<&'a Ident>,
    pub status: Option<&'a Status>,
    pub cfg_attrs: &'a [Attribute],
}

/// Removes every `#[status(..)]` attribute from `attrs`, returning the last one parsed.
pub fn take_status(attrs: &mut Vec<Attribute>) -> syn::Result<Option<Status>> {
    let mut status = None;
    let mut error = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("status") {
            return true;
        }
        match attr.parse_args_with(parse_status) {
            Ok(parsed) => status = Some(parsed),
            Err(err) => error = Some(err),
        }
        false
    });

    error.map_or(Ok(status), Err)
}

fn parse_status(input: ParseStream<'_>) -> syn::Result<Status> {
    if input.peek(LitInt) {
        let lit: LitInt = input.parse()?;
        let code = lit.base10_parse::<u16>()?;
        if !(100..=599).contains(&code) {
            return Err(syn::Error::new(lit.span(), "status code must be within 100..=599"));
        }
        return Ok(Status::Code(code));
    }

    let ident: Ident = input.parse()?;
    if ident == "transparent" {
        Ok(Status::Transparent)
    } else {
        Err(syn::Error::new(ident.span(), "expected a status code or `transparent`"))
    }
}

pub fn generate_status_impl(name: &Ident, arms: &[StatusArm<'_>]) -> TokenStream {
    let arms = arms.iter().map(|arm| {
        let ident = arm.ident;
        let cfg_attrs = arm.cfg_attrs;
        match (arm.status, arm.source_field) {
            (Some(Status::Code(code)), _) => quote! { #(#cfg_attrs)* Self::#ident { .. } => #code, },
            (Some(Status::Transparent), Some(field)) => {
                quote! { #(#cfg_attrs)* Self::#ident { #field, .. } => #field.status_code(), }
            },
            _ => quote! { #(#cfg_attrs)* Self::#ident { .. } => 500, },
        }
    });

    quote! {
        #[automatically_derived]
        impl #name {
            /// HTTP status code this error maps to.
            #[must_use]
            #[allow(clippy::match_same_arms)]
            pub fn status_code(&self) -> u16 {
                match self {
                    #(#arms)*
                }
            }
        }
    }
}
