#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the OCCI crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! occi-derive = { path = "../../infra/derive" }
//! thiserror = "2"
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining domain error enums.
///
/// Turns a plain enum into a `thiserror` error wired for the HTTP front-end.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `#[source]` field.
/// * **Internal Fallback**: Provides `From<&str>` and `From<String>` if an `Internal`
///   variant is present.
/// * **Status Codes**: Generates `status_code()` from `#[status(..)]` variant attributes.
///   `#[status(404)]` maps a variant to a fixed code, `#[status(transparent)]` delegates to
///   the wrapped source error. Variants without the attribute map to `500`.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants wrapping another error must include a `source` field (or a field marked
///    `#[source]`/`#[from]`) and a `context: Option<Cow<'static, str>>` field.
/// 3. `#[status(transparent)]` is only valid on variants with a source.
///
/// # Example
///
/// ```rust,ignore
/// use occi_derive::occi_error;
/// use std::borrow::Cow;
///
/// #[occi_error]
/// pub enum StoreError {
///     #[status(404)]
///     #[error("\"{id}\": Entity not found")]
///     NotFound { id: String },
///
///     #[status(transparent)]
///     #[error("{source}{}", format_context(.context))]
///     Entity { source: EntityError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// assert_eq!(StoreError::NotFound { id: "x".into() }.status_code(), 404);
/// ```
#[proc_macro_attribute]
pub fn occi_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
