//! # OCCI over HTTP
//!
//! Turns HTTP requests into calls on an [`EntityStore`](occi_core::EntityStore)
//! and renders the answers.
//!
//! * [`header`]: the `value; key="v"` grammar shared by the text codecs.
//! * [`parser`] / [`renderer`] / [`json`]: `text/occi`, `text/plain`,
//!   `text/uri-list` and `application/occi+json` codecs.
//! * [`negotiation`]: picks codecs from `Content-Type` and `Accept`.
//! * [`handlers`]: discovery, collection and entity semantics.
//! * [`router`]: the axum fallback that ties it together.
//!
//! ```rust,ignore
//! let app = occi_http::router(state);
//! axum_server::bind(address).serve(app.into_make_service()).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod header;
pub mod json;
pub mod message;
pub mod negotiation;
pub mod parser;
pub mod renderer;
pub mod router;

pub use crate::error::{ApiError, ApiErrorExt};
pub use crate::message::{OcciRequest, OcciResponse};
pub use crate::negotiation::Codecs;
pub use crate::router::{SERVER_HEADER, router, router_with_codecs};
