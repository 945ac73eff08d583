//! Error types of the HTTP layer, one family per module.

mod api;
mod header;
mod parser;
mod renderer;

pub use api::{ApiError, ApiErrorExt};
pub use header::{HeaderError, HeaderErrorExt};
pub use parser::{ParserError, ParserErrorExt};
pub use renderer::{RendererError, RendererErrorExt};
