use super::HeaderError;
use occi_core::CategoryError;
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum ParserError {
    #[status(415)]
    #[error("\"{content_type}\": Unsupported content type")]
    UnsupportedContentType { content_type: String },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Header { source: HeaderError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Category { source: CategoryError, context: Option<Cow<'static, str>> },

    /// Well-formed input that does not describe OCCI content.
    #[status(400)]
    #[error("Invalid request body: {message}")]
    Invalid { message: Cow<'static, str> },

    #[status(400)]
    #[error("Invalid JSON{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

impl ParserError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid { message: message.into() }
    }
}
