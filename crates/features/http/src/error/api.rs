use super::{ParserError, RendererError};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use occi_core::{ActionError, CategoryError, DataObjectError, EntityError, StoreError};
use occi_domain::constants::media;
use occi_kernel::security::path::PathGuardError;
use std::borrow::Cow;
use tracing::{error, warn};

/// Everything a request can fail with, mapped to its HTTP status.
#[occi_derive::occi_error]
pub enum ApiError {
    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Parser { source: ParserError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Renderer { source: RendererError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    DataObject { source: DataObjectError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Category { source: CategoryError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Entity { source: EntityError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Action { source: ActionError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Path { source: PathGuardError, context: Option<Cow<'static, str>> },

    #[status(400)]
    #[error("{message}")]
    BadRequest { message: Cow<'static, str> },

    #[status(401)]
    #[error("Unauthorized: {message}")]
    Unauthorized { message: Cow<'static, str> },

    #[status(403)]
    #[error("{message}")]
    Forbidden { message: Cow<'static, str> },

    #[status(404)]
    #[error("\"{path}\": Not found")]
    NotFound { path: String },

    #[status(501)]
    #[error("Not implemented: {message}")]
    NotImplemented { message: Cow<'static, str> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "Request failed");
        } else {
            warn!(%status, error = %self, "Request rejected");
        }
        let mut response = (status, self.to_string()).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(media::TEXT_PLAIN_UTF8));
        response
    }
}
