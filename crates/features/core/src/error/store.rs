use super::EntityError;
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum StoreError {
    #[status(404)]
    #[error("\"{id}\": Entity not found")]
    NotFound { id: String },

    /// The backend refuses the operation.
    #[status(400)]
    #[error("Invalid operation{}: {message}", format_context(.context))]
    InvalidOperation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(501)]
    #[error("Not implemented: {operation}")]
    NotImplemented { operation: Cow<'static, str> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Entity { source: EntityError, context: Option<Cow<'static, str>> },

    #[error("Backend error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StoreError {
    pub fn invalid_operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidOperation { message: message.into(), context: None }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}
