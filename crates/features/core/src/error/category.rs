use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum CategoryError {
    /// Malformed definition or a rejected registration.
    #[status(400)]
    #[error("Invalid category{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(404)]
    #[error("\"{id}\": Category does not exist")]
    DoesNotExist { id: String },
}

impl CategoryError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid { message: message.into(), context: None }
    }
}
