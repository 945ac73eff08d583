use super::{ActionError, CategoryError, EntityError};
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum DataObjectError {
    /// The object does not describe a valid entity or action.
    #[status(400)]
    #[error("Invalid data object{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Category { source: CategoryError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Entity { source: EntityError, context: Option<Cow<'static, str>> },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    Action { source: ActionError, context: Option<Cow<'static, str>> },
}

impl DataObjectError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Invalid { message: message.into(), context: None }
    }
}
