use super::AttributeError;
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum EntityError {
    #[status(400)]
    #[error("\"{name}\": Unknown Category")]
    UnknownCategory { name: String },

    #[status(400)]
    #[error("\"{name}\": Invalid Category: {message}")]
    InvalidCategory { name: String, message: Cow<'static, str> },

    #[status(400)]
    #[error("\"{name}\": Unknown attribute")]
    UnknownAttribute { name: String },

    #[status(400)]
    #[error("\"{name}\": Duplicate attribute")]
    DuplicateAttribute { name: String },

    #[status(400)]
    #[error("\"{name}\": Immutable attribute")]
    ImmutableAttribute { name: String },

    #[status(400)]
    #[error("\"{name}\": Required attribute")]
    RequiredAttribute { name: String },

    #[status(404)]
    #[error("\"{id}\": Entity does not exist")]
    DoesNotExist { id: String },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    InvalidValue { source: AttributeError, context: Option<Cow<'static, str>> },
}
