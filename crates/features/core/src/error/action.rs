use super::AttributeError;
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum ActionError {
    #[status(400)]
    #[error("\"{name}\": Unknown action parameter")]
    UnknownParameter { name: String },

    #[status(400)]
    #[error("\"{name}\": Required action parameter")]
    RequiredParameter { name: String },

    #[status(400)]
    #[error("\"{name}\": Duplicate action parameter")]
    DuplicateParameter { name: String },

    #[status(transparent)]
    #[error("{source}{}", format_context(.context))]
    InvalidValue { source: AttributeError, context: Option<Cow<'static, str>> },
}
