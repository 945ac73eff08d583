use occi_core::CategoryError;
use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum InfrastructureError {
    #[status(transparent)]
    #[error("Infrastructure categories{}: {source}", format_context(.context))]
    Category { source: CategoryError, context: Option<Cow<'static, str>> },
}
