use std::borrow::Cow;

#[occi_derive::occi_error]
pub enum RendererError {
    #[status(406)]
    #[error("\"{accept}\": No acceptable renderer")]
    NoAcceptableRenderer { accept: String },

    #[error("JSON rendering failed{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },
}
