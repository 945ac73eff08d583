use occi_derive::occi_error;
use std::borrow::Cow;

#[occi_error]
pub enum DemoError {
    #[status(transparent)]
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: NestedError,
        context: Option<Cow<'static, str>>,
    },

    #[status(415)]
    #[error("Unsupported content type: {content_type}")]
    Unsupported { content_type: String },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

mod nested {
    use occi_derive::occi_error;

    #[occi_error]
    pub enum NestedError {
        #[status(406)]
        #[error("Not acceptable")]
        NotAcceptable {},
    }
}

use nested::NestedError;

fn main() {
    let err = DemoError::from(NestedError::NotAcceptable {});
    assert_eq!(err.status_code(), 406);
    assert_eq!(DemoError::Unsupported { content_type: "a/b".into() }.status_code(), 415);
    assert_eq!(DemoError::from("x").status_code(), 500);
}
