mod leaf {
    use occi_derive::occi_error;
    use std::borrow::Cow;

    #[occi_error]
    pub enum LeafError {
        #[status(404)]
        #[error("\"{id}\": missing")]
        Missing { id: String },

        #[status(400)]
        #[error("Invalid{}: {message}", format_context(.context))]
        Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

mod wrapper {
    use super::leaf::LeafError;
    use occi_derive::occi_error;
    use std::borrow::Cow;

    #[occi_error]
    pub enum WrapperError {
        #[status(transparent)]
        #[error("{source}{}", format_context(.context))]
        Leaf { source: LeafError, context: Option<Cow<'static, str>> },

        #[error("Internal error{}: {message}", format_context(.context))]
        Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    }
}

use leaf::LeafError;
use wrapper::WrapperError;

#[test]
fn fixed_status_codes() {
    assert_eq!(LeafError::Missing { id: "a".into() }.status_code(), 404);
    assert_eq!(LeafError::Invalid { message: "bad".into(), context: None }.status_code(), 400);
}

#[test]
fn transparent_status_follows_source() {
    let err: WrapperError = LeafError::Missing { id: "a".into() }.into();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "\"a\": missing");
}

#[test]
fn variants_without_status_are_internal() {
    let err = WrapperError::from("boom");
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.to_string(), "Internal error: boom");
}

#[test]
fn context_is_appended_to_message() {
    use wrapper::WrapperErrorExt;

    let res: Result<(), LeafError> = Err(LeafError::Missing { id: "x".into() });
    let err = res.context("loading entity").unwrap_err();
    assert_eq!(err.to_string(), "\"x\": missing (loading entity)");
    assert_eq!(err.status_code(), 404);
}

#[test]
fn own_context_trait_sets_context() {
    use leaf::LeafErrorExt;

    let res: Result<(), LeafError> =
        Err(LeafError::Invalid { message: "bad value".into(), context: None });
    let err = res.context("parsing").unwrap_err();
    assert_eq!(err.to_string(), "Invalid (parsing): bad value");
}

#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/occi_error_pass.rs");
}
