#[occi_derive::occi_error]
pub enum HeaderError {
    /// Malformed structured header value.
    #[status(400)]
    #[error("{header}: invalid header value: {message}")]
    Invalid { header: String, message: String },
}

impl HeaderError {
    pub(crate) fn invalid(header: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid { header: header.into(), message: message.into() }
    }
}
