#[occi_derive::occi_error]
pub enum AttributeError {
    /// A wire string could not be coerced into the attribute's type.
    #[status(400)]
    #[error("{name}='{value}': invalid attribute value")]
    Invalid { name: String, value: String },
}
