//! Action invocations.

use crate::attribute::AttributeValue;
use crate::category::CategoryRef;
use crate::error::ActionError;
use fxhash::FxHashMap;

/// A request to run an action, with parameters validated against the action's
/// attribute definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInstance {
    category: CategoryRef,
    parameters: FxHashMap<String, AttributeValue>,
}

impl ActionInstance {
    #[must_use]
    pub fn new(category: CategoryRef) -> Self {
        Self { category, parameters: FxHashMap::default() }
    }

    #[must_use]
    pub const fn category(&self) -> &CategoryRef {
        &self.category
    }

    #[must_use]
    pub fn term(&self) -> &str {
        self.category.term()
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&AttributeValue> {
        self.parameters.get(name)
    }

    #[must_use]
    pub const fn parameters(&self) -> &FxHashMap<String, AttributeValue> {
        &self.parameters
    }

    /// Validates and stores the invocation parameters.
    ///
    /// # Errors
    /// [`ActionError::DuplicateParameter`], [`ActionError::UnknownParameter`],
    /// [`ActionError::RequiredParameter`] or [`ActionError::InvalidValue`].
    /// Parameters are only replaced when all of them are valid.
    pub fn bind_parameters<N, V>(
        &mut self,
        parameters: impl IntoIterator<Item = (N, V)>,
    ) -> Result<(), ActionError>
    where
        N: Into<String>,
        V: Into<AttributeValue>,
    {
        let mut input: Vec<(String, AttributeValue)> = Vec::new();
        for (name, value) in parameters {
            let name = name.into();
            if input.iter().any(|(seen, _)| *seen == name) {
                return Err(ActionError::DuplicateParameter { name });
            }
            input.push((name, value.into()));
        }

        let mut bound = FxHashMap::default();
        for definition in self.category.attributes() {
            if let Some(index) = input.iter().position(|(name, _)| name == definition.name()) {
                let (name, value) = input.swap_remove(index);
                bound.insert(name, definition.coerce(value)?);
            } else if definition.is_required() {
                return Err(ActionError::RequiredParameter { name: definition.name().to_owned() });
            }
        }

        if let Some((name, _)) = input.into_iter().next() {
            return Err(ActionError::UnknownParameter { name });
        }

        self.parameters = bound;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::category::Category;

    fn resize() -> CategoryRef {
        Category::action("resize", "http://example.com/storage/action#")
            .attribute(Attribute::float("size").required())
            .attribute(Attribute::string("method"))
            .build()
            .unwrap()
    }

    #[test]
    fn binds_and_coerces_parameters() {
        let mut action = ActionInstance::new(resize());
        action.bind_parameters([("size", "20")]).unwrap();
        assert_eq!(action.parameter("size"), Some(&AttributeValue::Float(20.0)));
        assert_eq!(action.term(), "resize");
    }

    #[test]
    fn required_parameter_is_enforced() {
        let mut action = ActionInstance::new(resize());
        let err = action.bind_parameters([("method", "online")]).unwrap_err();
        assert!(matches!(err, ActionError::RequiredParameter { ref name } if name == "size"));
    }

    #[test]
    fn unknown_and_duplicate_parameters_are_rejected() {
        let mut action = ActionInstance::new(resize());
        let err = action.bind_parameters([("size", "1"), ("color", "red")]).unwrap_err();
        assert!(matches!(err, ActionError::UnknownParameter { .. }));

        let err = action.bind_parameters([("size", "1"), ("size", "2")]).unwrap_err();
        assert!(matches!(err, ActionError::DuplicateParameter { .. }));
        assert!(action.parameters().is_empty());
    }

    #[test]
    fn invalid_value_keeps_attribute_status() {
        let mut action = ActionInstance::new(resize());
        let err = action.bind_parameters([("size", "big")]).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().starts_with("size='big'"));
    }
}
