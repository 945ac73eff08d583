//! State-machine behavior shared by the Infrastructure Kinds.

use occi_core::{ActionInstance, AttributeValue, Entity, EntityBehavior, EntityError};
use tracing::debug;

/// A state change triggered by an action.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub action: &'static str,
    /// States the action is applicable in.
    pub from: &'static [&'static str],
    /// `None` keeps the current state.
    pub to: Option<&'static str>,
}

/// Drives a state attribute through a fixed transition table.
///
/// An action is applicable exactly when a transition for it starts in the
/// current state. Action parameters listed in `copies` are written to the
/// named attribute before the state changes.
#[derive(Debug, Clone)]
pub struct LifecycleBehavior {
    state_attribute: &'static str,
    initial_state: &'static str,
    defaults: Vec<(&'static str, AttributeValue)>,
    transitions: &'static [Transition],
    copies: &'static [(&'static str, &'static str)],
}

impl LifecycleBehavior {
    #[must_use]
    pub const fn new(
        state_attribute: &'static str,
        initial_state: &'static str,
        transitions: &'static [Transition],
    ) -> Self {
        Self { state_attribute, initial_state, defaults: Vec::new(), transitions, copies: &[] }
    }

    /// Values set on every new entity.
    #[must_use]
    pub fn defaults(mut self, defaults: impl IntoIterator<Item = (&'static str, AttributeValue)>) -> Self {
        self.defaults = defaults.into_iter().collect();
        self
    }

    /// `(parameter, attribute)` pairs copied from action parameters.
    #[must_use]
    pub const fn copies(mut self, copies: &'static [(&'static str, &'static str)]) -> Self {
        self.copies = copies;
        self
    }

    fn state<'a>(&self, entity: &'a Entity) -> &'a str {
        entity.attribute(self.state_attribute).and_then(AttributeValue::as_str).unwrap_or_default()
    }

    fn refresh(&self, entity: &mut Entity) -> Result<(), EntityError> {
        let state = self.state(entity).to_owned();
        for action in entity.available_actions().to_vec() {
            let applicable = self
                .transitions
                .iter()
                .any(|t| t.action == action.term() && t.from.contains(&state.as_str()));
            entity.set_applicable_action(&action, applicable)?;
        }
        Ok(())
    }
}

impl EntityBehavior for LifecycleBehavior {
    fn initialize(&self, entity: &mut Entity) -> Result<(), EntityError> {
        let mut values = self.defaults.clone();
        values.push((self.state_attribute, AttributeValue::from(self.initial_state)));
        entity.import_attributes(values, false)?;
        self.refresh(entity)
    }

    fn exec_action(&self, entity: &mut Entity, action: &ActionInstance) -> Result<(), EntityError> {
        let state = self.state(entity).to_owned();
        let transition = self
            .transitions
            .iter()
            .find(|t| t.action == action.term() && t.from.contains(&state.as_str()))
            .ok_or_else(|| EntityError::InvalidCategory {
                name: action.category().id().to_owned(),
                message: format!("not applicable in state \"{state}\"").into(),
            })?;

        let copied: Vec<(&str, AttributeValue)> = self
            .copies
            .iter()
            .filter_map(|(parameter, attribute)| action.parameter(parameter).map(|v| (*attribute, v.clone())))
            .collect();
        if !copied.is_empty() {
            entity.import_attributes(copied, false)?;
        }

        if let Some(next) = transition.to {
            entity.import_attributes([(self.state_attribute, next)], false)?;
            debug!(entity = ?entity.id(), from = %state, to = next, "State changed");
        }
        self.refresh(entity)
    }
}
