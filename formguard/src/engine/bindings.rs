//! Registration of forms, fields, message elements, rules and triggers.

use formdom::{Dom, NodeId, Tag};
use log::{debug, error};

use super::state::{FieldState, FormState};
use super::{Validation, field_not_found, field_not_registered, form_not_registered};
use crate::error::ValidationError;

/// Which outcome a message element displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    Valid,
    Invalid,
}

impl<D: Dom> Validation<D> {
    /// Take over validation of the form with `form_id`.
    ///
    /// Disables native validation and registers every control with an id.
    /// Registering the same form again discards all of its previous state,
    /// including pending timers.
    pub fn register_form(&mut self, form_id: &str) -> Result<(), ValidationError> {
        if form_id.trim().is_empty() {
            return Err(ValidationError::not_found("form must have an id"));
        }
        let form = self
            .dom
            .element_by_id(form_id)
            .ok_or_else(|| ValidationError::not_found(format!("form {form_id} not found")))?;
        if self.dom.tag(form) != Some(Tag::Form) {
            return Err(ValidationError::not_found("element is not a form").with_target(form));
        }

        self.dom.set_attribute(form, "novalidate", "");

        let mut state = FormState::new();
        for control in self.dom.form_controls(form) {
            state.field_mut_or_insert(&self.dom.id(control));
        }
        debug!("registered form #{form_id} with {} fields", state.len());

        if let Some(previous) = self.forms.insert(form_id.to_string(), state) {
            for id in previous.timer_ids() {
                self.timers.remove(&id);
            }
        }
        self.passes.retain(|_, pass| pass.form != form);
        Ok(())
    }

    /// Get a field's state, creating it if the form has none for `field_id`.
    pub fn register_field(
        &mut self,
        form_id: &str,
        field_id: &str,
    ) -> Result<&mut FieldState, ValidationError> {
        let form = self
            .forms
            .get_mut(form_id)
            .ok_or_else(|| form_not_registered(form_id))?;
        Ok(form.field_mut_or_insert(field_id))
    }

    /// Bind `message` to display the valid or invalid text of `field_id`.
    ///
    /// The field is looked up in the form enclosing `message`.
    pub fn register_message(
        &mut self,
        role: MessageRole,
        message: NodeId,
        field_id: &str,
    ) -> Result<(), ValidationError> {
        let form = self.dom.closest_form(message).ok_or_else(|| {
            ValidationError::not_found("message not inside a form").with_target(message)
        })?;
        let form_id = self.dom.id(form);
        if self.dom.field_element(&form_id, field_id).is_none() {
            return Err(field_not_found(&form_id, field_id).with_target(message));
        }

        let field = self
            .register_field(&form_id, field_id)
            .map_err(|err| err.with_target(message))?;
        match role {
            MessageRole::Valid => field.messages.valid = Some(message),
            MessageRole::Invalid => field.messages.invalid = Some(message),
        }
        Ok(())
    }

    /// Declare the custom rules of `target`, space separated, in order.
    pub fn register_rules(&mut self, target: NodeId, names: &str) -> Result<(), ValidationError> {
        let tag = self
            .dom
            .tag(target)
            .ok_or_else(|| ValidationError::not_found("element not found").with_target(target))?;
        if !tag.is_control() {
            return Err(ValidationError::not_found(format!("invalid tag {tag}")).with_target(target));
        }
        let (_, form_id, field_id) = self.identify(target)?;

        let field = self
            .register_field(&form_id, &field_id)
            .map_err(|err| err.with_target(target))?;
        field.set_custom_rules(names.split_whitespace());
        Ok(())
    }

    /// Re-validate `target` whenever one of `sources` becomes valid.
    ///
    /// Unknown sources are logged and skipped. Returns how many were linked.
    pub fn register_trigger(
        &mut self,
        target: NodeId,
        sources: &[&str],
    ) -> Result<usize, ValidationError> {
        let form = self.dom.closest_form(target).ok_or_else(|| {
            ValidationError::not_found("element not inside a form").with_target(target)
        })?;
        let form_id = self.dom.id(form);
        let state = self
            .forms
            .get_mut(&form_id)
            .ok_or_else(|| form_not_registered(&form_id).with_target(target))?;

        let mut linked = 0;
        for source in sources.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match state.field_mut(source) {
                Some(field) => {
                    field.add_trigger(target);
                    linked += 1;
                }
                None => {
                    let err = field_not_registered(source).with_target(target);
                    error!("{}", err.describe(&self.dom));
                }
            }
        }
        Ok(linked)
    }
}
