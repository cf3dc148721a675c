//! Per-form and per-field validation state.

use std::collections::HashMap;

use formdom::NodeId;
use tokio::task::AbortHandle;

use crate::command::TimerId;
use crate::validation::ValidationResult;

/// A scheduled debounce timer. Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct TimerHandle {
    pub(crate) id: TimerId,
    abort: AbortHandle,
}

impl TimerHandle {
    pub(crate) fn new(id: TimerId, abort: AbortHandle) -> Self {
        Self { id, abort }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// A custom rule declared on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRule {
    pub name: String,
    /// Set once a registry resolved this name during the current check.
    pub resolved: bool,
}

/// Message elements bound to a field. Owned by the host document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageTargets {
    pub valid: Option<NodeId>,
    pub invalid: Option<NodeId>,
}

/// Validation state of one form control.
#[derive(Debug)]
pub struct FieldState {
    pub(crate) debounce_timer: Option<TimerHandle>,
    /// Value seen by the last full check; `None` until the first one.
    pub compare_value: Option<String>,
    pub last_result: ValidationResult,
    pub messages: MessageTargets,
    /// Custom rule names in declaration order.
    pub custom_rules: Option<Vec<CustomRule>>,
    /// Elements to re-validate when this field becomes valid.
    pub triggers: Option<Vec<NodeId>>,
    /// Id of the latest full check; async settlements from older checks are dropped.
    pub(crate) check_seq: u64,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            debounce_timer: None,
            compare_value: None,
            last_result: ValidationResult::not_applicable(),
            messages: MessageTargets::default(),
            custom_rules: None,
            triggers: None,
            check_seq: 0,
        }
    }
}

impl FieldState {
    pub fn has_pending_timer(&self) -> bool {
        self.debounce_timer.is_some()
    }

    /// Replace the declared custom rules, all marked unresolved.
    ///
    /// A name declared twice keeps its first position.
    pub fn set_custom_rules<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        let mut rules: Vec<CustomRule> = Vec::new();
        for name in names {
            if rules.iter().any(|rule| rule.name == name) {
                continue;
            }
            rules.push(CustomRule {
                name: name.to_string(),
                resolved: false,
            });
        }
        self.custom_rules = Some(rules);
    }

    /// Names of declared custom rules no registry resolved.
    pub fn unresolved_rules(&self) -> Vec<String> {
        self.custom_rules
            .iter()
            .flatten()
            .filter(|rule| !rule.resolved)
            .map(|rule| rule.name.clone())
            .collect()
    }

    pub fn add_trigger(&mut self, target: NodeId) {
        let triggers = self.triggers.get_or_insert_with(Vec::new);
        if !triggers.contains(&target) {
            triggers.push(target);
        }
    }
}

/// Validation state of one form.
#[derive(Debug, Default)]
pub struct FormState {
    pub(crate) debounce_timer: Option<TimerHandle>,
    fields: HashMap<String, FieldState>,
    // Registration order, used when a submit walks every field.
    order: Vec<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldState> {
        self.fields.get(field_id)
    }

    pub fn field_mut(&mut self, field_id: &str) -> Option<&mut FieldState> {
        self.fields.get_mut(field_id)
    }

    /// Get the field, registering it with default state first if needed.
    pub fn field_mut_or_insert(&mut self, field_id: &str) -> &mut FieldState {
        if !self.fields.contains_key(field_id) {
            self.order.push(field_id.to_string());
        }
        self.fields.entry(field_id.to_string()).or_default()
    }

    /// Field ids in registration order.
    pub fn field_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.debounce_timer.is_some()
    }

    /// Ids of every timer owned by this form or its fields.
    pub(crate) fn timer_ids(&self) -> Vec<TimerId> {
        self.debounce_timer
            .iter()
            .chain(self.fields.values().filter_map(|f| f.debounce_timer.as_ref()))
            .map(|timer| timer.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults_to_valid_and_unset() {
        let field = FieldState::default();
        assert!(field.compare_value.is_none());
        assert!(field.last_result.is_valid());
        assert!(field.custom_rules.is_none());
        assert!(!field.has_pending_timer());
    }

    #[test]
    fn test_get_or_create_keeps_order() {
        let mut form = FormState::new();
        form.field_mut_or_insert("b").compare_value = Some("1".to_string());
        form.field_mut_or_insert("a");
        form.field_mut_or_insert("b");

        assert_eq!(form.field_ids(), ["b".to_string(), "a".to_string()]);
        assert_eq!(form.len(), 2);
        assert_eq!(form.field("b").unwrap().compare_value.as_deref(), Some("1"));
    }

    #[test]
    fn test_unresolved_rules() {
        let mut field = FieldState::default();
        field.set_custom_rules(["one", "two"]);
        field.custom_rules.as_mut().unwrap()[0].resolved = true;
        assert_eq!(field.unresolved_rules(), vec!["two".to_string()]);
    }

    #[test]
    fn test_duplicate_rule_names_collapse() {
        let mut field = FieldState::default();
        field.set_custom_rules(["one", "two", "one"]);
        let names: Vec<&str> = field
            .custom_rules
            .iter()
            .flatten()
            .map(|rule| rule.name.as_str())
            .collect();
        assert_eq!(names, ["one", "two"]);
    }
}
