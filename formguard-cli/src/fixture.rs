//! JSON fixtures: a form, the rules it uses and the events to replay.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use formdom::Element;
use formguard::ValidationOptions;
use formguard::validation::{async_rule, builtin, sync_rule};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub options: OptionsSpec,
    pub form: FormSpec,
    /// Custom rules by name.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSpec>,
    /// Message templates by rule name. `{message}` and `{value}` are substituted.
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsSpec {
    pub invalid_class: Option<String>,
    pub hidden_class: Option<String>,
    pub debounce_wait_ms: Option<u64>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormSpec {
    pub id: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub id: String,
    /// Input type, or `select` / `textarea`.
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub required: bool,
    pub pattern: Option<String>,
    /// Space separated custom rule names.
    pub rules: Option<String>,
    /// Fields whose becoming valid re-validates this one.
    #[serde(default)]
    pub triggered_by: Vec<String>,
    /// Render the field collapsed.
    #[serde(default)]
    pub hidden: bool,
    /// Add `<id>-valid` and `<id>-invalid` message elements.
    #[serde(default)]
    pub messages: bool,
}

fn default_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RuleCheck {
    MinLength { min: usize },
    MaxLength { max: usize },
    /// Whole-value pattern, matched like the `pattern` attribute.
    Matches { pattern: String },
    /// Any value except these.
    Deny { values: Vec<String> },
}

impl RuleCheck {
    pub fn passes(&self, value: &str) -> bool {
        match self {
            Self::MinLength { min } => value.chars().count() >= *min,
            Self::MaxLength { max } => value.chars().count() <= *max,
            Self::Matches { pattern } => builtin::pattern(pattern, value).is_valid(),
            Self::Deny { values } => !values.iter().any(|v| v == value),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RuleSpec {
    #[serde(flatten)]
    pub check: RuleCheck,
    pub message: String,
    /// Run as an async rule that settles after this delay.
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", deny_unknown_fields)]
pub enum EventSpec {
    /// Set a value without raising an event.
    Input { field: String, value: String },
    /// Set a checkbox without raising an event.
    Check { field: String, checked: bool },
    KeyUp { field: String, key: String },
    Change { field: String },
    Validate { field: String },
    Submit,
    /// Let deferred work run for a while.
    Wait { ms: u64 },
}

impl Fixture {
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        let fixture: Self = serde_json::from_str(text)?;
        fixture.check()?;
        Ok(fixture)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    fn check(&self) -> Result<(), CliError> {
        if self.form.id.trim().is_empty() {
            return Err(CliError::fixture("form needs an id"));
        }
        let mut seen = Vec::new();
        for field in &self.form.fields {
            if field.id.trim().is_empty() {
                return Err(CliError::fixture("every field needs an id"));
            }
            if seen.contains(&field.id.as_str()) {
                return Err(CliError::fixture(format!("duplicate field {}", field.id)));
            }
            seen.push(field.id.as_str());
        }
        Ok(())
    }

    /// Build the form markup.
    pub fn document(&self) -> Element {
        let mut form = Element::form().id(&self.form.id);
        for field in &self.form.fields {
            form = form.child(field.element());
            if field.messages {
                form = form
                    .child(Element::message("").id(format!("{}-valid", field.id)))
                    .child(Element::message("").id(format!("{}-invalid", field.id)));
            }
        }
        form.child(Element::button().id(format!("{}-submit", self.form.id)))
    }

    /// Engine options with every rule and translation registered.
    pub fn options(&self) -> ValidationOptions {
        let mut options = ValidationOptions::default().with_debug(self.options.debug);
        if let Some(class) = &self.options.invalid_class {
            options = options.with_invalid_class(class);
        }
        if let Some(class) = &self.options.hidden_class {
            options = options.with_hidden_class(class);
        }
        if let Some(ms) = self.options.debounce_wait_ms {
            options = options.with_debounce_wait(Duration::from_millis(ms));
        }

        for (name, spec) in &self.rules {
            let check = Arc::new(spec.check.clone());
            options = match spec.delay_ms {
                Some(ms) => options.with_async_rule(
                    name.as_str(),
                    async_rule(
                        name.as_str(),
                        move |value: String| {
                            let check = check.clone();
                            async move {
                                tokio::time::sleep(Duration::from_millis(ms)).await;
                                check.passes(&value)
                            }
                        },
                        spec.message.as_str(),
                    ),
                ),
                None => options.with_rule(
                    name.as_str(),
                    sync_rule(
                        name.as_str(),
                        move |value| check.passes(value),
                        spec.message.as_str(),
                    ),
                ),
            };
        }

        for (rule, template) in &self.translations {
            let template = template.clone();
            options = options.with_translation(rule.as_str(), move |result| {
                template
                    .replace("{message}", &result.message)
                    .replace("{value}", result.value.as_deref().unwrap_or(""))
            });
        }
        options
    }
}

impl FieldSpec {
    fn element(&self) -> Element {
        let element = match self.kind.to_lowercase().as_str() {
            "select" => Element::select(),
            "textarea" => Element::textarea(),
            "hidden" => Element::hidden(),
            other => Element::input(other),
        };
        let mut element = element
            .id(&self.id)
            .value(&self.value)
            .checked(self.checked)
            .required(self.required);
        if let Some(pattern) = &self.pattern {
            element = element.pattern(pattern);
        }
        if self.hidden {
            element = element.collapsed();
        }
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "form": { "id": "f", "fields": [{ "id": "name", "required": true }] }
    }"#;

    #[test]
    fn test_minimal_fixture_defaults() {
        let fixture = Fixture::from_json(MINIMAL).unwrap();
        let field = &fixture.form.fields[0];
        assert_eq!(field.kind, "text");
        assert!(field.required);
        assert!(fixture.events.is_empty());
        assert!(fixture.rules.is_empty());
    }

    #[test]
    fn test_rules_and_events_parse() {
        let fixture = Fixture::from_json(
            r#"{
                "form": { "id": "f", "fields": [{ "id": "name", "rules": "min-3 free" }] },
                "rules": {
                    "min-3": { "check": "min_length", "min": 3, "message": "Too short" },
                    "free": { "check": "deny", "values": ["admin"], "message": "Taken", "delay_ms": 20 }
                },
                "events": [
                    { "event": "input", "field": "name", "value": "ad" },
                    { "event": "key_up", "field": "name", "key": "d" },
                    { "event": "wait", "ms": 100 },
                    { "event": "submit" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(fixture.rules["free"].delay_ms, Some(20));
        assert!(fixture.rules["min-3"].check.passes("abc"));
        assert!(!fixture.rules["free"].check.passes("admin"));
        assert_eq!(fixture.events.len(), 4);
        assert!(matches!(fixture.events[3], EventSpec::Submit));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Fixture::from_json(
            r#"{ "form": { "id": "f", "fields": [{ "id": "a" }, { "id": "a" }] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Fixture(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Fixture::from_json(r#"{ "form": { "id": "f", "fields": [] }, "extra": 1 }"#)
            .unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }

    #[test]
    fn test_matches_check_is_anchored() {
        let check = RuleCheck::Matches {
            pattern: "[a-z]+".to_string(),
        };
        assert!(check.passes("abc"));
        assert!(!check.passes("abc1"));
    }

    #[test]
    fn test_document_adds_messages_and_submit() {
        let fixture = Fixture::from_json(
            r#"{ "form": { "id": "f", "fields": [{ "id": "mail", "type": "email", "messages": true }] } }"#,
        )
        .unwrap();
        let form = fixture.document();

        let ids: Vec<&str> = form.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["mail", "mail-valid", "mail-invalid", "f-submit"]);
        assert_eq!(form.children[0].input_type().as_deref(), Some("email"));
    }
}
