//! Drive an engine through a fixture's events.

use std::time::Duration;

use formdom::{Document, Dom, Event, Key, NodeId};
use formguard::{MessageRole, Validation};
use log::{debug, info};

use crate::error::CliError;
use crate::fixture::{EventSpec, Fixture};
use crate::report::Report;

fn field_node(
    validation: &Validation<Document>,
    form_id: &str,
    field_id: &str,
) -> Result<NodeId, CliError> {
    validation
        .dom()
        .field_element(form_id, field_id)
        .ok_or_else(|| CliError::fixture(format!("no field {field_id} in form {form_id}")))
}

/// Build the engine for `fixture` and bind its rules, messages and triggers.
pub fn setup(fixture: &Fixture) -> Result<Validation<Document>, CliError> {
    let form_id = fixture.form.id.as_str();
    let mut validation = Validation::new(Document::new(fixture.document()), fixture.options());
    validation.register_form(form_id)?;

    for field in &fixture.form.fields {
        let node = field_node(&validation, form_id, &field.id)?;
        if let Some(rules) = &field.rules {
            validation.register_rules(node, rules)?;
        }
        if field.messages {
            for (role, suffix) in [(MessageRole::Valid, "valid"), (MessageRole::Invalid, "invalid")] {
                let message = field_node(&validation, form_id, &format!("{}-{suffix}", field.id))?;
                validation.register_message(role, message, &field.id)?;
            }
        }
        if !field.triggered_by.is_empty() {
            let sources: Vec<&str> = field.triggered_by.iter().map(String::as_str).collect();
            let linked = validation.register_trigger(node, &sources)?;
            debug!("#{} triggered by {linked} fields", field.id);
        }
    }
    Ok(validation)
}

/// Replay every event of `fixture` and wait for all deferred work.
pub async fn replay(fixture: &Fixture) -> Result<Report, CliError> {
    let mut validation = setup(fixture)?;
    let form_id = fixture.form.id.as_str();
    let form = validation
        .dom()
        .element_by_id(form_id)
        .ok_or_else(|| CliError::fixture(format!("form {form_id} missing")))?;

    for (index, spec) in fixture.events.iter().enumerate() {
        info!("event {index}: {spec:?}");
        let event = match spec {
            EventSpec::Input { field, value } => {
                let node = field_node(&validation, form_id, field)?;
                if let Some(element) = validation.dom_mut().get_mut(node) {
                    element.value = value.clone();
                }
                None
            }
            EventSpec::Check { field, checked } => {
                let node = field_node(&validation, form_id, field)?;
                if let Some(element) = validation.dom_mut().get_mut(node) {
                    element.checked = *checked;
                }
                None
            }
            EventSpec::KeyUp { field, key } => {
                let key = Key::from_name(key)
                    .ok_or_else(|| CliError::fixture(format!("unknown key {key:?}")))?;
                Some(Event::KeyUp {
                    target: field_node(&validation, form_id, field)?,
                    key,
                    composing: false,
                })
            }
            EventSpec::Change { field } => Some(Event::Change {
                target: field_node(&validation, form_id, field)?,
            }),
            EventSpec::Validate { field } => Some(Event::Validate {
                target: field_node(&validation, form_id, field)?,
            }),
            EventSpec::Submit => Some(Event::Submit { form }),
            EventSpec::Wait { ms } => {
                let wait = Duration::from_millis(*ms);
                // Idle before the deadline means there is nothing left to wait for.
                let _ = tokio::time::timeout(wait, validation.run_until_idle()).await;
                None
            }
        };
        if let Some(event) = event {
            validation.handle_event(event);
            validation.poll_pending();
        }
    }

    validation.run_until_idle().await;
    Ok(Report::collect(&validation, fixture))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(json: &str) -> Fixture {
        Fixture::from_json(json).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_submit_with_async_rule() {
        let fixture = fixture(
            r#"{
                "form": { "id": "signup", "fields": [
                    { "id": "user", "required": true, "rules": "free", "messages": true },
                    { "id": "mail", "type": "email" }
                ]},
                "rules": {
                    "free": { "check": "deny", "values": ["admin"], "message": "Taken", "delay_ms": 50 }
                },
                "events": [
                    { "event": "input", "field": "user", "value": "admin" },
                    { "event": "input", "field": "mail", "value": "a@b.co" },
                    { "event": "submit" }
                ]
            }"#,
        );

        let report = replay(&fixture).await.unwrap();

        assert_eq!(report.valid_events, 0);
        let user = report.field("user").unwrap();
        assert!(!user.valid);
        assert_eq!(user.message, "Taken");
        assert_eq!(user.shown_message.as_deref(), Some("Taken"));
        assert!(user.classes.contains(&"is-danger".to_string()));
        assert!(report.field("mail").unwrap().valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_keyup_debounces() {
        let fixture = fixture(
            r#"{
                "options": { "debounce_wait_ms": 200 },
                "form": { "id": "f", "fields": [{ "id": "name", "rules": "min-3" }] },
                "rules": { "min-3": { "check": "min_length", "min": 3, "message": "Too short" } },
                "events": [
                    { "event": "input", "field": "name", "value": "a" },
                    { "event": "key_up", "field": "name", "key": "a" },
                    { "event": "input", "field": "name", "value": "ab" },
                    { "event": "key_up", "field": "name", "key": "b" }
                ]
            }"#,
        );

        let report = replay(&fixture).await.unwrap();

        let name = report.field("name").unwrap();
        assert_eq!(name.value.as_deref(), Some("ab"));
        assert_eq!(name.message, "Too short");
    }

    #[tokio::test]
    async fn test_replay_fixed_field_raises_valid_event() {
        let fixture = fixture(
            r#"{
                "form": { "id": "f", "fields": [{ "id": "name", "required": true, "messages": true }] },
                "events": [
                    { "event": "change", "field": "name" },
                    { "event": "input", "field": "name", "value": "Ada" },
                    { "event": "submit" }
                ]
            }"#,
        );

        let report = replay(&fixture).await.unwrap();

        assert_eq!(report.valid_events, 1);
        assert!(report.all_valid());
    }

    #[tokio::test]
    async fn test_replay_shows_translated_message() {
        let fixture = fixture(
            r#"{
                "form": { "id": "f", "fields": [{ "id": "name", "required": true, "messages": true }] },
                "translations": { "required": "Bitte ausfüllen ({message})" },
                "events": [{ "event": "change", "field": "name" }]
            }"#,
        );

        let report = replay(&fixture).await.unwrap();

        let name = report.field("name").unwrap();
        assert!(!name.valid);
        assert_eq!(name.message, "Required");
        assert_eq!(name.shown_message.as_deref(), Some("Bitte ausfüllen (Required)"));
    }

    #[tokio::test]
    async fn test_replay_unknown_field() {
        let fixture = fixture(
            r#"{
                "form": { "id": "f", "fields": [{ "id": "name" }] },
                "events": [{ "event": "change", "field": "nope" }]
            }"#,
        );
        assert!(matches!(replay(&fixture).await, Err(CliError::Fixture(_))));
    }

    #[test]
    fn test_setup_links_triggers() {
        let fixture = fixture(
            r#"{ "form": { "id": "f", "fields": [
                { "id": "password" },
                { "id": "confirm", "triggered_by": ["password"] }
            ]}}"#,
        );
        let validation = setup(&fixture).unwrap();
        let triggers = validation.field("f", "password").unwrap().triggers.clone();
        assert_eq!(triggers.map(|t| t.len()), Some(1));
    }
}
