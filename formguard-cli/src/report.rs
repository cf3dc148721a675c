//! Final state of a replayed form.

use std::fmt;

use formdom::{Document, Dom, DomEvent};
use formguard::Validation;
use formguard::validation::RuleName;
use serde::Serialize;

use crate::fixture::Fixture;

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub id: String,
    /// Value seen by the last full check.
    pub value: Option<String>,
    pub valid: bool,
    pub rule: RuleName,
    pub message: String,
    pub classes: Vec<String>,
    /// Text of the message element currently shown, if any.
    pub shown_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub form: String,
    /// Times the form raised its valid event.
    pub valid_events: usize,
    pub fields: Vec<FieldReport>,
}

impl Report {
    pub fn collect(validation: &Validation<Document>, fixture: &Fixture) -> Self {
        let form_id = fixture.form.id.as_str();
        let doc = validation.dom();
        let hidden_class = validation.reporter().hidden_class();

        let valid_events = doc
            .find(form_id)
            .map(|form| doc.dispatch_count(form, DomEvent::Valid))
            .unwrap_or(0);

        let fields = validation
            .form(form_id)
            .map(|form| form.field_ids().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| {
                let state = validation.field(form_id, &id)?;
                let classes = doc
                    .field_element(form_id, &id)
                    .and_then(|node| doc.get(node))
                    .map(|element| element.classes.clone())
                    .unwrap_or_default();
                let shown_message = [state.messages.valid, state.messages.invalid]
                    .into_iter()
                    .flatten()
                    .find(|&node| !doc.has_class(node, hidden_class))
                    .map(|node| doc.text(node).to_string());

                Some(FieldReport {
                    value: state.compare_value.clone(),
                    valid: state.last_result.is_valid(),
                    rule: state.last_result.rule.clone(),
                    message: state.last_result.message.clone(),
                    classes,
                    shown_message,
                    id,
                })
            })
            .collect();

        Self {
            form: form_id.to_string(),
            valid_events,
            fields,
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn all_valid(&self) -> bool {
        self.fields.iter().all(|f| f.valid)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.all_valid() { "valid" } else { "invalid" };
        writeln!(
            f,
            "form {}: {status} (valid event raised {} times)",
            self.form, self.valid_events
        )?;
        let width = self.fields.iter().map(|field| field.id.len()).max().unwrap_or(0);
        for field in &self.fields {
            let mark = if field.valid { "ok  " } else { "FAIL" };
            write!(f, "  {mark} {:width$}", field.id)?;
            if !field.valid {
                write!(f, "  [{}] {}", field.rule, field.message)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
