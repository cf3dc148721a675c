//! Routing of document events into checks.

use formdom::{Dom, DomEvent, Event, Key, NodeId, Tag};
use log::info;

use super::pipeline::OnValid;
use super::{Validation, field_not_found, form_not_registered};
use crate::error::ValidationError;

/// Keys that never change a value.
const IGNORED_KEYS: [Key; 7] = [
    Key::Alt,
    Key::Control,
    Key::Enter,
    Key::Escape,
    Key::Meta,
    Key::Shift,
    Key::Tab,
];

/// Identifies one submit pass over a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(u64);

/// Valid callbacks still expected before the form is valid.
pub(crate) struct SubmitPass {
    pub(crate) form: NodeId,
    remaining: usize,
}

impl<D: Dom + 'static> Validation<D> {
    /// Handle one event forwarded by the host document.
    ///
    /// Errors are logged, never returned: a misconfigured field must not
    /// stop the host's event loop. Key events schedule a debounce timer, so
    /// this must be called inside a tokio runtime.
    pub fn handle_event(&mut self, event: Event) {
        let result = match event {
            Event::Submit { form } => self.submit(form),
            Event::Change { target } => {
                if self.debug {
                    info!("change #{}", self.dom.id(target));
                }
                self.check_in_chain(target, OnValid::Ignore, vec![target])
                    .map(|_| ())
            }
            Event::Validate { target } => {
                if self.debug {
                    info!("validate #{}", self.dom.id(target));
                }
                self.check_in_chain(target, OnValid::Ignore, vec![target])
                    .map(|_| ())
            }
            Event::KeyUp {
                target,
                key,
                composing,
            } => self.key_up(target, key, composing),
        };

        if let Err(err) = result {
            self.log_error(&err);
        }
        self.drain_queue();
    }

    fn key_up(&mut self, target: NodeId, key: Key, composing: bool) -> Result<(), ValidationError> {
        if composing || key == Key::Process || IGNORED_KEYS.contains(&key) {
            return Ok(());
        }
        if self.dom.tag(target) == Some(Tag::Button) {
            return Ok(());
        }

        let (_, form_id, field_id) = self.identify(target)?;
        let debug = self.debug;
        let wait = self.debounce_wait;
        let callback = Box::new(move |engine: &mut Validation<D>| {
            if debug {
                info!("keyup #{}", engine.dom.id(target));
            }
            if let Err(err) = engine.check_element(target, OnValid::Ignore) {
                engine.log_error(&err);
            }
        });
        self.debounce(&form_id, &field_id, callback, wait)
    }

    fn submit(&mut self, form: NodeId) -> Result<(), ValidationError> {
        let form_id = self.dom.id(form);
        if self.debug {
            info!("submit #{form_id}");
        }
        let field_ids = self
            .forms
            .get(&form_id)
            .ok_or_else(|| form_not_registered(&form_id).with_target(form))?
            .field_ids()
            .to_vec();

        // A new submit replaces any pass still waiting on this form.
        self.passes.retain(|_, pass| pass.form != form);

        if field_ids.is_empty() {
            self.form_valid(form);
            return Ok(());
        }

        let pass = PassId(self.next_id());
        self.passes.insert(
            pass,
            SubmitPass {
                form,
                remaining: field_ids.len(),
            },
        );

        for field_id in field_ids {
            let Some(target) = self.dom.field_element(&form_id, &field_id) else {
                self.passes.remove(&pass);
                return Err(field_not_found(&form_id, &field_id).with_target(form));
            };
            if let Err(err) = self.check_in_chain(target, OnValid::Submit(pass), vec![target]) {
                self.log_error(&err);
            }
        }
        Ok(())
    }
}

impl<D: Dom> Validation<D> {
    pub(crate) fn count_valid(&mut self, pass: PassId) {
        let Some(state) = self.passes.get_mut(&pass) else {
            return;
        };
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            let form = state.form;
            self.passes.remove(&pass);
            self.form_valid(form);
        }
    }

    fn form_valid(&mut self, form: NodeId) {
        if self.debug {
            info!("valid #{}", self.dom.id(form));
        }
        self.dom.dispatch(form, DomEvent::Valid);
    }
}
