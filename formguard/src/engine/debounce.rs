use std::time::Duration;

use formdom::Dom;
use log::trace;

use super::state::TimerHandle;
use super::{Validation, field_not_registered, form_not_registered};
use crate::command::{Command, TimerId};
use crate::error::ValidationError;

/// Work run once a debounce timer elapses.
pub type DebounceCallback<D> = Box<dyn FnOnce(&mut Validation<D>)>;

pub(crate) struct PendingTimer<D: Dom> {
    form_id: String,
    /// Empty for the form-level slot.
    field_id: String,
    callback: DebounceCallback<D>,
}

impl<D: Dom> Validation<D> {
    /// Run `callback` after `wait` of quiet.
    ///
    /// Each field (or the form itself, for a blank `field_id`) has one
    /// slot: scheduling again cancels the previous timer, so only the most
    /// recent callback runs. Must be called inside a tokio runtime.
    pub fn debounce(
        &mut self,
        form_id: &str,
        field_id: &str,
        callback: DebounceCallback<D>,
        wait: Duration,
    ) -> Result<(), ValidationError> {
        let id = TimerId(self.next_id());
        let field_id = field_id.trim();

        let form = self
            .forms
            .get_mut(form_id)
            .ok_or_else(|| form_not_registered(form_id))?;
        let slot = if field_id.is_empty() {
            &mut form.debounce_timer
        } else {
            &mut form
                .field_mut(field_id)
                .ok_or_else(|| field_not_registered(field_id))?
                .debounce_timer
        };

        if let Some(previous) = slot.take() {
            trace!("debounce: cancelling timer {:?}", previous.id);
            self.timers.remove(&previous.id);
        }

        let commands = self.commands.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            commands.send(Command::TimerFired(id));
        });
        *slot = Some(TimerHandle::new(id, task.abort_handle()));

        self.timers.insert(
            id,
            PendingTimer {
                form_id: form_id.to_string(),
                field_id: field_id.to_string(),
                callback,
            },
        );
        Ok(())
    }

    pub(crate) fn fire_timer(&mut self, id: TimerId) {
        let Some(timer) = self.timers.remove(&id) else {
            trace!("debounce: timer {id:?} was cancelled");
            return;
        };

        if let Some(form) = self.forms.get_mut(&timer.form_id) {
            let slot = if timer.field_id.is_empty() {
                Some(&mut form.debounce_timer)
            } else {
                form.field_mut(&timer.field_id)
                    .map(|field| &mut field.debounce_timer)
            };
            if let Some(slot) = slot {
                if slot.as_ref().is_some_and(|handle| handle.id == id) {
                    *slot = None;
                }
            }
        }

        (timer.callback)(self);
    }
}
