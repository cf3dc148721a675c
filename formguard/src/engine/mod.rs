//! The validation engine.
//!
//! [`Validation`] owns every form's state and is the only thing that mutates
//! it. Host code forwards document events with [`Validation::handle_event`]
//! (or calls the registration and check methods directly); work that
//! finishes later, such as async rules and debounce timers, comes back over
//! an internal channel and is applied by [`Validation::run`] or
//! [`Validation::run_until_idle`].
//!
//! # Example
//!
//! ```
//! use formguard::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let doc = Document::new(
//!     Element::form()
//!         .id("signup")
//!         .child(Element::email().id("email").required(true)),
//! );
//! let mut validation = Validation::new(doc, ValidationOptions::default());
//! validation.register_form("signup").unwrap();
//!
//! let email = validation.dom_mut().set_value("email", "not-an-email").unwrap();
//! validation.handle_event(Event::Change { target: email });
//! validation.run_until_idle().await;
//!
//! let field = validation.field("signup", "email").unwrap();
//! assert!(field.last_result.is_invalid());
//! # }
//! ```

mod bindings;
mod debounce;
mod events;
mod pipeline;
mod reporter;
mod state;

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use formdom::{Dom, DomEvent, Event, NodeId};
use log::{debug, error};
use tokio::sync::mpsc;

use crate::command::{self, CheckId, Command, CommandReceiver, CommandSender, TimerId};
use crate::error::ValidationError;
use crate::options::{TranslationMap, ValidationOptions};
use crate::validation::{RuleRegistry, ValidationResult};

pub use bindings::MessageRole;
pub use debounce::DebounceCallback;
pub use events::PassId;
pub use pipeline::{Checked, MAX_TRIGGER_DEPTH, OnValid};
pub use reporter::Reporter;
pub use state::{CustomRule, FieldState, FormState, MessageTargets, TimerHandle};

use debounce::PendingTimer;
use events::SubmitPass;
use pipeline::{PendingCheck, QueuedCheck};

pub(crate) fn form_not_registered(form_id: &str) -> ValidationError {
    ValidationError::not_registered(format!("form {form_id} is not registered"))
}

pub(crate) fn field_not_registered(field_id: &str) -> ValidationError {
    ValidationError::not_registered(format!("field {field_id} is not registered"))
}

pub(crate) fn field_not_found(form_id: &str, field_id: &str) -> ValidationError {
    ValidationError::not_found(format!("selector \"#{form_id} #{field_id}\" not found"))
}

/// Form validation state machine bound to a document.
pub struct Validation<D: Dom> {
    dom: D,
    rules: RuleRegistry,
    translations: TranslationMap,
    reporter: Reporter,
    debounce_wait: Duration,
    debug: bool,
    forms: HashMap<String, FormState>,

    commands: CommandSender,
    receiver: CommandReceiver,
    timers: HashMap<TimerId, PendingTimer<D>>,
    checks: HashMap<CheckId, PendingCheck>,
    passes: HashMap<PassId, SubmitPass>,
    queue: VecDeque<QueuedCheck>,
    next_id: u64,
}

impl<D: Dom> Validation<D> {
    pub fn new(dom: D, options: ValidationOptions) -> Self {
        let ValidationOptions {
            invalid_class,
            hidden_class,
            debounce_wait,
            debug,
            custom_rules,
            custom_rules_async,
            translations,
        } = options;
        let (commands, receiver) = command::channel();

        Self {
            dom,
            rules: RuleRegistry::with_rules(custom_rules, custom_rules_async),
            translations,
            reporter: Reporter::new(invalid_class, hidden_class),
            debounce_wait,
            debug,
            forms: HashMap::new(),
            commands,
            receiver,
            timers: HashMap::new(),
            checks: HashMap::new(),
            passes: HashMap::new(),
            queue: VecDeque::new(),
            next_id: 0,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleRegistry {
        &mut self.rules
    }

    pub fn debounce_wait(&self) -> Duration {
        self.debounce_wait
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn form(&self, form_id: &str) -> Option<&FormState> {
        self.forms.get(form_id)
    }

    pub fn field(&self, form_id: &str, field_id: &str) -> Option<&FieldState> {
        self.forms.get(form_id)?.field(field_id)
    }

    /// True when no async check is in flight and no debounce timer is pending.
    pub fn is_idle(&self) -> bool {
        self.checks.is_empty() && self.timers.is_empty()
    }

    /// Apply deferred work until nothing is in flight.
    pub async fn run_until_idle(&mut self) {
        while !self.is_idle() {
            match self.receiver.recv().await {
                Some(command) => self.apply(command),
                None => break,
            }
        }
    }

    /// Apply deferred work that has already arrived, without waiting.
    pub fn poll_pending(&mut self) {
        while let Some(command) = self.receiver.try_recv() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Settled { check, outcomes } => match self.checks.remove(&check) {
                Some(pending) => {
                    self.settle(pending, outcomes);
                }
                None => debug!("settlement for unknown check {check:?}"),
            },
            Command::TimerFired(id) => self.fire_timer(id),
        }
        self.drain_queue();
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Resolve the enclosing form, its id and the field id of `target`.
    pub(crate) fn identify(
        &self,
        target: NodeId,
    ) -> Result<(NodeId, String, String), ValidationError> {
        let form = self.dom.closest_form(target).ok_or_else(|| {
            ValidationError::not_found("element not inside a form").with_target(target)
        })?;
        let form_id = self.dom.id(form);
        let field_id = self.dom.id(target);
        if field_id.trim().is_empty() {
            return Err(
                ValidationError::not_found(format!("missing id in form {form_id} for field"))
                    .with_target(target),
            );
        }
        Ok((form, form_id, field_id))
    }

    /// Record `result` on the field and reflect it into the document.
    pub fn report_element(
        &mut self,
        form_id: &str,
        field_id: &str,
        result: ValidationResult,
    ) -> Result<(), ValidationError> {
        let field = self
            .forms
            .get_mut(form_id)
            .ok_or_else(|| form_not_registered(form_id))?
            .field_mut(field_id)
            .ok_or_else(|| field_not_registered(field_id))?;
        let targets = field.messages;
        field.last_result = result.clone();

        let element = self
            .dom
            .field_element(form_id, field_id)
            .ok_or_else(|| field_not_found(form_id, field_id))?;

        let message = match self.translations.get(&result.rule) {
            Some(translate) => translate(&result),
            None => result.message,
        };
        self.reporter
            .report(&mut self.dom, element, result.valid, &message, targets);
        self.dom.dispatch(element, DomEvent::AfterValidateField);
        Ok(())
    }

    pub(crate) fn report_logged(&mut self, form_id: &str, field_id: &str, result: ValidationResult) {
        if let Err(err) = self.report_element(form_id, field_id, result) {
            self.log_error(&err);
        }
    }

    /// Log an error with its element context.
    pub fn log_error(&self, err: &ValidationError) {
        error!("{}", err.describe(&self.dom));
    }
}

impl<D: Dom + 'static> Validation<D> {
    /// Process host events and deferred work until `events` closes, then
    /// finish whatever is still in flight.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        enum Next {
            Command(Option<Command>),
            Event(Option<Event>),
        }

        loop {
            let next = tokio::select! {
                command = self.receiver.recv() => Next::Command(command),
                event = events.recv() => Next::Event(event),
            };
            match next {
                Next::Command(Some(command)) => self.apply(command),
                Next::Event(Some(event)) => self.handle_event(event),
                Next::Command(None) | Next::Event(None) => break,
            }
        }

        self.run_until_idle().await;
    }
}
