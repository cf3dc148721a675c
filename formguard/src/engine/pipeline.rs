//! Checking one element: built-in checks, custom sync rules, async rule
//! fan-out, settlement and trigger propagation.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use formdom::{Dom, DomEvent, NodeId, Tag};
use futures::FutureExt;
use futures::future::join_all;
use log::{debug, error, info, warn};

use super::events::PassId;
use super::{Validation, field_not_registered, form_not_registered};
use crate::command::{CheckId, Command, Settled};
use crate::error::ValidationError;
use crate::validation::{BoxFuture, RuleName, ValidationResult, builtin};

/// Longest trigger chain followed from one check.
pub const MAX_TRIGGER_DEPTH: usize = 16;

/// What to do when a check ends valid.
pub enum OnValid {
    Ignore,
    /// Call with the checked element.
    Notify(Box<dyn FnOnce(NodeId)>),
    /// Count towards a submit pass.
    Submit(PassId),
}

impl std::fmt::Debug for OnValid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => f.write_str("Ignore"),
            Self::Notify(_) => f.write_str("Notify(..)"),
            Self::Submit(pass) => f.debug_tuple("Submit").field(pass).finish(),
        }
    }
}

/// How a call to [`Validation::check_element`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checked {
    /// The element is not rendered; treated as valid without checking.
    Skipped,
    /// Value unchanged since the last check; nothing was re-run.
    Unchanged { valid: bool },
    /// Result computed and reported.
    Reported { valid: bool },
    /// Async rules are running; the result is reported once they settle.
    Pending,
    /// A newer check of the same field replaced this one.
    Superseded,
}

pub(crate) struct CheckContext {
    target: NodeId,
    form_id: String,
    field_id: String,
    seq: u64,
    on_valid: OnValid,
    /// Elements already checked in this propagation pass, in order.
    chain: Vec<NodeId>,
}

/// A check waiting for its async rules.
pub(crate) struct PendingCheck {
    ctx: CheckContext,
    /// Result to report when every async rule passes or rejects.
    fallback: ValidationResult,
}

/// A trigger target waiting to be checked.
pub(crate) struct QueuedCheck {
    target: NodeId,
    chain: Vec<NodeId>,
}

enum ControlKind {
    Input(Option<String>),
    Select,
    Textarea,
}

/// Snapshot of a form control taken at the start of a check.
struct Control {
    kind: ControlKind,
    /// Value as rules see it; `"true"`/`"false"` for checkboxes.
    value: String,
    raw: String,
    checked: bool,
    required: bool,
    pattern: Option<String>,
}

impl Control {
    fn read<D: Dom>(dom: &D, node: NodeId, tag: &Tag) -> Option<Self> {
        let kind = match tag {
            Tag::Input => ControlKind::Input(dom.input_type(node)),
            Tag::Select => ControlKind::Select,
            Tag::Textarea => ControlKind::Textarea,
            _ => return None,
        };
        let checked = dom.checked(node);
        let raw = dom.value(node);
        let value = if matches!(&kind, ControlKind::Input(Some(t)) if t == "checkbox") {
            checked.to_string()
        } else {
            raw.clone()
        };
        Some(Self {
            kind,
            value,
            raw,
            checked,
            required: dom.attribute(node, "required").is_some(),
            pattern: dom.attribute(node, "pattern"),
        })
    }

    fn is_checkbox(&self) -> bool {
        matches!(&self.kind, ControlKind::Input(Some(t)) if t == "checkbox")
    }

    fn check_required(&self) -> ValidationResult {
        if self.is_checkbox() {
            builtin::required_checked(self.checked)
        } else {
            builtin::required(&self.raw)
        }
    }

    fn check_pattern(&self) -> ValidationResult {
        match &self.pattern {
            Some(pattern) => builtin::pattern(pattern, &self.raw),
            None => ValidationResult::not_applicable(),
        }
    }
}

fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl<D: Dom> Validation<D> {
    /// Check `target`, report the outcome and propagate to its triggers.
    ///
    /// `on_valid` runs once the element ends valid, which may be after this
    /// returns when async rules are declared. Async rules need a tokio
    /// runtime; without one they are logged as rejected.
    pub fn check_element(
        &mut self,
        target: NodeId,
        on_valid: OnValid,
    ) -> Result<Checked, ValidationError> {
        let checked = self.check_in_chain(target, on_valid, vec![target]);
        self.drain_queue();
        checked
    }

    pub(crate) fn check_in_chain(
        &mut self,
        target: NodeId,
        on_valid: OnValid,
        chain: Vec<NodeId>,
    ) -> Result<Checked, ValidationError> {
        let hidden_input = self.dom.is_hidden_input(target);
        if !hidden_input && !self.dom.is_visible(target) {
            self.notify_valid(target, on_valid);
            return Ok(Checked::Skipped);
        }

        let tag = self
            .dom
            .tag(target)
            .ok_or_else(|| ValidationError::not_found("element not found").with_target(target))?;
        let (_, form_id, field_id) = self.identify(target)?;
        let control = Control::read(&self.dom, target, &tag).ok_or_else(|| {
            ValidationError::not_found(format!("unknown tag {tag}")).with_target(target)
        })?;

        let seq = self.next_id();
        let field = self
            .forms
            .get_mut(&form_id)
            .ok_or_else(|| form_not_registered(&form_id).with_target(target))?
            .field_mut(&field_id)
            .ok_or_else(|| field_not_registered(&field_id).with_target(target))?;

        // Hidden inputs are set by scripts, so they are always re-checked.
        if !hidden_input {
            if field.compare_value.as_deref() == Some(control.value.as_str()) {
                let valid = field.last_result.is_valid();
                if valid {
                    self.notify_valid(target, on_valid);
                }
                return Ok(Checked::Unchanged { valid });
            }
            field.compare_value = Some(control.value.clone());
        }
        field.check_seq = seq;

        let ctx = CheckContext {
            target,
            form_id,
            field_id,
            seq,
            on_valid,
            chain,
        };

        let result = self.check_builtins(&control);
        if result.is_invalid() {
            self.report_logged(&ctx.form_id, &ctx.field_id, result);
            return Ok(Checked::Reported { valid: false });
        }

        self.check_custom_rules(ctx, control.value, result)
    }

    fn check_builtins(&self, control: &Control) -> ValidationResult {
        if control.required {
            let result = control.check_required();
            if result.is_invalid() {
                return result;
            }
        }
        if !matches!(control.kind, ControlKind::Textarea) {
            let result = control.check_pattern();
            if result.is_invalid() {
                return result;
            }
        }

        match &control.kind {
            ControlKind::Input(Some(t)) if t == "email" => {
                match self.rules.check(RuleName::Email.as_str(), &control.raw) {
                    Ok(result) => result,
                    Err(err) => {
                        self.log_error(&err);
                        ValidationResult::not_applicable()
                    }
                }
            }
            _ => ValidationResult::not_applicable(),
        }
    }

    fn check_custom_rules(
        &mut self,
        ctx: CheckContext,
        value: String,
        builtin_result: ValidationResult,
    ) -> Result<Checked, ValidationError> {
        let field = self
            .forms
            .get_mut(&ctx.form_id)
            .and_then(|form| form.field_mut(&ctx.field_id))
            .ok_or_else(|| field_not_registered(&ctx.field_id).with_target(ctx.target))?;

        let Some(rules) = field.custom_rules.as_mut() else {
            return Ok(self.complete(ctx, builtin_result));
        };

        for rule in rules.iter_mut() {
            rule.resolved = false;
        }

        let mut result = builtin_result;
        let mut failed = None;
        for rule in rules.iter_mut() {
            let Ok(check) = self.rules.resolve(&rule.name) else {
                continue;
            };
            rule.resolved = true;
            result = check(&value);
            if result.is_invalid() {
                failed = Some(result.clone());
                break;
            }
        }
        if let Some(failed) = failed {
            self.report_logged(&ctx.form_id, &ctx.field_id, failed);
            return Ok(Checked::Reported { valid: false });
        }

        let mut pending: Vec<BoxFuture<'static, Result<ValidationResult, String>>> = Vec::new();
        for rule in rules.iter_mut() {
            if let Ok(check) = self.rules.resolve_async(&rule.name) {
                rule.resolved = true;
                pending.push(check(value.clone()));
            }
        }

        let pending_check = PendingCheck {
            ctx,
            fallback: result,
        };
        if pending.is_empty() {
            return Ok(self.settle(pending_check, Vec::new()));
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            let outcomes = pending
                .iter()
                .map(|_| Settled::Rejected("no tokio runtime to run it on".to_string()))
                .collect();
            return Ok(self.settle(pending_check, outcomes));
        };

        let check = CheckId(self.next_id());
        let commands = self.commands.clone();
        runtime.spawn(async move {
            let outcomes = join_all(pending.into_iter().map(|rule| async move {
                match AssertUnwindSafe(rule).catch_unwind().await {
                    Ok(Ok(result)) => Settled::Fulfilled(result),
                    Ok(Err(reason)) => Settled::Rejected(reason),
                    Err(panic) => Settled::Rejected(extract_panic_message(&panic)),
                }
            }))
            .await;
            commands.send(Command::Settled { check, outcomes });
        });
        self.checks.insert(check, pending_check);
        Ok(Checked::Pending)
    }

    /// Combine async outcomes with the sync result and finish the check.
    pub(crate) fn settle(&mut self, pending: PendingCheck, outcomes: Vec<Settled>) -> Checked {
        let PendingCheck { ctx, fallback } = pending;

        let Some(field) = self
            .forms
            .get(&ctx.form_id)
            .and_then(|form| form.field(&ctx.field_id))
        else {
            self.log_error(&field_not_registered(&ctx.field_id).with_target(ctx.target));
            return Checked::Superseded;
        };
        if field.check_seq != ctx.seq {
            debug!("dropping superseded result for #{}", ctx.field_id);
            return Checked::Superseded;
        }
        let unresolved = field.unresolved_rules();

        let mut result = fallback;
        let mut failed = None;
        for outcome in outcomes {
            match outcome {
                Settled::Fulfilled(r) if r.is_invalid() => {
                    failed.get_or_insert(r);
                }
                Settled::Fulfilled(r) => {
                    if failed.is_none() {
                        result = r;
                    }
                }
                Settled::Rejected(reason) => {
                    error!("async rule on #{} rejected: {reason}", ctx.field_id)
                }
            }
        }

        for name in unresolved {
            self.log_error(
                &ValidationError::invalid_rule_name(format!(
                    "rule {name} on field {} is undefined",
                    ctx.field_id
                ))
                .with_target(ctx.target),
            );
        }

        self.complete(ctx, failed.unwrap_or(result))
    }

    fn complete(&mut self, ctx: CheckContext, result: ValidationResult) -> Checked {
        let valid = result.is_valid();
        self.report_logged(&ctx.form_id, &ctx.field_id, result);
        if valid {
            self.propagate(&ctx);
            self.notify_valid(ctx.target, ctx.on_valid);
        }
        Checked::Reported { valid }
    }

    /// Queue a re-check of every element that depends on this field.
    fn propagate(&mut self, ctx: &CheckContext) {
        let triggers = self
            .forms
            .get(&ctx.form_id)
            .and_then(|form| form.field(&ctx.field_id))
            .and_then(|field| field.triggers.clone())
            .unwrap_or_default();

        for target in triggers {
            if ctx.chain.contains(&target) {
                debug!(
                    "#{} already checked in this pass, not re-triggering",
                    self.dom.id(target)
                );
                continue;
            }
            if ctx.chain.len() >= MAX_TRIGGER_DEPTH {
                warn!(
                    "trigger chain from #{} exceeds {MAX_TRIGGER_DEPTH} fields, stopping",
                    ctx.field_id
                );
                break;
            }
            self.dom.dispatch(target, DomEvent::Validate);
            let mut chain = ctx.chain.clone();
            chain.push(target);
            self.queue.push_back(QueuedCheck { target, chain });
        }
    }

    /// Check queued trigger targets until none remain.
    pub(crate) fn drain_queue(&mut self) {
        while let Some(QueuedCheck { target, chain }) = self.queue.pop_front() {
            if self.debug {
                info!("validate #{}", self.dom.id(target));
            }
            if let Err(err) = self.check_in_chain(target, OnValid::Ignore, chain) {
                self.log_error(&err);
            }
        }
    }

    pub(crate) fn notify_valid(&mut self, target: NodeId, on_valid: OnValid) {
        match on_valid {
            OnValid::Ignore => {}
            OnValid::Notify(callback) => callback(target),
            OnValid::Submit(pass) => self.count_valid(pass),
        }
    }
}
