//! Shared fixtures for engine tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Once;

use formguard::prelude::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

// =============================================================================
// Log capture
// =============================================================================

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Records log lines per thread, so parallel tests don't see each other's output.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Install the capturing logger and clear this thread's records.
pub fn capture_logs() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Lines logged on this thread at `level` that contain `needle`.
pub fn logged(level: Level, needle: &str) -> usize {
    RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|(l, msg)| *l == level && msg.contains(needle))
            .count()
    })
}

// =============================================================================
// Documents
// =============================================================================

pub fn signup_form() -> Element {
    Element::form()
        .id("signup")
        .child(Element::text_input().id("username").required(true))
        .child(Element::message("").id("username-ok").class("is-hidden"))
        .child(Element::message("").id("username-err").class("is-hidden"))
        .child(Element::email().id("email"))
        .child(
            Element::text_input()
                .id("zip")
                .pattern("[0-9]{5}"),
        )
        .child(Element::input("password").id("password").required(true))
        .child(Element::input("password").id("confirm"))
        .child(Element::checkbox().id("terms").required(true))
        .child(Element::textarea().id("bio"))
        .child(Element::hidden().id("token").required(true))
        .child(Element::button().id("go"))
}

pub fn login_form() -> Element {
    Element::form()
        .id("login")
        .child(Element::text_input().id("user").required(true))
        .child(Element::email().id("mail"))
        .child(Element::button().id("submit"))
}

/// An engine over a single registered form.
pub fn engine_for(form: Element, options: ValidationOptions) -> Validation<Document> {
    let form_id = form.id.clone();
    let mut validation = Validation::new(Document::new(form), options);
    validation
        .register_form(&form_id)
        .expect("fixture form registers");
    validation
}

pub fn signup() -> Validation<Document> {
    engine_for(signup_form(), ValidationOptions::default())
}

pub fn node(validation: &Validation<Document>, id: &str) -> NodeId {
    validation
        .dom()
        .find(id)
        .unwrap_or_else(|| panic!("no element #{id}"))
}

/// Set a control's value and return its handle.
pub fn set(validation: &mut Validation<Document>, id: &str, value: &str) -> NodeId {
    validation
        .dom_mut()
        .set_value(id, value)
        .unwrap_or_else(|| panic!("no element #{id}"))
}

pub fn after_validate_count(validation: &Validation<Document>, id: &str) -> usize {
    let target = node(validation, id);
    validation
        .dom()
        .dispatch_count(target, DomEvent::AfterValidateField)
}
