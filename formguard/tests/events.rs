mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::*;
use formguard::engine::MAX_TRIGGER_DEPTH;
use formguard::prelude::*;
use log::Level;
use tokio::sync::mpsc;

fn quick() -> ValidationOptions {
    ValidationOptions::default().with_debounce_wait(Duration::from_millis(300))
}

fn key_up(target: NodeId, key: Key) -> Event {
    Event::KeyUp {
        target,
        key,
        composing: false,
    }
}

// =============================================================================
// Debounce
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_debounce_runs_only_the_last_callback() {
    let mut v = signup();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for n in 1..=3 {
        let calls = calls.clone();
        v.debounce(
            "signup",
            "username",
            Box::new(move |_: &mut Validation<Document>| calls.borrow_mut().push(n)),
            Duration::from_millis(200),
        )
        .unwrap();
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    assert!(v.form("signup").unwrap().field("username").unwrap().has_pending_timer());

    v.run_until_idle().await;

    assert_eq!(*calls.borrow(), vec![3]);
    assert!(!v.form("signup").unwrap().field("username").unwrap().has_pending_timer());
}

#[tokio::test(start_paused = true)]
async fn test_debounce_form_slot() {
    let mut v = signup();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();

    v.debounce(
        "signup",
        "",
        Box::new(move |_: &mut Validation<Document>| *counter.borrow_mut() += 1),
        Duration::from_millis(10),
    )
    .unwrap();
    assert!(v.form("signup").unwrap().has_pending_timer());

    v.run_until_idle().await;

    assert_eq!(*calls.borrow(), 1);
    assert!(!v.form("signup").unwrap().has_pending_timer());
}

#[tokio::test]
async fn test_debounce_unknown_form() {
    let mut v = signup();
    let err = v
        .debounce(
            "other",
            "username",
            Box::new(|_: &mut Validation<Document>| {}),
            Duration::ZERO,
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotRegistered);
    assert!(v.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_register_form_cancels_timers() {
    let mut v = engine_for(signup_form(), quick());
    let username = set(&mut v, "username", "bob");
    v.handle_event(key_up(username, Key::Char('b')));
    assert!(!v.is_idle());

    v.register_form("signup").unwrap();

    assert!(v.is_idle());
    v.run_until_idle().await;
    assert_eq!(after_validate_count(&v, "username"), 0);
}

// =============================================================================
// Key handling
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_checks_once_after_quiet_period() {
    let mut v = engine_for(signup_form(), quick());

    for value in ["b", "bo", "bob"] {
        let username = set(&mut v, "username", value);
        let key = Key::Char(value.chars().last().unwrap());
        v.handle_event(key_up(username, key));
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    assert_eq!(after_validate_count(&v, "username"), 0);

    v.run_until_idle().await;

    assert_eq!(after_validate_count(&v, "username"), 1);
    assert_eq!(
        v.field("signup", "username").unwrap().compare_value.as_deref(),
        Some("bob")
    );
}

#[tokio::test]
async fn test_ignored_keys_schedule_nothing() {
    let mut v = engine_for(signup_form(), quick());
    let username = node(&v, "username");

    for key in [
        Key::Alt,
        Key::Control,
        Key::Enter,
        Key::Escape,
        Key::Meta,
        Key::Shift,
        Key::Tab,
        Key::Process,
    ] {
        v.handle_event(key_up(username, key));
    }
    v.handle_event(Event::KeyUp {
        target: username,
        key: Key::Char('a'),
        composing: true,
    });

    assert!(v.is_idle());
}

#[tokio::test]
async fn test_keyup_on_button_is_ignored() {
    capture_logs();
    let mut v = engine_for(signup_form(), quick());
    let go = node(&v, "go");

    v.handle_event(key_up(go, Key::Char('x')));

    assert!(v.is_idle());
    assert_eq!(logged(Level::Error, ""), 0);
}

#[tokio::test]
async fn test_change_errors_are_logged() {
    capture_logs();
    let mut v = signup();
    let go = node(&v, "go");

    v.handle_event(Event::Change { target: go });

    assert_eq!(logged(Level::Error, "#go unknown tag button"), 1);
}

// =============================================================================
// Submit
// =============================================================================

#[tokio::test]
async fn test_submit_valid_form_fires_valid_once() {
    let mut v = engine_for(login_form(), ValidationOptions::default());
    set(&mut v, "user", "bob");
    let login = node(&v, "login");

    v.handle_event(Event::Submit { form: login });

    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 1);
    assert_eq!(after_validate_count(&v, "user"), 1);
    assert_eq!(after_validate_count(&v, "mail"), 1);
}

#[tokio::test]
async fn test_submit_invalid_form_does_not_fire_valid() {
    let mut v = engine_for(login_form(), ValidationOptions::default());
    set(&mut v, "mail", "not-an-address");
    let login = node(&v, "login");

    v.handle_event(Event::Submit { form: login });

    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 0);
    assert!(v.field("login", "user").unwrap().last_result.is_invalid());
    assert!(v.field("login", "mail").unwrap().last_result.is_invalid());
}

#[tokio::test]
async fn test_resubmit_reuses_unchanged_results() {
    let mut v = engine_for(login_form(), ValidationOptions::default());
    set(&mut v, "user", "bob");
    let login = node(&v, "login");

    v.handle_event(Event::Submit { form: login });
    v.handle_event(Event::Submit { form: login });

    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 2);
    assert_eq!(after_validate_count(&v, "user"), 1);
}

#[tokio::test]
async fn test_submit_form_without_fields_is_valid() {
    let form = Element::form()
        .id("empty")
        .child(Element::button().id("go"));
    let mut v = engine_for(form, ValidationOptions::default());
    let empty = node(&v, "empty");

    v.handle_event(Event::Submit { form: empty });

    assert_eq!(v.dom().dispatch_count(empty, DomEvent::Valid), 1);
}

#[tokio::test(start_paused = true)]
async fn test_submit_waits_for_async_rules() {
    let options = ValidationOptions::default().with_async_rule(
        "available",
        async_rule(
            "available",
            |v: String| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                v != "admin"
            },
            "Name is taken",
        ),
    );
    let mut v = engine_for(login_form(), options);
    let user = set(&mut v, "user", "bob");
    v.register_rules(user, "available").unwrap();
    let login = node(&v, "login");

    v.handle_event(Event::Submit { form: login });
    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 0);

    v.run_until_idle().await;
    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 1);
}

#[tokio::test]
async fn test_submit_unregistered_form_is_logged() {
    capture_logs();
    let doc = Document::new(login_form());
    let mut v = Validation::new(doc, ValidationOptions::default());
    let login = node(&v, "login");

    v.handle_event(Event::Submit { form: login });

    assert_eq!(logged(Level::Error, "form login is not registered"), 1);
    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 0);
}

// =============================================================================
// Triggers
// =============================================================================

#[tokio::test]
async fn test_valid_source_revalidates_target() {
    let mut v = signup();
    let confirm = node(&v, "confirm");
    v.register_trigger(confirm, &["password"]).unwrap();

    let password = set(&mut v, "password", "hunter22");
    v.handle_event(Event::Change { target: password });

    assert_eq!(v.dom().dispatch_count(confirm, DomEvent::Validate), 1);
    assert_eq!(after_validate_count(&v, "confirm"), 1);
    assert_eq!(
        v.field("signup", "confirm").unwrap().compare_value.as_deref(),
        Some("")
    );
}

#[tokio::test]
async fn test_invalid_source_does_not_trigger() {
    let mut v = signup();
    let confirm = node(&v, "confirm");
    v.register_trigger(confirm, &["password"]).unwrap();

    let password = node(&v, "password");
    v.handle_event(Event::Change { target: password });

    assert_eq!(v.dom().dispatch_count(confirm, DomEvent::Validate), 0);
    assert_eq!(after_validate_count(&v, "confirm"), 0);
}

#[tokio::test]
async fn test_trigger_cycle_terminates() {
    let mut v = signup();
    let password = node(&v, "password");
    let confirm = node(&v, "confirm");
    v.register_trigger(confirm, &["password"]).unwrap();
    v.register_trigger(password, &["confirm"]).unwrap();

    set(&mut v, "password", "hunter22");
    set(&mut v, "confirm", "hunter22");
    v.check_element(password, OnValid::Ignore).unwrap();

    assert_eq!(v.dom().dispatch_count(confirm, DomEvent::Validate), 1);
    assert_eq!(v.dom().dispatch_count(password, DomEvent::Validate), 0);
    assert_eq!(after_validate_count(&v, "password"), 1);
    assert_eq!(after_validate_count(&v, "confirm"), 1);
}

#[tokio::test]
async fn test_trigger_chain_depth_is_bounded() {
    capture_logs();
    let form = Element::form()
        .id("chain")
        .children((0..20).map(|i| Element::text_input().id(format!("f{i}"))));
    let mut v = engine_for(form, ValidationOptions::default());
    for i in 0..19 {
        let next = node(&v, &format!("f{}", i + 1));
        let source = format!("f{i}");
        v.register_trigger(next, &[source.as_str()]).unwrap();
    }

    let first = node(&v, "f0");
    v.check_element(first, OnValid::Ignore).unwrap();

    let checked = |v: &Validation<Document>, id: &str| {
        v.field("chain", id).unwrap().compare_value.is_some()
    };
    let last_in_chain = format!("f{}", MAX_TRIGGER_DEPTH - 1);
    let first_beyond = format!("f{MAX_TRIGGER_DEPTH}");
    assert!(checked(&v, &last_in_chain));
    assert!(!checked(&v, &first_beyond));
    assert_eq!(logged(Level::Warn, "trigger chain from #f15"), 1);
}

#[tokio::test]
async fn test_validate_event_checks_target() {
    let mut v = signup();
    let username = set(&mut v, "username", "bob");

    v.handle_event(Event::Validate { target: username });

    assert_eq!(after_validate_count(&v, "username"), 1);
}

// =============================================================================
// Event loop
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_processes_events_until_closed() {
    let mut v = engine_for(login_form(), quick());
    let user = set(&mut v, "user", "bob");
    let login = node(&v, "login");

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(key_up(user, Key::Char('b'))).unwrap();
    tx.send(Event::Submit { form: login }).unwrap();
    drop(tx);

    v.run(rx).await;

    assert!(v.is_idle());
    assert_eq!(v.dom().dispatch_count(login, DomEvent::Valid), 1);
    // Submit checked the field first; the debounced check found it unchanged
    assert_eq!(after_validate_count(&v, "user"), 1);
}
