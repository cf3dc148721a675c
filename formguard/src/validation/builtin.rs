//! Checks derived from standard markup: `required`, `pattern` and input types.

use std::sync::LazyLock;

use log::error;
use regex::{Regex, RegexBuilder};

use super::result::{RuleName, ValidationResult};

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_PATTERN: &str = "Must match pattern";
pub const MSG_EMAIL: &str = "Email is invalid";

// Top-level domain has two to six letters. Word characters are ASCII only.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^[A-Za-z0-9_!#$%&'*+/=?`{|}~^-]+(?:\.[A-Za-z0-9_!#$%&'*+/=?`{|}~^-]+)*@(?:[A-Z0-9-]+\.)+[A-Z]{2,6}$",
    )
    .case_insensitive(true)
    .build()
    .expect("email regex is valid")
});

/// Text-like `required`: the trimmed value must not be empty.
pub fn required(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        ValidationResult::invalid(RuleName::Required, MSG_REQUIRED, None)
    } else {
        ValidationResult::valid(RuleName::Required, None)
    }
}

/// Checkbox `required`: the box must be checked.
pub fn required_checked(checked: bool) -> ValidationResult {
    if checked {
        ValidationResult::valid(RuleName::Required, None)
    } else {
        ValidationResult::invalid(RuleName::Required, MSG_REQUIRED, None)
    }
}

/// Match `value` against a markup `pattern`.
///
/// The pattern must match the whole value, ignoring case. A blank pattern is
/// not applicable. A pattern that fails to compile is logged and ignored,
/// the same way browsers ignore an invalid `pattern` attribute.
pub fn pattern(pattern: &str, value: &str) -> ValidationResult {
    if pattern.trim().is_empty() {
        return ValidationResult::not_applicable();
    }

    let re = match RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .unicode(true)
        .build()
    {
        Ok(re) => re,
        Err(err) => {
            error!("invalid pattern {pattern:?}: {err}");
            return ValidationResult::not_applicable();
        }
    };

    if re.is_match(&value.to_lowercase()) {
        ValidationResult::valid(RuleName::Pattern, None)
    } else {
        ValidationResult::invalid(RuleName::Pattern, MSG_PATTERN, None)
    }
}

/// Conservative email check. Blank is valid; `required` covers presence.
pub fn email(value: &str) -> ValidationResult {
    let value_owned = Some(value.to_string());
    if value.trim().is_empty() {
        return ValidationResult::valid(RuleName::Email, value_owned);
    }
    if EMAIL.is_match(value) {
        ValidationResult::valid(RuleName::Email, value_owned)
    } else {
        ValidationResult::invalid(RuleName::Email, MSG_EMAIL, value_owned)
    }
}
