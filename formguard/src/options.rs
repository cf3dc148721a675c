//! Engine configuration

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::validation::{AsyncRule, RuleMap, RuleMapAsync, RuleName, SyncRule, ValidationResult};

/// Turns a result into display text, e.g. for another language.
pub type Translation = Arc<dyn Fn(&ValidationResult) -> String + Send + Sync>;

pub type TranslationMap = HashMap<RuleName, Translation>;

/// Configuration for a [`Validation`](crate::Validation) engine.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use formguard::ValidationOptions;
///
/// let options = ValidationOptions::default()
///     .with_invalid_class("has-error")
///     .with_debounce_wait(Duration::from_millis(300));
/// ```
#[derive(Clone)]
pub struct ValidationOptions {
    /// Class added to an invalid field.
    ///
    /// Default: `is-danger`
    pub invalid_class: String,

    /// Class that hides a message element.
    ///
    /// Default: `is-hidden`
    pub hidden_class: String,

    /// Quiet period before a keystroke triggers validation.
    ///
    /// Default: 900 ms
    pub debounce_wait: Duration,

    /// Log every handled event at info level.
    pub debug: bool,

    /// Sync rules; these override built-ins with the same name.
    pub custom_rules: RuleMap,

    pub custom_rules_async: RuleMapAsync,

    /// Message translations by rule name.
    pub translations: TranslationMap,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            invalid_class: "is-danger".to_string(),
            hidden_class: "is-hidden".to_string(),
            debounce_wait: Duration::from_millis(900),
            debug: false,
            custom_rules: RuleMap::new(),
            custom_rules_async: RuleMapAsync::new(),
            translations: TranslationMap::new(),
        }
    }
}

impl std::fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("invalid_class", &self.invalid_class)
            .field("hidden_class", &self.hidden_class)
            .field("debounce_wait", &self.debounce_wait)
            .field("debug", &self.debug)
            .field("custom_rules", &self.custom_rules.keys().collect::<Vec<_>>())
            .field(
                "custom_rules_async",
                &self.custom_rules_async.keys().collect::<Vec<_>>(),
            )
            .field("translations", &self.translations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invalid_class(mut self, class: impl Into<String>) -> Self {
        self.invalid_class = class.into();
        self
    }

    pub fn with_hidden_class(mut self, class: impl Into<String>) -> Self {
        self.hidden_class = class.into();
        self
    }

    pub fn with_debounce_wait(mut self, wait: Duration) -> Self {
        self.debounce_wait = wait;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_rule(mut self, name: impl Into<String>, rule: SyncRule) -> Self {
        self.custom_rules.insert(name.into(), rule);
        self
    }

    pub fn with_async_rule(mut self, name: impl Into<String>, rule: AsyncRule) -> Self {
        self.custom_rules_async.insert(name.into(), rule);
        self
    }

    /// Replace the message of every result produced by `rule`.
    pub fn with_translation<F>(mut self, rule: impl Into<RuleName>, f: F) -> Self
    where
        F: Fn(&ValidationResult) -> String + Send + Sync + 'static,
    {
        self.translations.insert(rule.into(), Arc::new(f));
        self
    }
}
