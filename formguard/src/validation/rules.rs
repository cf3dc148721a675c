//! Named validation rules.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::builtin;
use super::result::{RuleName, ValidationResult};
use crate::error::ValidationError;

/// Type alias for boxed futures used in async validation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A synchronous rule: checks a value and returns its result.
pub type SyncRule = Arc<dyn Fn(&str) -> ValidationResult + Send + Sync>;

/// An asynchronous rule. `Err` is a rejection: it is logged and the rule
/// counts as passed.
pub type AsyncRule =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<ValidationResult, String>> + Send + Sync>;

pub type RuleMap = HashMap<String, SyncRule>;

pub type RuleMapAsync = HashMap<String, AsyncRule>;

/// Build a sync rule from a predicate and the message shown when it fails.
pub fn sync_rule<F>(name: impl Into<String>, f: F, msg: impl Into<String>) -> SyncRule
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    let rule = RuleName::parse(&name.into());
    let msg = msg.into();
    Arc::new(move |v: &str| {
        if f(v) {
            ValidationResult::valid(rule.clone(), Some(v.to_string()))
        } else {
            ValidationResult::invalid(rule.clone(), msg.clone(), Some(v.to_string()))
        }
    })
}

/// Build an async rule from an async predicate and its failure message.
pub fn async_rule<F, Fut>(name: impl Into<String>, f: F, msg: impl Into<String>) -> AsyncRule
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let rule = RuleName::parse(&name.into());
    let msg = msg.into();
    Arc::new(move |v: String| -> BoxFuture<'static, Result<ValidationResult, String>> {
        let fut = f(v.clone());
        let rule = rule.clone();
        let msg = msg.clone();
        Box::pin(async move {
            if fut.await {
                Ok(ValidationResult::valid(rule, Some(v)))
            } else {
                Ok(ValidationResult::invalid(rule, msg, Some(v)))
            }
        })
    })
}

/// Sync and async rules by name.
///
/// The two maps are independent: a name may exist in both, in which case
/// the sync rule runs first and the async one after it.
pub struct RuleRegistry {
    rules: RuleMap,
    rules_async: RuleMapAsync,
}

impl RuleRegistry {
    /// Create a registry seeded with the built-in rules.
    pub fn new() -> Self {
        let mut rules = RuleMap::new();
        rules.insert(
            RuleName::Email.to_string(),
            Arc::new(builtin::email) as SyncRule,
        );
        Self {
            rules,
            rules_async: RuleMapAsync::new(),
        }
    }

    /// Create a registry where `custom` and `custom_async` override built-ins.
    pub fn with_rules(custom: RuleMap, custom_async: RuleMapAsync) -> Self {
        let mut registry = Self::new();
        registry.rules.extend(custom);
        registry.rules_async.extend(custom_async);
        registry
    }

    /// Register a sync rule, replacing any rule with the same name.
    pub fn register(&mut self, name: impl Into<String>, rule: SyncRule) {
        self.rules.insert(name.into(), rule);
    }

    /// Register an async rule, replacing any async rule with the same name.
    pub fn register_async(&mut self, name: impl Into<String>, rule: AsyncRule) {
        self.rules_async.insert(name.into(), rule);
    }

    pub fn resolve(&self, name: &str) -> Result<&SyncRule, ValidationError> {
        self.rules
            .get(name)
            .ok_or_else(|| ValidationError::invalid_rule_name(format!("rule {name} is undefined")))
    }

    pub fn resolve_async(&self, name: &str) -> Result<&AsyncRule, ValidationError> {
        self.rules_async.get(name).ok_or_else(|| {
            ValidationError::invalid_rule_name(format!("async rule {name} is undefined"))
        })
    }

    /// Check `value` against the sync rule `name`.
    pub fn check(&self, name: &str, value: &str) -> Result<ValidationResult, ValidationError> {
        let rule = self.resolve(name)?;
        Ok(rule(value))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
