//! Validation rules and results.
//!
//! Rules are plain functions from a field value to a [`ValidationResult`],
//! registered by name in a [`RuleRegistry`]. Markup-derived checks live in
//! [`builtin`].
//!
//! # Example
//!
//! ```
//! use formguard::validation::{RuleRegistry, sync_rule};
//!
//! let mut rules = RuleRegistry::new();
//! rules.register(
//!     "min-3",
//!     sync_rule("min-3", |v| v.chars().count() >= 3, "At least 3 characters"),
//! );
//!
//! assert!(rules.check("min-3", "ab").unwrap().is_invalid());
//! assert!(rules.check("email", "a@b.co").unwrap().is_valid());
//! ```

pub mod builtin;
mod result;
mod rules;

pub use result::{RuleName, ValidationResult};
pub use rules::{
    AsyncRule, BoxFuture, RuleMap, RuleMapAsync, RuleRegistry, SyncRule, async_rule, sync_rule,
};
