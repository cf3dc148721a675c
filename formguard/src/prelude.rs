//! Prelude module for convenient imports.
//!
//! ```
//! use formguard::prelude::*;
//! ```

pub use crate::engine::{Checked, MessageRole, OnValid, Validation};
pub use crate::error::{ErrorKind, ValidationError};
pub use crate::options::ValidationOptions;
pub use crate::validation::{RuleName, RuleRegistry, ValidationResult, async_rule, sync_rule};

// Document types the engine is driven with
pub use formdom::{Document, Dom, DomEvent, Element, Event, Key, NodeId};
