//! Client-side form validation.
//!
//! A [`Validation`] engine tracks the fields of registered forms, runs
//! markup-derived checks (`required`, `pattern`, `type=email`) followed by
//! named custom rules, and reflects each outcome into the document through
//! the [`formdom::Dom`] capability trait.

mod command;
pub mod engine;
pub mod error;
pub mod options;
pub mod validation;

pub use engine::{
    Checked, DebounceCallback, FieldState, FormState, MessageRole, OnValid, Reporter, Validation,
};
pub use error::{ErrorKind, ValidationError};
pub use options::ValidationOptions;

pub use formdom;

pub mod prelude;
