//! Error types

use formdom::{Dom, NodeId};

/// Category of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A form or field was referenced before registration.
    NotRegistered,
    /// A document lookup failed.
    NotFound,
    /// A custom rule name resolved to neither registry.
    InvalidRuleName,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotRegistered => "not registered",
            Self::NotFound => "not found",
            Self::InvalidRuleName => "invalid rule name",
        };
        f.write_str(name)
    }
}

/// Error returned by engine operations.
///
/// Carries the offending element when one is known, so the message can be
/// logged with element context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub target: Option<NodeId>,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            target: None,
            message: message.into(),
        }
    }

    pub fn not_registered(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotRegistered, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_rule_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRuleName, message)
    }

    /// Attach the element the error is about.
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Message prefixed with the target's id (`#email field ...`) when known.
    pub fn describe<D: Dom>(&self, dom: &D) -> String {
        match self.target.map(|t| dom.id(t)) {
            Some(id) if !id.is_empty() => format!("#{} {}", id, self.message),
            _ => self.message.clone(),
        }
    }
}
