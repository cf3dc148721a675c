use formdom::{Dom, NodeId};

use super::state::MessageTargets;

/// Reflects a validation outcome into the document.
///
/// Holds only class names; every call is a pure function of its arguments,
/// so reporting the same outcome twice leaves the same visible state.
#[derive(Debug, Clone)]
pub struct Reporter {
    invalid_class: String,
    hidden_class: String,
}

impl Reporter {
    pub fn new(invalid_class: impl Into<String>, hidden_class: impl Into<String>) -> Self {
        Self {
            invalid_class: invalid_class.into(),
            hidden_class: hidden_class.into(),
        }
    }

    pub fn invalid_class(&self) -> &str {
        &self.invalid_class
    }

    pub fn hidden_class(&self) -> &str {
        &self.hidden_class
    }

    /// Style `element` as valid or invalid and show the matching message.
    pub fn report<D: Dom>(
        &self,
        dom: &mut D,
        element: NodeId,
        valid: bool,
        message: &str,
        targets: MessageTargets,
    ) {
        let (shown, hidden) = if valid {
            dom.remove_class(element, &self.invalid_class);
            (targets.valid, targets.invalid)
        } else {
            dom.add_class(element, &self.invalid_class);
            (targets.invalid, targets.valid)
        };

        if let Some(msg) = hidden {
            dom.add_class(msg, &self.hidden_class);
        }
        if let Some(msg) = shown {
            dom.set_text(msg, message);
            dom.remove_class(msg, &self.hidden_class);
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new("is-danger", "is-hidden")
    }
}
