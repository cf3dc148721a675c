use crate::NodeId;

/// Document events a binding layer forwards to the validation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Form submitted
    Submit { form: NodeId },
    /// Control value committed
    Change { target: NodeId },
    /// Key released while a control had focus
    KeyUp {
        target: NodeId,
        key: Key,
        /// True while an IME composition is in progress
        composing: bool,
    },
    /// Programmatic request to validate a control
    Validate { target: NodeId },
}

impl Event {
    /// The element the event was raised on.
    pub fn target(&self) -> NodeId {
        match self {
            Self::Submit { form } => *form,
            Self::Change { target } | Self::KeyUp { target, .. } | Self::Validate { target } => {
                *target
            }
        }
    }
}

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Alt,
    Control,
    Meta,
    Shift,
    /// Composition placeholder key (keyCode 229)
    Process,
}

impl Key {
    /// Parse a `KeyboardEvent.key` style name. Single characters map to `Char`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Tab" => Key::Tab,
            "Escape" | "Esc" => Key::Escape,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "Home" => Key::Home,
            "End" => Key::End,
            "Alt" => Key::Alt,
            "Control" => Key::Control,
            "Meta" => Key::Meta,
            "Shift" => Key::Shift,
            "Process" => Key::Process,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}
