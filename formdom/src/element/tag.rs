/// Element tag names the validation layer distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Form,
    Input,
    Select,
    Textarea,
    Button,
    Other(String),
}

impl Tag {
    /// Parse a tag name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "form" => Self::Form,
            "input" => Self::Input,
            "select" => Self::Select,
            "textarea" => Self::Textarea,
            "button" => Self::Button,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Form => "form",
            Self::Input => "input",
            Self::Select => "select",
            Self::Textarea => "textarea",
            Self::Button => "button",
            Self::Other(name) => name,
        }
    }

    /// Inputs, selects and textareas: the elements a form validates.
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Input | Self::Select | Self::Textarea)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
