use serde::Serialize;

/// Name of the rule that produced a [`ValidationResult`].
///
/// Built-in names are reserved; anything else is a caller-registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum RuleName {
    Required,
    Pattern,
    Email,
    /// The element had nothing to check.
    NotApplicable,
    Custom(String),
}

impl RuleName {
    pub fn parse(name: &str) -> Self {
        match name {
            "required" => Self::Required,
            "pattern" => Self::Pattern,
            "email" => Self::Email,
            "n/a" => Self::NotApplicable,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Pattern => "pattern",
            Self::Email => "email",
            Self::NotApplicable => "n/a",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for RuleName {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<RuleName> for String {
    fn from(name: RuleName) -> Self {
        name.as_str().to_string()
    }
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one value against one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Rule that produced this result.
    pub rule: RuleName,
    /// Whether the value passed.
    pub valid: bool,
    /// Message to display (before translation).
    pub message: String,
    /// The checked value, when the rule looked at it.
    pub value: Option<String>,
}

impl ValidationResult {
    pub fn valid(rule: impl Into<RuleName>, value: Option<String>) -> Self {
        Self {
            rule: rule.into(),
            valid: true,
            message: String::new(),
            value,
        }
    }

    pub fn invalid(
        rule: impl Into<RuleName>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            valid: false,
            message: message.into(),
            value,
        }
    }

    /// The trivially valid result of an element with nothing to check.
    pub fn not_applicable() -> Self {
        Self::valid(RuleName::NotApplicable, None)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_invalid(&self) -> bool {
        !self.valid
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::not_applicable()
    }
}
