use std::collections::HashMap;

use super::Tag;
use crate::layout::Rect;

/// Box given to rendered controls unless a test or host sets one.
const DEFAULT_RECT: Rect = Rect::from_size(20, 1);

#[derive(Debug, Clone)]
pub struct Element {
    // Identity
    pub id: String,
    pub tag: Tag,

    // Markup attributes (type, required, pattern, ...), names lower-case
    pub attributes: HashMap<String, String>,

    // Control state
    pub value: String,
    pub checked: bool,

    // Rendering
    pub rect: Rect,
    pub classes: Vec<String>,
    pub text: String,

    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            id: String::new(),
            tag,
            attributes: HashMap::new(),
            value: String::new(),
            checked: false,
            rect: DEFAULT_RECT,
            classes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn form() -> Self {
        Self::new(Tag::Form)
    }

    /// Create an `<input>` with the given `type` attribute.
    pub fn input(input_type: impl Into<String>) -> Self {
        Self::new(Tag::Input).attr("type", input_type)
    }

    pub fn text_input() -> Self {
        Self::input("text")
    }

    pub fn email() -> Self {
        Self::input("email")
    }

    pub fn checkbox() -> Self {
        Self::input("checkbox")
    }

    /// Hidden inputs are never rendered, so their box is collapsed.
    pub fn hidden() -> Self {
        Self::input("hidden").rect(Rect::collapsed())
    }

    pub fn select() -> Self {
        Self::new(Tag::Select)
    }

    pub fn textarea() -> Self {
        Self::new(Tag::Textarea)
    }

    pub fn button() -> Self {
        Self::new(Tag::Button)
    }

    pub fn div() -> Self {
        Self::new(Tag::Other("div".to_string()))
    }

    /// A paragraph used to display a validation message.
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(Tag::Other("p".to_string())).text(text)
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    // Attributes
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&String> {
        self.attributes.get(&name.to_lowercase())
    }

    /// Set or clear the boolean `required` attribute.
    pub fn required(mut self, required: bool) -> Self {
        if required {
            self.attributes.insert("required".to_string(), String::new());
        } else {
            self.attributes.remove("required");
        }
        self
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.attr("pattern", pattern)
    }

    /// The lower-cased `type` attribute, if any.
    pub fn input_type(&self) -> Option<String> {
        self.get_attr("type").map(|t| t.to_lowercase())
    }

    // Control state
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    // Rendering
    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Take the element out of the layout, as `display: none` would.
    pub fn collapsed(self) -> Self {
        self.rect(Rect::collapsed())
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    // Children
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(new_children);
        self
    }
}
