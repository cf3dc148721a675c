//! Capability interface between the validation engine and a document.
//!
//! The engine never walks markup itself. Everything it needs from the host
//! document (lookups, introspection, class toggling, event dispatch) goes
//! through [`Dom`], so the same engine can drive the in-memory [`Document`]
//! or a real browser binding.
//!
//! [`Document`]: crate::Document

use crate::element::Tag;

/// Opaque handle to an element owned by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Events the validation layer raises on document elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    /// Raised on a form once every registered field reported valid in one submit pass.
    Valid,
    /// Request to (re-)validate a field.
    Validate,
    /// Raised on a field after its result has been reported.
    AfterValidateField,
}

impl DomEvent {
    /// Event type name as a browser binding would dispatch it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Validate => "validation:validate",
            Self::AfterValidateField => "validation:afterValidateField",
        }
    }
}

/// What the validation engine may ask of a document.
pub trait Dom {
    /// Look up an element by id anywhere in the document.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Look up the element with `field_id` among the descendants of the form `form_id`.
    fn field_element(&self, form_id: &str, field_id: &str) -> Option<NodeId>;

    /// Nearest enclosing form of `node`, including `node` itself.
    fn closest_form(&self, node: NodeId) -> Option<NodeId>;

    /// Input, select and textarea descendants of `form` with a non-blank id.
    fn form_controls(&self, form: NodeId) -> Vec<NodeId>;

    /// The element id, empty when it has none.
    fn id(&self, node: NodeId) -> String;

    fn tag(&self, node: NodeId) -> Option<Tag>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn value(&self, node: NodeId) -> String;

    fn checked(&self, node: NodeId) -> bool;

    /// True when the element has a rendered box.
    fn is_visible(&self, node: NodeId) -> bool;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    fn set_text(&mut self, node: NodeId, text: &str);

    fn dispatch(&mut self, node: NodeId, event: DomEvent);

    /// The lower-cased `type` attribute of an input.
    fn input_type(&self, node: NodeId) -> Option<String> {
        self.attribute(node, "type").map(|t| t.to_lowercase())
    }

    fn is_hidden_input(&self, node: NodeId) -> bool {
        self.tag(node) == Some(Tag::Input) && self.input_type(node).as_deref() == Some("hidden")
    }
}
