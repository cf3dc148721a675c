//! In-memory document: an arena of elements with parent links.

use log::trace;

use crate::dom::{Dom, DomEvent, NodeId};
use crate::element::{Element, Tag};

struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An event raised on an element through [`Dom::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub target: NodeId,
    pub event: DomEvent,
}

/// Element tree built from an [`Element`] and addressed by [`NodeId`].
///
/// Child lists of the stored elements are moved into the arena, so
/// `get(node).children` is always empty; use [`Document::children`].
pub struct Document {
    nodes: Vec<Node>,
    dispatched: Vec<Dispatched>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            dispatched: Vec::new(),
        };
        doc.insert(root, None);
        doc
    }

    fn insert(&mut self, mut element: Element, parent: Option<NodeId>) -> NodeId {
        let node = NodeId(self.nodes.len());
        let children = std::mem::take(&mut element.children);
        self.nodes.push(Node {
            element,
            parent,
            children: Vec::new(),
        });
        for child in children {
            let child = self.insert(child, Some(node));
            self.nodes[node.0].children.push(child);
        }
        node
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0).map(|n| &n.element)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0).map(|n| &mut n.element)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// First element with `id` in document order.
    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.find_within(self.root(), id)
    }

    fn find_within(&self, node: NodeId, id: &str) -> Option<NodeId> {
        if self.get(node)?.id == id {
            return Some(node);
        }
        self.children(node)
            .iter()
            .find_map(|&child| self.find_within(child, id))
    }

    fn descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            out.push(child);
            self.descendants(child, out);
        }
    }

    /// Set the value of the element with `id`, returning its handle.
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Option<NodeId> {
        let node = self.find(id)?;
        self.nodes[node.0].element.value = value.into();
        Some(node)
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) -> Option<NodeId> {
        let node = self.find(id)?;
        self.nodes[node.0].element.checked = checked;
        Some(node)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|e| e.has_class(class))
    }

    /// Text of the element, empty for unknown nodes.
    pub fn text(&self, node: NodeId) -> &str {
        self.get(node).map(|e| e.text.as_str()).unwrap_or("")
    }

    /// Events raised so far, oldest first.
    pub fn dispatched(&self) -> &[Dispatched] {
        &self.dispatched
    }

    pub fn take_dispatched(&mut self) -> Vec<Dispatched> {
        std::mem::take(&mut self.dispatched)
    }

    /// Count of `event` raised on `target`.
    pub fn dispatch_count(&self, target: NodeId, event: DomEvent) -> usize {
        self.dispatched
            .iter()
            .filter(|d| d.target == target && d.event == event)
            .count()
    }
}

impl Dom for Document {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(id)
    }

    fn field_element(&self, form_id: &str, field_id: &str) -> Option<NodeId> {
        let form = self.find(form_id)?;
        let mut nodes = Vec::new();
        self.descendants(form, &mut nodes);
        nodes
            .into_iter()
            .find(|&n| self.get(n).is_some_and(|e| e.id == field_id))
    }

    fn closest_form(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.get(n)?.tag == Tag::Form {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    fn form_controls(&self, form: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.descendants(form, &mut nodes);
        nodes.retain(|&n| {
            self.get(n)
                .is_some_and(|e| e.tag.is_control() && !e.id.trim().is_empty())
        });
        nodes
    }

    fn id(&self, node: NodeId) -> String {
        self.get(node).map(|e| e.id.clone()).unwrap_or_default()
    }

    fn tag(&self, node: NodeId) -> Option<Tag> {
        self.get(node).map(|e| e.tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node)?.get_attr(name).cloned()
    }

    fn value(&self, node: NodeId) -> String {
        self.get(node).map(|e| e.value.clone()).unwrap_or_default()
    }

    fn checked(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|e| e.checked)
    }

    fn is_visible(&self, node: NodeId) -> bool {
        // A collapsed ancestor collapses the whole subtree.
        let mut current = Some(node);
        while let Some(n) = current {
            match self.get(n) {
                Some(e) if e.rect.is_rendered() => current = self.parent(n),
                _ => return false,
            }
        }
        true
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.get_mut(node) {
            e.attributes.insert(name.to_lowercase(), value.to_string());
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.get_mut(node) {
            if !e.has_class(class) {
                e.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.get_mut(node) {
            e.classes.retain(|c| c != class);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(e) = self.get_mut(node) {
            e.text = text.to_string();
        }
    }

    fn dispatch(&mut self, node: NodeId, event: DomEvent) {
        trace!("dispatch {} on #{}", event.as_str(), self.id(node));
        self.dispatched.push(Dispatched {
            target: node,
            event,
        });
    }
}
