pub mod document;
pub mod dom;
pub mod element;
pub mod event;
pub mod layout;

pub use document::{Dispatched, Document};
pub use dom::{Dom, DomEvent, NodeId};
pub use element::{Element, Tag};
pub use event::{Event, Key};
pub use layout::Rect;
