mod node;
mod tag;

pub use node::Element;
pub use tag::Tag;

