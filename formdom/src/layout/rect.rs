/// Rendered box of an element.
///
/// Only the size matters for validation: an element whose box has neither
/// width nor height is treated as not rendered (`display: none`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// The zero-sized box of an element that takes no space.
    pub const fn collapsed() -> Self {
        Self::from_size(0, 0)
    }

    /// True when the box has any extent at all (offset width or height).
    pub const fn is_rendered(&self) -> bool {
        self.width > 0 || self.height > 0
    }
}
