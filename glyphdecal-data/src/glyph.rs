use serde::{Deserialize, Serialize};

/// The final position and size of one glyph inside the atlas canvas.
///
/// Coordinates are in pixels, with the origin at the top-left corner of the
/// texture. All placements of an atlas share the same `height` (the
/// normalized line height), so every glyph sits on a common baseline; only
/// `width` varies per glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphPlacement {
    /// The character code this placement was rendered from
    #[serde(rename = "char")]
    pub character: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphPlacement {
    pub fn new(character: u32, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { character, x, y, width, height }
    }

    /// Exclusive right edge; saturates at `u32::MAX` for placements read
    /// from untrusted documents.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge; saturates like [`right`](Self::right).
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// The character as a `char`, if the code is a valid scalar value.
    pub fn symbol(&self) -> Option<char> {
        char::from_u32(self.character)
    }

    /// Returns true if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &GlyphPlacement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true if the placement lies within `[0, size) x [0, size)`.
    pub fn fits_within(&self, size: u32) -> bool {
        let fits = |start: u32, extent: u32| start.checked_add(extent).is_some_and(|end| end <= size);
        fits(self.x, self.width) && fits(self.y, self.height)
    }
}
