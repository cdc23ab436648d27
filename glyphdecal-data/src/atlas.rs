use std::fmt::Debug;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::GlyphPlacement;

/// Glyph table and atlas-level properties of a packed SDF texture.
///
/// `code` and `texture` are opaque placeholders; they are written verbatim
/// and substituted later by whatever packages the atlas as a game resource.
#[derive(PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecalAtlasData {
    /// Identifier of the font resource
    pub code: CompactString,
    /// Reference to the texture resource holding the canvas image
    pub texture: CompactString,
    /// Side length of the square canvas; always a power of two
    pub texture_size: u32,
    /// Normalized height shared by every placement
    pub line_height: u32,
    /// Horizontal gap kept between neighbouring glyphs in a row
    pub separation: u32,
    /// Placements, in ascending character order
    pub glyphs: Vec<GlyphPlacement>,
}

impl Debug for DecalAtlasData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecalAtlasData")
            .field("code", &self.code)
            .field("texture", &self.texture)
            .field("texture_size", &self.texture_size)
            .field("line_height", &self.line_height)
            .field("separation", &self.separation)
            .field("glyphs_count", &self.glyphs.len())
            .finish()
    }
}

/// A broken invariant in a glyph table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    #[error("texture size {0} is not a power of two no larger than {max}", max = DecalAtlasData::MAX_TEXTURE_SIZE)]
    TextureSize(u32),

    #[error("glyph {0} is out of order or duplicated")]
    Ordering(u32),

    #[error("glyph {character} at ({x}, {y}) size {width}x{height} exceeds the {size}x{size} canvas")]
    OutOfBounds { character: u32, x: u32, y: u32, width: u32, height: u32, size: u32 },

    #[error("glyphs {0} and {1} overlap")]
    Overlap(u32, u32),
}

impl DecalAtlasData {
    /// Largest canvas the packer will produce.
    pub const MAX_TEXTURE_SIZE: u32 = 4096;

    pub const CODE_PLACEHOLDER: &'static str = "{code}";
    pub const TEXTURE_PLACEHOLDER: &'static str = "{texture}";

    /// Creates an empty glyph table for a canvas of the given size, with
    /// placeholder `code` and `texture` values.
    pub fn new(texture_size: u32, line_height: u32, separation: u32) -> Self {
        Self {
            code: CompactString::const_new(Self::CODE_PLACEHOLDER),
            texture: CompactString::const_new(Self::TEXTURE_PLACEHOLDER),
            texture_size,
            line_height,
            separation,
            glyphs: Vec::new(),
        }
    }

    /// Looks up the placement of a character.
    pub fn glyph(&self, character: u32) -> Option<&GlyphPlacement> {
        self.glyphs
            .binary_search_by_key(&character, |g| g.character)
            .ok()
            .map(|idx| &self.glyphs[idx])
    }

    /// Checks the invariants every packed atlas must satisfy: power-of-two
    /// canvas, ascending unique characters, placements inside the canvas
    /// and no two placements sharing a pixel.
    pub fn validate(&self) -> Result<(), LayoutViolation> {
        let size = self.texture_size;
        if !size.is_power_of_two() || size > Self::MAX_TEXTURE_SIZE {
            return Err(LayoutViolation::TextureSize(size));
        }

        for pair in self.glyphs.windows(2) {
            if pair[0].character >= pair[1].character {
                return Err(LayoutViolation::Ordering(pair[1].character));
            }
        }

        for g in &self.glyphs {
            if !g.fits_within(size) {
                return Err(LayoutViolation::OutOfBounds {
                    character: g.character,
                    x: g.x,
                    y: g.y,
                    width: g.width,
                    height: g.height,
                    size,
                });
            }
        }

        // rows are filled top to bottom, so sorting by y lets the inner
        // scan stop at the first glyph that starts below the current one
        let mut by_row: Vec<&GlyphPlacement> = self.glyphs.iter().collect();
        by_row.sort_by_key(|g| (g.y, g.x));
        for (i, a) in by_row.iter().enumerate() {
            for b in by_row[i + 1..].iter().take_while(|b| b.y < a.bottom()) {
                if a.overlaps(b) {
                    return Err(LayoutViolation::Overlap(a.character, b.character));
                }
            }
        }

        Ok(())
    }
}
