use std::{fmt, ops::RangeInclusive};

use glyphdecal_data::DecalAtlasData;

use crate::error::AtlasError;

/// Distance field flavour requested from the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum SdfMode {
    /// Plain signed distance field
    Sdf,
    /// Signed pseudo-distance field
    Psdf,
    /// Multi-channel signed distance field
    Msdf,
}

impl SdfMode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SdfMode::Sdf => "sdf",
            SdfMode::Psdf => "psdf",
            SdfMode::Msdf => "msdf",
        }
    }
}

impl fmt::Display for SdfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single atlas build.
#[derive(Debug, Clone)]
pub(crate) struct BuildConfig {
    /// First character code, inclusive
    pub(crate) min_char: u32,
    /// Last character code, inclusive
    pub(crate) max_char: u32,
    /// Nominal square size of one glyph, in pixels
    pub(crate) decal_size: u32,
    pub(crate) sdf_mode: SdfMode,
    /// Width forced onto the space character
    pub(crate) space_width: u32,
    /// Collection canvas is `decal_size * oversample` on each side
    pub(crate) oversample: u32,
    /// Horizontal gap between packed glyphs
    pub(crate) separation: u32,
    /// Lower bound for the canvas size, if requested
    pub(crate) min_texture_size: Option<u32>,
    pub(crate) max_texture_size: u32,
}

impl BuildConfig {
    pub(crate) const MIN_PRINTABLE_CHAR: u32 = 32;
    pub(crate) const SPACE_CHAR: u32 = 0x20;
    pub(crate) const DEFAULT_DECAL_SIZE: u32 = 16;
    pub(crate) const DEFAULT_OVERSAMPLE: u32 = 3;
    pub(crate) const DEFAULT_SEPARATION: u32 = 2;

    pub(crate) fn new(min_char: u32, max_char: u32, decal_size: u32) -> Self {
        Self {
            min_char,
            max_char,
            decal_size,
            sdf_mode: SdfMode::Sdf,
            space_width: Self::default_space_width(decal_size),
            oversample: Self::DEFAULT_OVERSAMPLE,
            separation: Self::DEFAULT_SEPARATION,
            min_texture_size: None,
            max_texture_size: DecalAtlasData::MAX_TEXTURE_SIZE,
        }
    }

    pub(crate) fn default_space_width(decal_size: u32) -> u32 {
        (decal_size / 2).max(1)
    }

    pub(crate) fn chars(&self) -> RangeInclusive<u32> {
        self.min_char..=self.max_char
    }

    pub(crate) fn glyph_count(&self) -> usize {
        (self.max_char - self.min_char + 1) as usize
    }

    /// Side length of the canvas each glyph is rasterized onto.
    pub(crate) fn collection_canvas_size(&self) -> u32 {
        self.decal_size * self.oversample
    }

    pub(crate) fn validate(&self) -> Result<(), AtlasError> {
        if self.min_char < Self::MIN_PRINTABLE_CHAR {
            return Err(AtlasError::invalid_config(format!(
                "minimum charcode set to {}; must be printable and >= {}",
                self.min_char,
                Self::MIN_PRINTABLE_CHAR
            )));
        }

        if self.min_char > self.max_char {
            return Err(AtlasError::invalid_config(format!(
                "minimum charcode {} > maximum charcode {}",
                self.min_char, self.max_char
            )));
        }

        if self.decal_size == 0 {
            return Err(AtlasError::invalid_config("decal size must be positive"));
        }

        if self.oversample == 0 {
            return Err(AtlasError::invalid_config("oversample factor must be positive"));
        }

        if self.separation == 0 {
            return Err(AtlasError::invalid_config("glyph separation must be at least 1px"));
        }

        if self.space_width == 0 {
            return Err(AtlasError::invalid_config("space width must be positive"));
        }

        if self.decal_size > self.max_texture_size {
            return Err(AtlasError::invalid_config(format!(
                "decal size {} exceeds the {} texture size limit",
                self.decal_size, self.max_texture_size
            )));
        }

        if let Some(size) = self.min_texture_size {
            if !size.is_power_of_two() || size > self.max_texture_size {
                return Err(AtlasError::invalid_config(format!(
                    "texture size {size} must be a power of two no larger than {}",
                    self.max_texture_size
                )));
            }
        }

        Ok(())
    }
}
