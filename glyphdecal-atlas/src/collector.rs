use image::RgbaImage;
use log::{debug, warn};

use crate::{
    bounds::{detect_bounds, DetectedBounds, Rect},
    calibrate::ScaleFactor,
    config::BuildConfig,
    error::{describe_char, AtlasError},
    rasterizer::{RasterRequest, Rasterizer},
};

/// Where a glyph's ink bounds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundsSource {
    /// Detected from the rendered pixels
    Measured,
    /// No ink was found; the nominal decal box was assumed
    Fallback,
    /// Width forced by configuration (the space character)
    Override,
}

/// One rendered glyph and the box its ink occupies.
#[derive(Debug, Clone)]
pub(crate) struct GlyphRecord {
    pub(crate) character: u32,
    /// The oversized canvas the glyph was rendered onto
    pub(crate) source: RgbaImage,
    /// Ink bounds, in `source` coordinates
    pub(crate) ink_bounds: Rect,
    pub(crate) bounds_source: BoundsSource,
}

impl GlyphRecord {
    fn new(character: u32, source: RgbaImage, detected: DetectedBounds) -> Self {
        let bounds_source = match detected {
            DetectedBounds::Measured(_) => BoundsSource::Measured,
            DetectedBounds::Fallback(_) => BoundsSource::Fallback,
        };

        Self { character, source, ink_bounds: detected.rect(), bounds_source }
    }

    /// Replaces the record with one whose ink width is forced to `width`,
    /// keeping its origin and height.
    pub(crate) fn with_width(self, width: u32) -> Self {
        let Rect { x, y, height, .. } = self.ink_bounds;
        Self {
            ink_bounds: Rect::new(x, y, width, height),
            bounds_source: BoundsSource::Override,
            ..self
        }
    }
}

/// All glyphs of a build plus the vertical extent shared by their ink.
#[derive(Debug)]
pub(crate) struct CollectedGlyphs {
    /// Records in ascending character order
    pub(crate) glyphs: Vec<GlyphRecord>,
    /// Topmost ink row across every glyph
    pub(crate) min_y: u32,
    /// Bottom edge (exclusive) of the lowest ink row across every glyph
    pub(crate) max_y: u32,
}

impl CollectedGlyphs {
    pub(crate) fn line_height(&self) -> u32 {
        self.max_y - self.min_y
    }

    pub(crate) fn fallback_count(&self) -> usize {
        self.glyphs.iter().filter(|g| g.bounds_source == BoundsSource::Fallback).count()
    }
}

/// Rasterizes and measures every character of the configured range, in
/// ascending order. A glyph the rasterizer fails to produce aborts the
/// whole collection.
pub(crate) fn collect(
    rasterizer: &mut dyn Rasterizer,
    config: &BuildConfig,
    scale: ScaleFactor,
) -> Result<CollectedGlyphs, AtlasError> {
    let canvas_size = config.collection_canvas_size();
    let margin = (canvas_size - config.decal_size) / 2;
    let canvas = Rect::new(0, 0, canvas_size, canvas_size);
    let nominal_box = Rect::new(margin, margin, config.decal_size, config.decal_size);
    let translate = margin as f64 / scale.get();

    let mut glyphs = Vec::with_capacity(config.glyph_count());
    let mut min_y = u32::MAX;
    let mut max_y = 0;

    for character in config.chars() {
        let request = RasterRequest {
            character,
            size: canvas_size,
            translate: (translate, translate),
            scale: scale.get(),
        };
        let image = rasterizer.rasterize(&request)?;

        let detected = detect_bounds(&image, canvas, nominal_box);
        if detected.is_fallback() && character != BuildConfig::SPACE_CHAR {
            warn!(
                "no ink found for glyph {} ({character}); assuming the nominal {}x{} box",
                describe_char(character),
                config.decal_size,
                config.decal_size
            );
        }

        let bounds = detected.rect();
        debug!("glyph {} ({character}): {bounds:?}", describe_char(character));
        min_y = min_y.min(bounds.y);
        max_y = max_y.max(bounds.bottom());

        glyphs.push(GlyphRecord::new(character, image, detected));
    }

    let glyphs = glyphs
        .into_iter()
        .map(|g| match g.character {
            BuildConfig::SPACE_CHAR => g.with_width(config.space_width),
            _ => g,
        })
        .collect();

    Ok(CollectedGlyphs { glyphs, min_y, max_y })
}
