use log::info;

use crate::{
    bounds::{detect_bounds, DetectedBounds, Rect},
    error::AtlasError,
    rasterizer::{RasterRequest, Rasterizer},
};

/// Uniform font-to-decal scale, computed once per build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScaleFactor(f64);

impl ScaleFactor {
    pub(crate) fn get(&self) -> f64 {
        self.0
    }
}

/// Capital "I" fills the cap height with almost no side bearing.
pub(crate) const REFERENCE_CHARACTER: char = 'I';
pub(crate) const REFERENCE_CANVAS_SIZE: u32 = 256;
/// Side of the nominal box the reference glyph is expected to fill.
const REFERENCE_BOX_SIZE: u32 = REFERENCE_CANVAS_SIZE / 2;
/// Puts the glyph origin on the bottom-left corner of the nominal box
/// centred in the canvas, the same placement the collector uses for every
/// glyph. The margin around the box absorbs fonts whose cap height
/// overshoots it.
const REFERENCE_TRANSLATE: (f64, f64) = (
    ((REFERENCE_CANVAS_SIZE - REFERENCE_BOX_SIZE) / 2) as f64,
    ((REFERENCE_CANVAS_SIZE - REFERENCE_BOX_SIZE) / 2) as f64,
);

/// Renders the reference glyph unscaled and derives the factor that makes
/// its ink height equal to `decal_size` pixels.
pub(crate) fn calibrate(
    rasterizer: &mut dyn Rasterizer,
    decal_size: u32,
) -> Result<ScaleFactor, AtlasError> {
    let request = RasterRequest {
        character: REFERENCE_CHARACTER as u32,
        size: REFERENCE_CANVAS_SIZE,
        translate: REFERENCE_TRANSLATE,
        scale: 1.0,
    };

    let image = rasterizer.rasterize(&request).map_err(|e| match e {
        AtlasError::Rasterization(detail) => AtlasError::Calibration(format!(
            "reference glyph '{REFERENCE_CHARACTER}' could not be rendered: {detail}"
        )),
        other => other,
    })?;

    let canvas = Rect::new(0, 0, image.width(), image.height());
    let height = match detect_bounds(&image, canvas, Rect::default()) {
        DetectedBounds::Measured(bounds) => bounds.height,
        DetectedBounds::Fallback(_) => 0,
    };

    if height == 0 {
        return Err(AtlasError::reference_glyph_empty(REFERENCE_CHARACTER));
    }

    let scale = decal_size as f64 / height as f64;
    info!(
        "reference glyph '{REFERENCE_CHARACTER}' is {height}px tall unscaled; scale factor {scale:.4}"
    );

    Ok(ScaleFactor(scale))
}
