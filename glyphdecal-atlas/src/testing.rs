use std::{collections::HashSet, path::PathBuf};

use image::{Rgba, RgbaImage};

use crate::{
    bounds::BACKGROUND,
    error::AtlasError,
    rasterizer::{RasterRequest, Rasterizer},
};

/// Deterministic stand-in for a real rasterizer.
///
/// Every glyph is a solid block whose top sits `CAP_HEIGHT` units above the
/// origin. Widths vary with the character code, every fifth code gets a
/// descender, and the space character renders blank.
#[derive(Debug)]
pub(crate) struct FakeRasterizer {
    pub(crate) requests: Vec<RasterRequest>,
    failing: HashSet<u32>,
    blank: HashSet<u32>,
}

impl Default for FakeRasterizer {
    fn default() -> Self {
        Self { requests: Vec::new(), failing: HashSet::new(), blank: HashSet::from([0x20]) }
    }
}

impl FakeRasterizer {
    pub(crate) const CAP_HEIGHT: f64 = 32.0;
    pub(crate) const DESCENT: f64 = 8.0;

    /// Simulates a rasterizer that produces no output file for `character`.
    pub(crate) fn failing_on(mut self, character: u32) -> Self {
        self.failing.insert(character);
        self
    }

    /// Renders `character` without any ink.
    pub(crate) fn blank_on(mut self, character: u32) -> Self {
        self.blank.insert(character);
        self
    }

    /// Unscaled advance of the block drawn for `character`.
    pub(crate) fn width_units(character: u32) -> f64 {
        10.0 + (character % 7) as f64 * 2.0
    }

    pub(crate) fn descent_units(character: u32) -> f64 {
        if character % 5 == 0 {
            Self::DESCENT
        } else {
            0.0
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&mut self, request: &RasterRequest) -> Result<RgbaImage, AtlasError> {
        self.requests.push(*request);

        let c = request.character;
        if self.failing.contains(&c) {
            let path = PathBuf::from(format!("fake/sdf-{c}.png"));
            return Err(AtlasError::glyph_output_missing(c, &path));
        }

        let mut image = RgbaImage::from_pixel(request.size, request.size, BACKGROUND);
        if self.blank.contains(&c) {
            return Ok(image);
        }

        let s = request.scale;
        let (ox, oy) = request.origin_px();
        let left = ox.round() as i64;
        let right = (ox + Self::width_units(c) * s).round() as i64;
        let top = (oy - Self::CAP_HEIGHT * s).round() as i64;
        let bottom = (oy + Self::descent_units(c) * s).round() as i64;

        let size = request.size as i64;
        for y in top.max(0)..bottom.min(size) {
            for x in left.max(0)..right.min(size) {
                image.put_pixel(x as u32, y as u32, Rgba([0xff, 0xff, 0xff, 0xff]));
            }
        }

        Ok(image)
    }
}
