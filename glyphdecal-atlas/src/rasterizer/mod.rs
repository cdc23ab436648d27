mod builtin;
mod msdfgen;

pub(crate) use builtin::BuiltinRasterizer;
pub(crate) use msdfgen::MsdfgenRasterizer;

use image::RgbaImage;

use crate::error::AtlasError;

/// One glyph rendering job.
///
/// Coordinates follow the msdfgen convention: the glyph outline, in
/// unscaled font units with y pointing up, is translated by `translate`
/// and then multiplied by `scale` to obtain pixel coordinates measured from
/// the bottom-left corner of the `size` x `size` canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RasterRequest {
    pub(crate) character: u32,
    pub(crate) size: u32,
    pub(crate) translate: (f64, f64),
    pub(crate) scale: f64,
}

impl RasterRequest {
    /// Pixel position of the glyph origin, measured from the top-left corner.
    pub(crate) fn origin_px(&self) -> (f64, f64) {
        let x = self.translate.0 * self.scale;
        let y = self.size as f64 - self.translate.1 * self.scale;
        (x, y)
    }
}

/// Renders a single glyph as a distance field on a black background.
///
/// Implementations block until the image is available; a glyph that cannot
/// be produced is a fatal error for the build.
pub(crate) trait Rasterizer {
    fn rasterize(&mut self, request: &RasterRequest) -> Result<RgbaImage, AtlasError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for Box<R> {
    fn rasterize(&mut self, request: &RasterRequest) -> Result<RgbaImage, AtlasError> {
        (**self).rasterize(request)
    }
}
