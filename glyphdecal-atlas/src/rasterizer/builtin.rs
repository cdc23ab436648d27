use std::path::Path;

use cosmic_text::{fontdb, Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
use image::{Rgba, RgbaImage};

use crate::{
    config::SdfMode,
    error::AtlasError,
    rasterizer::{RasterRequest, Rasterizer},
};

const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

/// In-process replacement for msdfgen: shapes the glyph with cosmic-text,
/// thresholds its coverage and converts the mask into a single-channel
/// signed distance field.
pub(crate) struct BuiltinRasterizer {
    font_system: FontSystem,
    cache: SwashCache,
    family: String,
}

impl BuiltinRasterizer {
    /// Pixel size of one em at scale 1.0; matches msdfgen's legacy font
    /// units for a 2048 units-per-em font.
    const UNSCALED_EM_PX: f32 = 32.0;
    /// Distance, in output pixels, over which the field ramps from 0.5 to 0.
    const SPREAD_PX: f64 = 4.0;

    pub(crate) fn new(font: &Path, mode: SdfMode) -> Result<Self, AtlasError> {
        if mode != SdfMode::Sdf {
            return Err(AtlasError::invalid_config(format!(
                "the builtin rasterizer only renders '{}' fields, not '{mode}'",
                SdfMode::Sdf
            )));
        }

        let mut db = fontdb::Database::new();
        db.load_font_file(font)?;

        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| {
                AtlasError::invalid_config(format!("no usable font face in \"{}\"", font.display()))
            })?;

        Ok(Self {
            font_system: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
            cache: SwashCache::new(),
            family,
        })
    }

    /// Renders the glyph coverage mask onto a `size` x `size` canvas with
    /// the glyph origin placed at the requested position.
    fn coverage_mask(&mut self, symbol: char, request: &RasterRequest) -> Vec<bool> {
        let Self { font_system, cache, family } = self;
        let size = request.size as i32;
        let font_size = Self::UNSCALED_EM_PX * request.scale as f32;
        let metrics = Metrics::new(font_size, font_size * 1.2);
        let attrs = Attrs::new().family(Family::Name(family.as_str()));

        let mut buffer = Buffer::new(font_system, metrics);
        let mut buffer = buffer.borrow_with(font_system);
        buffer.set_size(Some(font_size * 4.0), Some(font_size * 4.0));
        buffer.set_text(&symbol.to_string(), &attrs, Shaping::Advanced);
        buffer.shape_until_scroll(true);

        let baseline = buffer.layout_runs().next().map(|run| run.line_y).unwrap_or(0.0);
        let (origin_x, origin_y) = request.origin_px();
        let dx = origin_x.round() as i32;
        let dy = (origin_y - baseline as f64).round() as i32;

        let mut mask = vec![false; (size * size) as usize];
        buffer.draw(cache, WHITE, |x, y, w, h, color| {
            if color.a() < 0x80 {
                return;
            }

            for py in (y + dy)..(y + dy + h as i32) {
                for px in (x + dx)..(x + dx + w as i32) {
                    if px >= 0 && px < size && py >= 0 && py < size {
                        mask[(py * size + px) as usize] = true;
                    }
                }
            }
        });

        mask
    }
}

impl Rasterizer for BuiltinRasterizer {
    fn rasterize(&mut self, request: &RasterRequest) -> Result<RgbaImage, AtlasError> {
        let symbol = char::from_u32(request.character)
            .ok_or_else(|| AtlasError::unrenderable_char(request.character))?;

        let mask = self.coverage_mask(symbol, request);
        let field = distance_field(&mask, request.size as usize, request.size as usize);

        let mut image = RgbaImage::new(request.size, request.size);
        for (pixel, value) in image.pixels_mut().zip(field) {
            *pixel = Rgba([value, value, value, 0xff]);
        }

        Ok(image)
    }
}

// large but finite, so the parabola intersections below never produce NaN
const FAR: f64 = 1e20;

/// Encodes a binary mask as a signed distance field: 0.5 (128) on the
/// outline, rising inside and falling to exactly 0 at `SPREAD_PX` outside.
fn distance_field(mask: &[bool], width: usize, height: usize) -> Vec<u8> {
    let to_inside = squared_distances(|i| mask[i], width, height);
    let to_outside = squared_distances(|i| !mask[i], width, height);

    to_inside
        .iter()
        .zip(to_outside.iter())
        .map(|(&d_in, &d_out)| {
            let signed = d_out.sqrt() - d_in.sqrt();
            let value = 0.5 + signed / (2.0 * BuiltinRasterizer::SPREAD_PX);
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}

/// Squared euclidean distance from every pixel to the nearest seed pixel,
/// by two passes of the 1D lower-envelope transform (Felzenszwalb and
/// Huttenlocher, "Distance Transforms of Sampled Functions").
fn squared_distances(is_seed: impl Fn(usize) -> bool, width: usize, height: usize) -> Vec<f64> {
    let mut grid: Vec<f64> =
        (0..width * height).map(|i| if is_seed(i) { 0.0 } else { FAR }).collect();

    let n = width.max(height);
    let mut f = vec![0.0; n];
    let mut d = vec![0.0; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0; n + 1];

    for x in 0..width {
        for y in 0..height {
            f[y] = grid[y * width + x];
        }
        edt_1d(&f[..height], &mut d[..height], &mut v[..height], &mut z[..height + 1]);
        for y in 0..height {
            grid[y * width + x] = d[y];
        }
    }

    for y in 0..height {
        let row = y * width..(y + 1) * width;
        f[..width].copy_from_slice(&grid[row.clone()]);
        edt_1d(&f[..width], &mut d[..width], &mut v[..width], &mut z[..width + 1]);
        grid[row].copy_from_slice(&d[..width]);
    }

    grid
}

fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, dq) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let offset = q as f64 - v[k] as f64;
        *dq = offset * offset + f[v[k]];
    }
}
