use glyphdecal_data::{DecalAtlasData, GlyphPlacement};
use image::{imageops, GenericImage, RgbaImage};
use log::info;

use crate::{
    bounds::{Rect, BACKGROUND},
    collector::CollectedGlyphs,
    config::BuildConfig,
    error::AtlasError,
};

/// The combined canvas and the glyph table describing it.
#[derive(Debug)]
pub(crate) struct PackedAtlas {
    pub(crate) image: RgbaImage,
    pub(crate) layout: DecalAtlasData,
}

/// First-fit-by-row cursor. Glyphs are placed left to right; a glyph that
/// would run into the right edge starts a new row one line height lower.
/// Rows are never revisited.
#[derive(Debug)]
pub(super) struct RowPacker {
    canvas_size: u32,
    line_height: u32,
    separation: u32,
    /// Right edge of the last glyph placed in the current row
    row_end: u32,
    row_y: u32,
    row_is_empty: bool,
}

impl RowPacker {
    pub(super) fn new(canvas_size: u32, line_height: u32, separation: u32) -> Self {
        Self { canvas_size, line_height, separation, row_end: 0, row_y: 0, row_is_empty: true }
    }

    /// Reserves space for a glyph of the given width and returns its
    /// top-left corner, or `None` when the canvas is full.
    pub(super) fn place(&mut self, width: u32) -> Option<(u32, u32)> {
        if width > self.canvas_size {
            return None;
        }

        if !self.row_is_empty && self.row_end + self.separation + width >= self.canvas_size {
            self.row_y += self.line_height;
            self.row_end = 0;
            self.row_is_empty = true;
        }

        if self.row_y + self.line_height > self.canvas_size {
            return None;
        }

        let x = if self.row_is_empty { 0 } else { self.row_end + self.separation };
        self.row_end = x + width;
        self.row_is_empty = false;

        Some((x, self.row_y))
    }
}

/// Side length needed to lay the glyphs out `ceil(sqrt(n))` to a row.
pub(super) fn estimate_extent(widths: &[u32], line_height: u32, separation: u32) -> u32 {
    if widths.is_empty() {
        return 0;
    }

    let per_row = (widths.len() as f64).sqrt().ceil() as usize;
    let rows = widths.chunks(per_row);
    let row_count = rows.len() as u32;
    let widest_row = rows
        .map(|row| row.iter().sum::<u32>() + separation * (row.len() as u32 - 1))
        .max()
        .unwrap_or(0);

    widest_row.max(row_count * line_height)
}

/// Picks the smallest power-of-two canvas, starting at `start` and doubling
/// up to `max`, that covers the estimated extent and into which the row
/// packer actually fits every glyph.
pub(super) fn select_canvas_size(
    widths: &[u32],
    line_height: u32,
    separation: u32,
    start: u32,
    max: u32,
) -> Result<u32, AtlasError> {
    let estimate = estimate_extent(widths, line_height, separation);
    let fits = |size: u32| {
        let mut packer = RowPacker::new(size, line_height, separation);
        widths.iter().all(|&w| packer.place(w).is_some())
    };

    let mut size = start.max(1).next_power_of_two();
    while size <= max {
        if size >= estimate && fits(size) {
            return Ok(size);
        }
        size *= 2;
    }

    Err(AtlasError::canvas_too_large(max))
}

/// Lays every collected glyph out on a single square canvas.
///
/// Each glyph keeps its own horizontal ink extent but is cropped to the
/// shared vertical band `[min_y, max_y)`, so all placements have the same
/// height and a common baseline.
pub(crate) fn pack(collected: &CollectedGlyphs, config: &BuildConfig) -> Result<PackedAtlas, AtlasError> {
    if collected.glyphs.is_empty() {
        return Err(AtlasError::no_glyphs());
    }

    let line_height = collected.line_height();
    let widths: Vec<u32> = collected.glyphs.iter().map(|g| g.ink_bounds.width).collect();
    let start = config.decal_size.max(config.min_texture_size.unwrap_or(0));
    let size = select_canvas_size(
        &widths,
        line_height,
        config.separation,
        start,
        config.max_texture_size,
    )?;
    info!("packing {} glyphs into a {size}x{size} texture, line height {line_height}px", widths.len());

    let mut image = RgbaImage::from_pixel(size, size, BACKGROUND);
    let mut layout = DecalAtlasData::new(size, line_height, config.separation);
    let mut packer = RowPacker::new(size, line_height, config.separation);

    for glyph in &collected.glyphs {
        let width = glyph.ink_bounds.width;
        let (x, y) = packer
            .place(width)
            .ok_or_else(|| AtlasError::canvas_too_large(config.max_texture_size))?;

        let source = &glyph.source;
        let crop = Rect::new(glyph.ink_bounds.x, collected.min_y, width, line_height)
            .clamp_to(source.width(), source.height());
        let cropped = imageops::crop_imm(source, crop.x, crop.y, crop.width, crop.height).to_image();
        image.copy_from(&cropped, x, y)?;

        layout.glyphs.push(GlyphPlacement::new(glyph.character, x, y, width, line_height));
    }

    Ok(PackedAtlas { image, layout })
}
