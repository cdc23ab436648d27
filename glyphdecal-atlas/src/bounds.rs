use image::{Rgba, RgbaImage};

/// Pixels of exactly this colour are background; everything else is ink.
pub(crate) const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0xff]);

/// Axis-aligned pixel rectangle; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Rect {
    pub(crate) const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub(crate) fn right(&self) -> u32 {
        self.x + self.width
    }

    pub(crate) fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Clips the rectangle to an image of the given dimensions.
    pub(crate) fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        Rect::new(x, y, self.right().min(width) - x, self.bottom().min(height) - y)
    }
}

/// Result of an ink bounds scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetectedBounds {
    /// Tight box around the ink that was found
    Measured(Rect),
    /// No ink in the search region; the caller's default was substituted
    Fallback(Rect),
}

impl DetectedBounds {
    pub(crate) fn rect(&self) -> Rect {
        match self {
            DetectedBounds::Measured(rect) | DetectedBounds::Fallback(rect) => *rect,
        }
    }

    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self, DetectedBounds::Fallback(_))
    }
}

/// Finds the tightest rectangle around all non-background pixels inside
/// `region`, falling back to `default` when the region holds no ink.
///
/// Each edge is located by an independent scan that stops at the first
/// column or row containing ink: left-to-right, top-to-bottom,
/// right-to-left and bottom-to-top. Right and bottom are exclusive, so the
/// result is the minimal box enclosing every ink pixel.
pub(crate) fn detect_bounds(image: &RgbaImage, region: Rect, default: Rect) -> DetectedBounds {
    let region = region.clamp_to(image.width(), image.height());
    let column_has_ink = |x: u32| (region.y..region.bottom()).any(|y| is_ink(image, x, y));
    let row_has_ink = |y: u32| (region.x..region.right()).any(|x| is_ink(image, x, y));

    let left = (region.x..region.right()).find(|&x| column_has_ink(x));
    let top = (region.y..region.bottom()).find(|&y| row_has_ink(y));
    let right = (region.x..region.right()).rev().find(|&x| column_has_ink(x));
    let bottom = (region.y..region.bottom()).rev().find(|&y| row_has_ink(y));

    match (left, top, right, bottom) {
        (Some(left), Some(top), Some(right), Some(bottom)) => {
            DetectedBounds::Measured(Rect::new(left, top, right + 1 - left, bottom + 1 - top))
        }
        _ => DetectedBounds::Fallback(default),
    }
}

fn is_ink(image: &RgbaImage, x: u32, y: u32) -> bool {
    *image.get_pixel(x, y) != BACKGROUND
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

    fn canvas(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, BACKGROUND)
    }

    fn full(image: &RgbaImage) -> Rect {
        Rect::new(0, 0, image.width(), image.height())
    }

    #[test]
    fn test_single_blob_is_tightly_bounded() {
        let mut image = canvas(32);
        for y in 5..17 {
            for x in 9..13 {
                image.put_pixel(x, y, INK);
            }
        }

        let bounds = detect_bounds(&image, full(&image), Rect::default());
        assert_eq!(bounds, DetectedBounds::Measured(Rect::new(9, 5, 4, 12)));
    }

    #[test]
    fn test_irregular_blob() {
        // an "L" shape: the box must span both strokes
        let mut image = canvas(20);
        for y in 2..15 {
            image.put_pixel(3, y, INK);
        }
        for x in 3..11 {
            image.put_pixel(x, 14, INK);
        }

        let bounds = detect_bounds(&image, full(&image), Rect::default());
        assert_eq!(bounds.rect(), Rect::new(3, 2, 8, 13));
    }

    #[test]
    fn test_single_pixel() {
        let mut image = canvas(8);
        image.put_pixel(7, 0, INK);

        let bounds = detect_bounds(&image, full(&image), Rect::default());
        assert_eq!(bounds, DetectedBounds::Measured(Rect::new(7, 0, 1, 1)));
    }

    #[test]
    fn test_dim_distance_values_count_as_ink() {
        let mut image = canvas(8);
        image.put_pixel(2, 3, Rgba([1, 1, 1, 0xff]));

        let bounds = detect_bounds(&image, full(&image), Rect::default());
        assert_eq!(bounds.rect(), Rect::new(2, 3, 1, 1));
    }

    #[test]
    fn test_empty_image_returns_default() {
        let image = canvas(48);
        let default = Rect::new(16, 16, 16, 16);

        let bounds = detect_bounds(&image, full(&image), default);
        assert_eq!(bounds, DetectedBounds::Fallback(default));
        assert!(bounds.is_fallback());
    }

    #[test]
    fn test_ink_outside_region_is_ignored() {
        let mut image = canvas(32);
        image.put_pixel(1, 1, INK);
        image.put_pixel(20, 20, INK);

        let bounds = detect_bounds(&image, Rect::new(10, 10, 22, 22), Rect::default());
        assert_eq!(bounds.rect(), Rect::new(20, 20, 1, 1));

        let bounds = detect_bounds(&image, Rect::new(2, 2, 10, 10), Rect::new(0, 0, 4, 4));
        assert!(bounds.is_fallback());
    }

    #[test]
    fn test_region_is_clamped_to_image() {
        let mut image = canvas(16);
        image.put_pixel(15, 15, INK);

        let bounds = detect_bounds(&image, Rect::new(8, 8, 100, 100), Rect::default());
        assert_eq!(bounds.rect(), Rect::new(15, 15, 1, 1));
    }

    #[test]
    fn test_clamp_to() {
        assert_eq!(Rect::new(4, 4, 10, 10).clamp_to(8, 12), Rect::new(4, 4, 4, 8));
        assert_eq!(Rect::new(20, 0, 5, 5).clamp_to(8, 8), Rect::new(8, 0, 0, 5));
    }
}
