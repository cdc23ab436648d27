use std::{path::Path, time::Duration};

use glyphdecal_data::DocumentError;

/// Fatal build errors; any of these aborts the whole atlas build.
#[derive(thiserror::Error, Debug)]
pub enum AtlasError {
    /// The reference glyph could not be rasterized or measured.
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// The rasterizer failed to produce a glyph image.
    #[error("Rasterization error: {0}")]
    Rasterization(String),

    /// The collected glyphs cannot be laid out on a permitted canvas.
    #[error("Packing error: {0}")]
    Packing(String),

    /// Build parameters are inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl AtlasError {
    // Calibration errors
    pub fn reference_glyph_empty(character: char) -> Self {
        Self::Calibration(format!(
            "reference glyph '{character}' has no measurable ink height; the font is malformed or unusable"
        ))
    }

    // Rasterization errors
    pub fn glyph_output_missing(character: u32, path: &Path) -> Self {
        Self::Rasterization(format!(
            "no output produced for glyph {} ({character}); expected \"{}\"",
            describe_char(character),
            path.display()
        ))
    }

    pub fn rasterizer_timed_out(character: u32, timeout: Duration) -> Self {
        Self::Rasterization(format!(
            "rasterizer did not finish glyph {} ({character}) within {timeout:?}",
            describe_char(character)
        ))
    }

    pub fn rasterizer_launch_failed(executable: &Path, source: std::io::Error) -> Self {
        Self::Rasterization(format!("failed to launch \"{}\": {source}", executable.display()))
    }

    pub fn unrenderable_char(character: u32) -> Self {
        Self::Rasterization(format!("character code {character} is not a valid unicode scalar value"))
    }

    // Packing errors
    pub fn canvas_too_large(max: u32) -> Self {
        Self::Packing(format!("glyph set does not fit in the {max}x{max} texture size limit"))
    }

    pub fn no_glyphs() -> Self {
        Self::Packing("no glyphs were collected".to_string())
    }

    // Config errors
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }
}

/// Printable form of a character code for diagnostics, e.g. `'A'`.
pub(crate) fn describe_char(character: u32) -> String {
    match char::from_u32(character) {
        Some(c) if !c.is_control() => format!("'{c}'"),
        _ => format!("U+{character:04X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_char() {
        assert_eq!(describe_char(0x41), "'A'");
        assert_eq!(describe_char(0x20), "' '");
        assert_eq!(describe_char(0x07), "U+0007");
        assert_eq!(describe_char(0xD800), "U+D800");
    }

    #[test]
    fn test_messages_name_the_glyph() {
        let err = AtlasError::glyph_output_missing(35, Path::new("tmp/sdf-35.png"));
        let message = err.to_string();

        assert!(message.contains("'#'"));
        assert!(message.contains("sdf-35.png"));
    }

    #[test]
    fn test_timeout_message_keeps_subsecond_precision() {
        let err = AtlasError::rasterizer_timed_out(65, Duration::from_millis(300));
        assert!(err.to_string().contains("within 300ms"));
    }
}
