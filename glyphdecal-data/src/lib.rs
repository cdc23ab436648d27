mod atlas;
mod glyph;
mod serialization;

pub use atlas::{DecalAtlasData, LayoutViolation};
pub use glyph::GlyphPlacement;
pub use serialization::DOCUMENT_VERSION;

/// Errors raised while reading or writing an atlas metadata document.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    /// The document is not valid JSON, or does not match the expected shape.
    #[error("Malformed atlas document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was written by an incompatible version of the tool.
    #[error("Unsupported atlas document version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// The document parsed, but its glyph table breaks a layout invariant.
    #[error("Invalid atlas layout: {0}")]
    Layout(#[from] LayoutViolation),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
