use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{DecalAtlasData, DocumentError};

/// Dictates the layout of the metadata document.
pub const DOCUMENT_VERSION: u8 = 0x01;

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u8,
    #[serde(flatten)]
    atlas: &'a DecalAtlasData,
}

#[derive(Deserialize)]
struct Document {
    version: u8,
    #[serde(flatten)]
    atlas: DecalAtlasData,
}

impl DecalAtlasData {
    /// Renders the glyph table as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let doc = DocumentRef { version: DOCUMENT_VERSION, atlas: self };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parses a JSON document, rejecting unknown versions and layouts that
    /// break the atlas invariants.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Document = serde_json::from_str(json)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: doc.version,
                expected: DOCUMENT_VERSION,
            });
        }

        doc.atlas.validate()?;
        Ok(doc.atlas)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GlyphPlacement, LayoutViolation};

    fn sample_atlas() -> DecalAtlasData {
        let mut atlas = DecalAtlasData::new(64, 20, 2);
        atlas.code = "tahoma".into();
        atlas.glyphs = vec![
            GlyphPlacement::new(32, 0, 0, 8, 20),
            GlyphPlacement::new(33, 10, 0, 5, 20),
            GlyphPlacement::new(34, 17, 0, 9, 20),
        ];
        atlas
    }

    #[test]
    fn test_document_round_trip() {
        let original = sample_atlas();
        let json = original.to_json().unwrap();
        let restored = DecalAtlasData::from_json(&json).unwrap();

        assert_eq!(original, restored);
    }

    #[test]
    fn test_document_field_names() {
        let json = sample_atlas().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["code"], "tahoma");
        assert_eq!(value["texture"], "{texture}");
        assert_eq!(value["textureSize"], 64);
        assert_eq!(value["lineHeight"], 20);
        assert_eq!(value["glyphs"][1]["char"], 33);
        assert_eq!(value["glyphs"][1]["x"], 10);
    }

    #[test]
    fn test_unsupported_version() {
        let json = sample_atlas().to_json().unwrap().replacen("\"version\": 1", "\"version\": 7", 1);
        let result = DecalAtlasData::from_json(&json);

        assert!(matches!(
            result,
            Err(DocumentError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn test_invalid_layout_is_rejected_on_load() {
        let mut atlas = sample_atlas();
        atlas.glyphs[1].x = 4;
        let json = atlas.to_json().unwrap();

        assert!(matches!(DecalAtlasData::from_json(&json), Err(DocumentError::Layout(_))));
    }

    #[test]
    fn test_wrapping_placement_is_rejected_on_load() {
        let json = r#"{
            "version": 1,
            "code": "{code}",
            "texture": "{texture}",
            "textureSize": 64,
            "lineHeight": 16,
            "separation": 2,
            "glyphs": [{ "char": 33, "x": 4294967290, "y": 0, "width": 10, "height": 16 }]
        }"#;

        assert!(matches!(
            DecalAtlasData::from_json(json),
            Err(DocumentError::Layout(LayoutViolation::OutOfBounds { character: 33, .. }))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(DecalAtlasData::from_json("{ \"version\": "), Err(DocumentError::Json(_))));
    }
}
