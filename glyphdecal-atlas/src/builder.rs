use std::path::Path;

use glyphdecal_data::DecalAtlasData;
use image::RgbaImage;
use log::info;

use crate::{
    calibrate::{calibrate, ScaleFactor},
    collector::collect,
    config::BuildConfig,
    error::AtlasError,
    packer::pack,
    rasterizer::Rasterizer,
};

/// A finished atlas: the canvas image and its glyph table.
#[derive(Debug)]
pub(crate) struct BuiltAtlas {
    pub(crate) image: RgbaImage,
    pub(crate) metadata: DecalAtlasData,
    pub(crate) scale: ScaleFactor,
    /// Glyphs whose bounds were assumed rather than measured
    pub(crate) fallback_count: usize,
}

impl BuiltAtlas {
    /// Writes the canvas as PNG and the glyph table as a JSON document.
    pub(crate) fn save(&self, image_path: &Path, metadata_path: &Path) -> Result<(), AtlasError> {
        self.image.save(image_path)?;
        self.metadata.save(metadata_path)?;
        Ok(())
    }
}

/// Runs calibration, collection and packing in sequence for one font.
pub(crate) struct AtlasBuilder<R> {
    config: BuildConfig,
    rasterizer: R,
    code: Option<String>,
    texture: Option<String>,
}

impl<R: Rasterizer> AtlasBuilder<R> {
    pub(crate) fn new(config: BuildConfig, rasterizer: R) -> Result<Self, AtlasError> {
        config.validate()?;
        Ok(Self { config, rasterizer, code: None, texture: None })
    }

    /// Values written into the document's resource placeholders.
    pub(crate) fn with_resource_names(mut self, code: &str, texture: &str) -> Self {
        self.code = Some(code.to_string());
        self.texture = Some(texture.to_string());
        self
    }

    pub(crate) fn build(&mut self) -> Result<BuiltAtlas, AtlasError> {
        let scale = calibrate(&mut self.rasterizer, self.config.decal_size)?;

        info!(
            "rasterizing {} glyphs ({}..={})",
            self.config.glyph_count(),
            self.config.min_char,
            self.config.max_char
        );
        let collected = collect(&mut self.rasterizer, &self.config, scale)?;
        let fallback_count = collected.fallback_count();

        let mut packed = pack(&collected, &self.config)?;
        if let Some(code) = &self.code {
            packed.layout.code = code.as_str().into();
        }
        if let Some(texture) = &self.texture {
            packed.layout.texture = texture.as_str().into();
        }

        Ok(BuiltAtlas { image: packed.image, metadata: packed.layout, scale, fallback_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRasterizer;

    fn build(config: BuildConfig, raster: FakeRasterizer) -> Result<BuiltAtlas, AtlasError> {
        AtlasBuilder::new(config, raster)?.build()
    }

    #[test]
    fn test_first_printable_characters() {
        let mut config = BuildConfig::new(32, 35, 16);
        config.space_width = 6;

        let atlas = build(config, FakeRasterizer::default()).unwrap();
        let metadata = &atlas.metadata;

        let chars: Vec<u32> = metadata.glyphs.iter().map(|g| g.character).collect();
        assert_eq!(chars, vec![32, 33, 34, 35]);
        assert_eq!(metadata.glyph(32).map(|g| g.width), Some(6));

        assert!(metadata.texture_size.is_power_of_two());
        assert!(metadata.texture_size <= DecalAtlasData::MAX_TEXTURE_SIZE);
        assert_eq!(atlas.image.width(), metadata.texture_size);
        assert_eq!(metadata.validate(), Ok(()));
        assert!(metadata.glyphs.iter().all(|g| g.height == metadata.line_height));
    }

    #[test]
    fn test_full_latin_range() {
        let atlas = build(BuildConfig::new(32, 255, 16), FakeRasterizer::default()).unwrap();

        assert_eq!(atlas.metadata.glyphs.len(), 224);
        assert_eq!(atlas.metadata.validate(), Ok(()));
        assert_eq!(atlas.fallback_count, 0);
    }

    #[test]
    fn test_resource_names() {
        let atlas = AtlasBuilder::new(BuildConfig::new(65, 70, 16), FakeRasterizer::default())
            .unwrap()
            .with_resource_names("tahoma", "tahoma_sdf")
            .build()
            .unwrap();

        assert_eq!(atlas.metadata.code, "tahoma");
        assert_eq!(atlas.metadata.texture, "tahoma_sdf");
    }

    #[test]
    fn test_placeholders_by_default() {
        let atlas = build(BuildConfig::new(65, 70, 16), FakeRasterizer::default()).unwrap();

        assert_eq!(atlas.metadata.code, DecalAtlasData::CODE_PLACEHOLDER);
        assert_eq!(atlas.metadata.texture, DecalAtlasData::TEXTURE_PLACEHOLDER);
    }

    #[test]
    fn test_fallback_glyphs_are_counted() {
        let raster = FakeRasterizer::default().blank_on(66).blank_on(68);
        let atlas = build(BuildConfig::new(65, 70, 16), raster).unwrap();

        assert_eq!(atlas.fallback_count, 2);
        assert_eq!(atlas.metadata.glyph(66).map(|g| g.width), Some(16));
    }

    #[test]
    fn test_missing_glyph_aborts_build() {
        let raster = FakeRasterizer::default().failing_on(34);
        let result = build(BuildConfig::new(32, 35, 16), raster);

        assert!(matches!(result, Err(AtlasError::Rasterization(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = AtlasBuilder::new(BuildConfig::new(10, 35, 16), FakeRasterizer::default());
        assert!(matches!(result, Err(AtlasError::Config(_))));
    }

    #[test]
    fn test_save_writes_image_and_document() {
        let dir = std::env::temp_dir().join("glyphdecal-builder-save");
        std::fs::create_dir_all(&dir).unwrap();
        let image_path = dir.join("atlas.png");
        let metadata_path = dir.join("atlas.json");

        let atlas = build(BuildConfig::new(32, 40, 16), FakeRasterizer::default()).unwrap();
        atlas.save(&image_path, &metadata_path).unwrap();

        let reloaded = DecalAtlasData::load(&metadata_path).unwrap();
        assert_eq!(reloaded, atlas.metadata);

        let image = image::open(&image_path).unwrap();
        assert_eq!(image.width(), atlas.metadata.texture_size);
    }
}
