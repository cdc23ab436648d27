use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use glyphdecal_data::DecalAtlasData;

use crate::config::{BuildConfig, SdfMode};

#[derive(Parser, Debug)]
#[command(
    name = "glyphdecal-atlas",
    about = "Signed distance field glyph atlas generator",
    long_about = "Rasterizes a contiguous character range of a TTF/OTF font into distance field \
                  glyphs and packs them into a single power-of-two texture with JSON metadata"
)]
pub struct Cli {
    /// Source font file
    #[arg(long, value_name = "FILE")]
    pub ttf: PathBuf,

    /// Output texture path
    #[arg(short = 'o', long, default_value = "./sdf_atlas.png", value_name = "PATH")]
    pub output: PathBuf,

    /// Output metadata path [default: texture path with a .json extension]
    #[arg(long, value_name = "PATH")]
    pub metadata: Option<PathBuf>,

    /// First character code, inclusive
    #[arg(long, default_value_t = 32, value_name = "CODE")]
    pub min: u32,

    /// Last character code, inclusive
    #[arg(long, default_value_t = 255, value_name = "CODE")]
    pub max: u32,

    /// Nominal glyph size in pixels
    #[arg(short = 's', long, default_value_t = BuildConfig::DEFAULT_DECAL_SIZE, value_name = "PX")]
    pub size: u32,

    /// Minimum texture size; must be a power of two
    #[arg(long, value_name = "PX")]
    pub texture_size: Option<u32>,

    /// Distance field type
    #[arg(long, value_enum, default_value_t = SdfMode::Sdf)]
    pub sdf_mode: SdfMode,

    /// Width of the space character [default: half the glyph size]
    #[arg(long, value_name = "PX")]
    pub space: Option<u32>,

    /// Rasterization canvas size as a multiple of the glyph size
    #[arg(long, default_value_t = BuildConfig::DEFAULT_OVERSAMPLE, value_name = "FACTOR")]
    pub oversample: u32,

    /// Horizontal gap between packed glyphs
    #[arg(long, default_value_t = BuildConfig::DEFAULT_SEPARATION, value_name = "PX")]
    pub separation: u32,

    /// Path to the msdfgen executable
    #[arg(long, value_name = "PATH", conflicts_with = "builtin")]
    pub rasterizer: Option<PathBuf>,

    /// Use the in-process distance field renderer instead of msdfgen
    #[arg(long)]
    pub builtin: bool,

    /// Per-glyph rasterizer timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Keep the per-glyph images in the working directory
    #[arg(long)]
    pub retain_intermediate: bool,

    /// Value of the metadata's code field
    #[arg(long, default_value = DecalAtlasData::CODE_PLACEHOLDER)]
    pub code: String,

    /// Value of the metadata's texture field
    #[arg(long, default_value = DecalAtlasData::TEXTURE_PLACEHOLDER)]
    pub texture: String,
}

impl Cli {
    /// Validates the CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if !self.ttf.is_file() {
            return Err(format!("Font file '{}' not found", self.ttf.display()));
        }

        match (&self.rasterizer, self.builtin) {
            (None, false) => {
                return Err("Either --rasterizer <PATH> or --builtin is required".to_string())
            },
            (Some(_), true) => {
                return Err("--rasterizer and --builtin are mutually exclusive".to_string())
            },
            _ => {},
        }

        if self.timeout == 0 {
            return Err("Rasterizer timeout must be positive".to_string());
        }

        Ok(())
    }

    pub fn build_config(&self) -> BuildConfig {
        let mut config = BuildConfig::new(self.min, self.max, self.size);
        config.sdf_mode = self.sdf_mode;
        config.oversample = self.oversample;
        config.separation = self.separation;
        config.min_texture_size = self.texture_size;
        if let Some(width) = self.space {
            config.space_width = width;
        }

        config
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.metadata
            .clone()
            .unwrap_or_else(|| self.output.with_extension("json"))
    }

    /// Directory holding the texture; the working directory is created here.
    pub fn output_dir(&self) -> &Path {
        match self.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Prints a summary of the configuration
    pub fn print_summary(&self, config: &BuildConfig) {
        println!("\nGenerating distance field atlas:");
        println!("  Font: {}", self.ttf.display());
        println!("  Characters: {}..={} ({} glyphs)", config.min_char, config.max_char, config.glyph_count());
        println!("  Glyph size: {}px ({}x oversampled)", config.decal_size, config.oversample);
        println!("  Mode: {}", config.sdf_mode);
        println!("  Space width: {}px", config.space_width);

        match &self.rasterizer {
            Some(path) => println!("  Rasterizer: {}", path.display()),
            None => println!("  Rasterizer: builtin"),
        }

        if let Some(size) = config.min_texture_size {
            println!("  Minimum texture size: {size}x{size}");
        }

        println!("  Output: {}", self.output.display());
        println!("  Metadata: {}", self.metadata_path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["glyphdecal-atlas"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn font_file() -> String {
        let path = std::env::temp_dir().join("glyphdecal-cli-font.ttf");
        std::fs::write(&path, b"not really a font").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_cli_validation() {
        let font = font_file();
        let cli = cli(&["--ttf", &font, "--builtin"]);

        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let font = font_file();
        let cli = cli(&["--ttf", &font, "--builtin"]);
        let config = cli.build_config();

        assert_eq!((config.min_char, config.max_char), (32, 255));
        assert_eq!(config.decal_size, 16);
        assert_eq!(config.space_width, 8);
        assert_eq!(config.sdf_mode, SdfMode::Sdf);
        assert_eq!(config.min_texture_size, None);
        assert_eq!(cli.code, "{code}");
        assert_eq!(cli.texture, "{texture}");
        assert_eq!(cli.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let font = font_file();
        let cli = cli(&[
            "--ttf", &font, "--rasterizer", "/opt/msdfgen", "--min", "48", "--max", "57",
            "-s", "24", "--space", "5", "--sdf-mode", "msdf", "--texture-size", "512",
        ]);
        let config = cli.build_config();

        assert!(cli.validate().is_ok());
        assert_eq!((config.min_char, config.max_char), (48, 57));
        assert_eq!(config.decal_size, 24);
        assert_eq!(config.space_width, 5);
        assert_eq!(config.sdf_mode, SdfMode::Msdf);
        assert_eq!(config.min_texture_size, Some(512));
    }

    #[test]
    fn test_missing_rasterizer() {
        let font = font_file();
        assert!(cli(&["--ttf", &font]).validate().is_err());
    }

    #[test]
    fn test_conflicting_rasterizers() {
        let result = Cli::try_parse_from([
            "glyphdecal-atlas", "--ttf", "font.ttf", "--builtin", "--rasterizer", "msdfgen",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_font() {
        let cli = cli(&["--ttf", "/nonexistent/font.ttf", "--builtin"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_metadata_path() {
        let font = font_file();

        let cli_default = cli(&["--ttf", &font, "--builtin", "-o", "out/tahoma.png"]);
        assert_eq!(cli_default.metadata_path(), PathBuf::from("out/tahoma.json"));
        assert_eq!(cli_default.output_dir(), Path::new("out"));

        let cli_explicit = cli(&["--ttf", &font, "--builtin", "-o", "tahoma.png", "--metadata", "meta.json"]);
        assert_eq!(cli_explicit.metadata_path(), PathBuf::from("meta.json"));
        assert_eq!(cli_explicit.output_dir(), Path::new("."));
    }
}
