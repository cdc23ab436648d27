mod bounds;
mod builder;
mod calibrate;
mod cli;
mod collector;
mod config;
mod error;
mod packer;
mod rasterizer;
#[cfg(test)]
mod testing;
mod workdir;

use std::fs;

use clap::Parser;
use color_eyre::eyre::eyre;
use colored::Colorize;

use crate::{
    builder::AtlasBuilder,
    cli::Cli,
    rasterizer::{BuiltinRasterizer, MsdfgenRasterizer, Rasterizer},
    workdir::WorkDir,
};

fn main() -> color_eyre::Result<()> {
    // panic hook
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // parse and validate command line arguments
    let cli = Cli::parse();
    cli.validate().map_err(|e| eyre!(e))?;

    let config = cli.build_config();
    config.validate()?;
    cli.print_summary(&config);

    fs::create_dir_all(cli.output_dir())?;
    let work_dir = WorkDir::prepare(cli.output_dir(), cli.retain_intermediate)?;

    let rasterizer: Box<dyn Rasterizer> = match &cli.rasterizer {
        Some(executable) => Box::new(
            MsdfgenRasterizer::new(executable, &cli.ttf, config.sdf_mode, work_dir.path())
                .with_timeout(cli.timeout())
                .retain_files(cli.retain_intermediate),
        ),
        None => Box::new(BuiltinRasterizer::new(&cli.ttf, config.sdf_mode)?),
    };

    let atlas = AtlasBuilder::new(config, rasterizer)?
        .with_resource_names(&cli.code, &cli.texture)
        .build()?;

    let metadata_path = cli.metadata_path();
    atlas.save(&cli.output, &metadata_path)?;
    drop(work_dir);

    let metadata = &atlas.metadata;
    println!("\n{}", "Distance field atlas generated!".green().bold());
    println!("Texture size: {0}x{0}", metadata.texture_size);
    println!("Line height: {}px", metadata.line_height);
    println!("Scale factor: {:.4}", atlas.scale.get());
    println!("Glyph count: {}", metadata.glyphs.len());
    if atlas.fallback_count > 0 {
        let message = format!("Glyphs without detectable ink: {}", atlas.fallback_count);
        println!("{}", message.yellow());
    }
    println!("Texture: {}", cli.output.display());
    println!("Metadata: {}", metadata_path.display());

    Ok(())
}
