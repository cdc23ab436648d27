use std::{collections::HashMap, fmt::Write, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::eyre;
use colored::Colorize;
use glyphdecal_data::{DecalAtlasData, GlyphPlacement};
use image::{Rgba, RgbaImage};

/// Widest preview, in terminal columns
const MAX_PREVIEW_COLUMNS: u32 = 128;

#[derive(Parser, Debug)]
#[command(name = "verify-atlas", about = "Checks and previews a distance field atlas")]
struct Args {
    /// Metadata document written by glyphdecal-atlas
    #[arg(value_name = "METADATA")]
    metadata: PathBuf,

    /// Atlas texture to check against the metadata and preview
    #[arg(long, value_name = "PNG")]
    image: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // loading validates the layout invariants
    let atlas = DecalAtlasData::load(&args.metadata)?;

    println!("=== Distance Field Atlas ===");
    println!("Code: {}  Texture: {}", atlas.code, atlas.texture);
    println!(
        "Texture: {0}x{0}, line height {1}px, separation {2}px",
        atlas.texture_size, atlas.line_height, atlas.separation
    );
    println!("Glyphs: {}", atlas.glyphs.len());
    println!("{}", "Layout OK".green());

    print_glyph_table(&atlas);

    if let Some(path) = &args.image {
        let image = image::open(path)?.to_rgba8();
        if image.dimensions() != (atlas.texture_size, atlas.texture_size) {
            return Err(eyre!(
                "texture is {}x{}, metadata expects {}x{}",
                image.width(),
                image.height(),
                atlas.texture_size,
                atlas.texture_size
            ));
        }

        let blank: Vec<&GlyphPlacement> = atlas
            .glyphs
            .iter()
            .filter(|g| g.character != 0x20 && !has_ink(&image, g))
            .collect();
        if blank.is_empty() {
            println!("{}", "Every glyph placement holds ink".green());
        } else {
            for glyph in blank {
                let message = format!("glyph {} ({}) is blank", symbol_of(glyph), glyph.character);
                println!("{}", message.yellow());
            }
        }

        println!();
        print!("{}", render_preview(&atlas, &image));
    }

    Ok(())
}

fn symbol_of(glyph: &GlyphPlacement) -> String {
    match glyph.symbol() {
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("U+{:04X}", glyph.character),
    }
}

fn print_glyph_table(atlas: &DecalAtlasData) {
    println!("\n{:>6} {:>6}  {:>5} {:>5} {:>5} {:>5}", "code", "char", "x", "y", "w", "h");
    println!("{}", "-".repeat(40));
    for glyph in &atlas.glyphs {
        println!(
            "{:>6} {:>6}  {:>5} {:>5} {:>5} {:>5}",
            glyph.character,
            symbol_of(glyph).truecolor(0xfe, 0x80, 0x19),
            glyph.x,
            glyph.y,
            glyph.width,
            glyph.height
        );
    }
}

fn has_ink(image: &RgbaImage, glyph: &GlyphPlacement) -> bool {
    (glyph.y..glyph.bottom())
        .flat_map(|y| (glyph.x..glyph.right()).map(move |x| (x, y)))
        .any(|(x, y)| brightness(image.get_pixel(x, y)) > 0)
}

fn brightness(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    r.max(g).max(b)
}

/// Half-block rendering of the canvas, downsampled to fit the terminal.
/// Empty cells where a glyph placement starts show the glyph's symbol.
fn render_preview(atlas: &DecalAtlasData, image: &RgbaImage) -> String {
    let step = atlas.texture_size.div_ceil(MAX_PREVIEW_COLUMNS).max(1);
    let columns = atlas.texture_size / step;
    let rows = columns.div_ceil(2);

    let labels: HashMap<(u32, u32), String> = atlas
        .glyphs
        .iter()
        .map(|g| ((g.x / step, g.y / step / 2), symbol_of(g)))
        .collect();

    let sample = |x: u32, y: u32| -> u8 {
        let (px, py) = (x * step, y * step);
        if px < image.width() && py < image.height() {
            brightness(image.get_pixel(px, py))
        } else {
            0
        }
    };

    let mut output = String::new();
    for row in 0..rows {
        for column in 0..columns {
            let top = sample(column, row * 2);
            let bottom = sample(column, row * 2 + 1);

            match (top > 0, bottom > 0) {
                (true, true) => {
                    let px = "▀".truecolor(top, top, top).on_truecolor(bottom, bottom, bottom);
                    write!(&mut output, "{px}").ok();
                },
                (true, false) => {
                    write!(&mut output, "{}", "▀".truecolor(top, top, top)).ok();
                },
                (false, true) => {
                    write!(&mut output, "{}", "▄".truecolor(bottom, bottom, bottom)).ok();
                },
                (false, false) => match labels.get(&(column, row)) {
                    Some(label) if label.chars().count() == 1 => {
                        write!(&mut output, "{}", label.truecolor(0xfe, 0x80, 0x19)).ok();
                    },
                    _ => {
                        write!(&mut output, " ").ok();
                    },
                },
            }
        }
        writeln!(&mut output).ok();
    }

    output
}
