use anyhow::Context;
use clap::Parser;
use color_cut::{PaletteBuilder, DEFAULT_COLOR_COUNT, DEFAULT_QUALITY};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "color-cut")]
#[command(about = "Extract a representative color palette from an image")]
struct Cli {
    /// Image to read
    image: PathBuf,

    /// Number of palette colors (2-20)
    #[arg(short, long, default_value_t = DEFAULT_COLOR_COUNT)]
    colors: usize,

    /// Sample every n-th pixel (1-10)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: usize,

    /// Only print the dominant color
    #[arg(short, long)]
    dominant: bool,

    /// Also print the average color
    #[arg(short, long)]
    average: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "color_cut=warn".into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    let image = image::open(&cli.image)
        .with_context(|| format!("failed to open {}", cli.image.display()))?
        .to_rgba8();

    let builder = PaletteBuilder::from_image(image)
        .color_count(cli.colors)
        .quality(cli.quality);

    if cli.average {
        match builder.average_color() {
            Some(rgb) => println!("average {}", color_cut::rgb_to_hex(rgb)),
            None => println!("average -"),
        }
    }

    if cli.dominant {
        match builder.dominant_color() {
            Some(rgb) => println!("{}", color_cut::rgb_to_hex(rgb)),
            None => anyhow::bail!("no color could be extracted from {}", cli.image.display()),
        }

        return Ok(());
    }

    let color_map = builder
        .generate()
        .with_context(|| format!("no palette could be extracted from {}", cli.image.display()))?;

    for swatch in color_map.swatches() {
        let (r, g, b) = swatch.rgb();
        println!("{} rgb({r}, {g}, {b}) {}", swatch.hex(), swatch.population());
    }

    Ok(())
}
