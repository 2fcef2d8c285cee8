use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use image::{DynamicImage, GenericImageView};
use roaster::{Descriptor, Settings, TracingTelemetry};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Lossless tile-adaptive image codec
#[derive(Parser)]
#[command(name = "roaster")]
#[command(about = "Compress and decompress roaster images", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a PNG, JPEG or PNM image into a roaster stream
    Compress {
        input: PathBuf,
        output: PathBuf,

        /// Edge length of the square tiles (4 to 64)
        #[arg(short, long, default_value_t = 8)]
        tile_size: u8,
    },

    /// Decompress a roaster stream into a PNM image
    Decompress { input: PathBuf, output: PathBuf },

    /// Print the header of a roaster stream
    Info { input: PathBuf },

    /// Check that a roaster stream decodes to the pixels of a source image
    Verify { source: PathBuf, compressed: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::default().with_telemetry(&TracingTelemetry);

    match cli.command {
        Commands::Compress {
            input,
            output,
            tile_size,
        } => {
            let (descriptor, pixels) = load_source(&input, tile_size)?;
            let encoded = descriptor
                .encode_with(&pixels, &settings)
                .with_context(|| format!("Failed to compress {}", input.display()))?;
            fs::write(&output, encoded)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Commands::Decompress { input, output } => {
            let encoded =
                fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let (descriptor, pixels) = Descriptor::decode_with(&encoded, &settings)
                .with_context(|| format!("Failed to decompress {}", input.display()))?;
            fs::write(&output, roaster::pnm::encode(&descriptor, &pixels)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
        Commands::Info { input } => {
            let encoded =
                fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let descriptor = roaster::decode_header(&encoded)
                .with_context(|| format!("Failed to read header of {}", input.display()))?;

            println!("{}", input.display());
            println!("  dimensions: {}x{}", descriptor.width, descriptor.height);
            println!("  channels:   {}", descriptor.channels);
            println!("  bit depth:  {}", descriptor.bit_depth);
            println!("  tile size:  {}", descriptor.tile_size);
            println!("  blocks:     {}", descriptor.block_count()?);
            println!("  size:       {} bytes", encoded.len());
        }
        Commands::Verify { source, compressed } => {
            let encoded = fs::read(&compressed)
                .with_context(|| format!("Failed to read {}", compressed.display()))?;
            let (descriptor, decoded) = Descriptor::decode_with(&encoded, &settings)
                .with_context(|| format!("Failed to decompress {}", compressed.display()))?;
            let (expected, pixels) = load_source(&source, descriptor.tile_size)?;

            if expected != descriptor {
                bail!("Header {descriptor:?} does not match source {expected:?}");
            }

            let mismatches = roaster::compare(&descriptor, &pixels, &decoded)?;
            if let Some(first) = mismatches.first() {
                bail!(
                    "{} samples differ, first at ({}, {}) channel {}: expected {}, got {}",
                    mismatches.len(),
                    first.x,
                    first.y,
                    first.channel,
                    first.expected,
                    first.actual
                );
            }

            tracing::info!("{} matches {}", compressed.display(), source.display());
        }
    }

    Ok(())
}

/// Loads an image file into a native pixel buffer.
///
/// 8 and 16 bit gray, gray-alpha, RGB and RGBA images keep their layout, every
/// other layout is converted to 16 bit RGBA.
fn load_source(path: &Path, tile_size: u8) -> Result<(Descriptor, Vec<u8>)> {
    let image = image::open(path).with_context(|| format!("Failed to load {}", path.display()))?;

    let (channels, bit_depth, pixels) = match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => {
            let channels = image.color().channel_count();
            (channels, 8, image.as_bytes().to_vec())
        }
        DynamicImage::ImageLuma16(ref buffer) => (1, 16, le_bytes(buffer.as_raw())),
        DynamicImage::ImageLumaA16(ref buffer) => (2, 16, le_bytes(buffer.as_raw())),
        DynamicImage::ImageRgb16(ref buffer) => (3, 16, le_bytes(buffer.as_raw())),
        DynamicImage::ImageRgba16(ref buffer) => (4, 16, le_bytes(buffer.as_raw())),
        _ => (4, 16, le_bytes(image.to_rgba16().as_raw())),
    };

    let (width, height) = image.dimensions();
    let descriptor = Descriptor {
        width,
        height,
        channels,
        bit_depth,
        tile_size,
    };

    Ok((descriptor, pixels))
}

fn le_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|sample| sample.to_le_bytes()).collect()
}
