// CLI entry point: `imgcodec <codec> compress <input> <output> [quality]`
// and `imgcodec <codec> decompress <input> <output>`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use image::{DynamicImage, GenericImageView};

use imgcodec::{CodecError, Raster, DEFAULT_QUALITY};

#[derive(Parser)]
#[command(name = "imgcodec")]
#[command(about = "Huffman, RLE, LZW, and DCT codecs for raster images", long_about = None)]
struct Cli {
    /// Codec to use: huffman, rle, lzw, or dct
    codec: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compress an image file into a codec container
    Compress {
        input: PathBuf,
        output: PathBuf,
        /// DCT quality 1-100 (ignored by other codecs); defaults to 75
        quality: Option<u8>,
    },
    /// Decompress a codec container back into an image file
    Decompress { input: PathBuf, output: PathBuf },
}

/// Load an image file into a BGR(A) raster via the `image` crate, which
/// decodes to RGB(A); the channels are swapped to match our container's
/// byte order.
fn load_raster(path: &PathBuf) -> imgcodec::Result<Raster> {
    let img = image::open(path).map_err(|e| CodecError::MalformedStream(e.to_string()))?;
    let (width, height) = img.dimensions();

    let (channels, mut data): (u8, Vec<u8>) = match img {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        other => {
            let rgb = other.to_rgb8();
            (3, rgb.into_raw())
        }
    };

    if channels >= 3 {
        for px in data.chunks_exact_mut(channels as usize) {
            px.swap(0, 2); // RGB(A) -> BGR(A)
        }
    }

    Ok(Raster::new(width, height, channels, data))
}

/// Save a BGR(A) raster back out through the `image` crate, swapping to
/// RGB(A) on the way.
fn save_raster(raster: &Raster, path: &PathBuf) -> imgcodec::Result<()> {
    let mut data = raster.data.clone();
    if raster.channels >= 3 {
        for px in data.chunks_exact_mut(raster.channels as usize) {
            px.swap(0, 2); // BGR(A) -> RGB(A)
        }
    }

    let dynamic = match raster.channels {
        1 => {
            let buf = image::GrayImage::from_raw(raster.width, raster.height, data)
                .ok_or_else(|| CodecError::MalformedStream("grayscale buffer size mismatch".into()))?;
            DynamicImage::ImageLuma8(buf)
        }
        3 => {
            let buf = image::RgbImage::from_raw(raster.width, raster.height, data)
                .ok_or_else(|| CodecError::MalformedStream("RGB buffer size mismatch".into()))?;
            DynamicImage::ImageRgb8(buf)
        }
        4 => {
            let buf = image::RgbaImage::from_raw(raster.width, raster.height, data)
                .ok_or_else(|| CodecError::MalformedStream("RGBA buffer size mismatch".into()))?;
            DynamicImage::ImageRgba8(buf)
        }
        other => return Err(CodecError::UnsupportedChannelCount(other)),
    };

    dynamic.save(path).map_err(|e| CodecError::MalformedStream(e.to_string()))?;
    Ok(())
}

fn run() -> imgcodec::Result<()> {
    let cli = Cli::parse();

    match cli.action {
        Action::Compress { input, output, quality } => {
            let raster = load_raster(&input)?;
            let quality = quality.unwrap_or(DEFAULT_QUALITY);

            let start = Instant::now();
            imgcodec::compress(&cli.codec, &raster, &output, quality)?;
            let elapsed = start.elapsed();

            let original_size = raster.data.len() as u64;
            let compressed_size = std::fs::metadata(&output)?.len();
            let ratio = if compressed_size > 0 {
                original_size as f64 / compressed_size as f64
            } else {
                0.0
            };
            log::info!(
                "compression done: ratio={:.3}, time={}ms",
                ratio,
                elapsed.as_millis()
            );
            println!("Compression done. Ratio={:.3}, time(ms)={}", ratio, elapsed.as_millis());
        }
        Action::Decompress { input, output } => {
            let start = Instant::now();
            let raster = imgcodec::decompress(&cli.codec, &input)?;
            let elapsed = start.elapsed();

            save_raster(&raster, &output)?;
            log::info!("decompression done: time={}ms", elapsed.as_millis());
            println!("Decompression done. time(ms)={}", elapsed.as_millis());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
