//! Huffman, RLE, LZW, and block-DCT codecs for 8-bit raster images, each
//! with a self-describing little-endian binary container.

pub mod array2d;
pub mod bitio;
pub mod codec;
pub mod container;
pub mod dct;
pub mod error;
pub mod huffman;
pub mod image;
pub mod lzw;
pub mod rle;

pub use codec::{compress, decompress, Codec, DEFAULT_QUALITY};
pub use error::{CodecError, Result};
pub use image::{PlanarImage, Raster};
