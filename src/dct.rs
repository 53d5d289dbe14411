// JPEG-style block DCT codec: 8x8 floating-point DCT-II, a JPEG luminance
// quantization matrix scaled by quality, and 16-bit quantized coefficients.
//
// Color input is reduced to a single luminance plane before transform (this
// codec only ever stores one channel); the plane is padded to a multiple of
// 8 in each dimension by replicating the last row/column, transformed block
// by block in raster order, and cropped back on decode.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::array2d::Array2D;
use crate::container::{check_magic, read_header, write_header};
use crate::error::{CodecError, Result};
use crate::image::{PlanarImage, Raster};

const MAGIC: &[u8; 4] = b"DCT ";
const N: usize = 8;

const BASE_Q: [[i32; 8]; 8] = [
    [16, 11, 10, 16, 24, 40, 51, 61],
    [12, 12, 14, 19, 26, 58, 60, 55],
    [14, 13, 16, 24, 40, 57, 69, 56],
    [14, 17, 22, 29, 51, 87, 80, 62],
    [18, 22, 37, 56, 68, 109, 103, 77],
    [24, 35, 55, 64, 81, 104, 113, 92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 103, 99],
];

fn alpha(u: usize) -> f64 {
    if u == 0 {
        (1.0 / N as f64).sqrt()
    } else {
        (2.0 / N as f64).sqrt()
    }
}

/// Direct (non-separable-shortcut) forward DCT-II of one 8x8 block.
fn dct8x8(block: &[[f64; 8]; 8]) -> [[f64; 8]; 8] {
    let mut out = [[0.0f64; 8]; 8];
    for u in 0..N {
        for v in 0..N {
            let mut sum = 0.0;
            for x in 0..N {
                for y in 0..N {
                    sum += block[x][y]
                        * (((2 * x + 1) * u) as f64 * std::f64::consts::PI / (2 * N) as f64).cos()
                        * (((2 * y + 1) * v) as f64 * std::f64::consts::PI / (2 * N) as f64).cos();
                }
            }
            out[u][v] = alpha(u) * alpha(v) * sum;
        }
    }
    out
}

/// Direct inverse DCT-II of one 8x8 block.
fn idct8x8(freq: &[[f64; 8]; 8]) -> [[f64; 8]; 8] {
    let mut out = [[0.0f64; 8]; 8];
    for x in 0..N {
        for y in 0..N {
            let mut sum = 0.0;
            for u in 0..N {
                for v in 0..N {
                    sum += alpha(u)
                        * alpha(v)
                        * freq[u][v]
                        * (((2 * x + 1) * u) as f64 * std::f64::consts::PI / (2 * N) as f64).cos()
                        * (((2 * y + 1) * v) as f64 * std::f64::consts::PI / (2 * N) as f64).cos();
                }
            }
            out[x][y] = sum;
        }
    }
    out
}

/// Scale the base JPEG luminance matrix by a quality-derived factor.
/// `quality` is clamped to [1, 100] before the scale is computed.
fn build_quant_matrix(quality: u8) -> [[f64; 8]; 8] {
    let qf = quality.clamp(1, 100) as f64;
    let scale = if qf < 50.0 { 50.0 / qf } else { (200.0 - 2.0 * qf) / 100.0 };
    let mut q = [[0.0f64; 8]; 8];
    for i in 0..N {
        for j in 0..N {
            q[i][j] = BASE_Q[i][j] as f64 * scale;
        }
    }
    q
}

/// Reduce a planar image to a single luminance plane. BGR input is combined
/// with BT.601 weights; single-channel input passes through unchanged.
fn to_luminance(planar: &PlanarImage) -> Vec<u8> {
    match planar.channels {
        1 => planar.planes[0].clone(),
        3 => {
            let (b, g, r) = (&planar.planes[0], &planar.planes[1], &planar.planes[2]);
            b.iter()
                .zip(g.iter())
                .zip(r.iter())
                .map(|((&b, &g), &r)| {
                    let y = 0.114 * b as f64 + 0.587 * g as f64 + 0.299 * r as f64;
                    y.round().clamp(0.0, 255.0) as u8
                })
                .collect()
        }
        other => unreachable!("PlanarImage::from_raster never yields {} channels", other),
    }
}

/// Pad a plane to a multiple of 8 in each dimension by replicating the last
/// row/column. Returns the padded plane and its (possibly larger) dimensions.
fn pad_to_multiple_of_8(plane: &[u8], width: u32, height: u32) -> (Array2D<u8>, u32, u32) {
    let padded_w = width.div_ceil(8) * 8;
    let padded_h = height.div_ceil(8) * 8;

    let mut padded = Array2D::<u8>::zeroed(padded_h as usize, padded_w as usize);
    padded.fill_with(|row, col| {
        let src_row = (row as u32).min(height - 1) as usize;
        let src_col = (col as u32).min(width - 1) as usize;
        plane[src_row * width as usize + src_col]
    });

    (padded, padded_w, padded_h)
}

pub fn compress(raster: &Raster, path: &Path, quality: u8) -> Result<()> {
    let planar = PlanarImage::from_raster(raster)?;
    let luma = to_luminance(&planar);
    let (padded, padded_w, padded_h) = pad_to_multiple_of_8(&luma, planar.width, planar.height);

    let qmat = build_quant_matrix(quality);
    let quality_byte = quality.clamp(1, 100);

    let mut file = File::create(path)?;
    write_header(&mut file, MAGIC, planar.width, planar.height, 1)?;
    file.write_u8(quality_byte)?;
    file.write_all(&[0u8; 3])?;
    file.write_u32::<LittleEndian>(padded_w)?;
    file.write_u32::<LittleEndian>(padded_h)?;

    for by in (0..padded_h as usize).step_by(N) {
        for bx in (0..padded_w as usize).step_by(N) {
            let mut block = [[0.0f64; 8]; 8];
            for i in 0..N {
                for j in 0..N {
                    block[i][j] = padded[by + i][bx + j] as f64 - 128.0;
                }
            }
            let freq = dct8x8(&block);
            for i in 0..N {
                for j in 0..N {
                    let coeff = (freq[i][j] / qmat[i][j]).round() as i16;
                    file.write_i16::<LittleEndian>(coeff)?;
                }
            }
        }
    }

    log::debug!(
        "dct: wrote {}x{} (padded {}x{}, quality {}) to {:?}",
        planar.width, planar.height, padded_w, padded_h, quality_byte, path
    );
    Ok(())
}

pub fn decompress(path: &Path) -> Result<Raster> {
    let mut file = File::open(path)?;
    check_magic(&mut file, MAGIC)?;
    let (width, height, channels) = read_header(&mut file)?;
    if channels != 1 {
        return Err(CodecError::UnsupportedChannelCount(channels));
    }

    let quality_byte = file.read_u8()?;
    let mut pad = [0u8; 3];
    file.read_exact(&mut pad)?;
    let padded_w = file.read_u32::<LittleEndian>()?;
    let padded_h = file.read_u32::<LittleEndian>()?;

    let qmat = build_quant_matrix(quality_byte);

    let blocks_x = padded_w as usize / N;
    let blocks_y = padded_h as usize / N;
    let mut padded = Array2D::<u8>::zeroed(padded_h as usize, padded_w as usize);

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let mut freq = [[0.0f64; 8]; 8];
            for i in 0..N {
                for j in 0..N {
                    let coeff = file.read_i16::<LittleEndian>()?;
                    freq[i][j] = coeff as f64 * qmat[i][j];
                }
            }
            let spatial = idct8x8(&freq);
            for i in 0..N {
                for j in 0..N {
                    let val = (spatial[i][j] + 128.0).round().clamp(0.0, 255.0) as u8;
                    padded[by * N + i][bx * N + j] = val;
                }
            }
        }
    }

    let mut data = vec![0u8; width as usize * height as usize];
    for row in 0..height as usize {
        for col in 0..width as usize {
            data[row * width as usize + col] = padded[row][col];
        }
    }

    log::debug!("dct: read {}x{} (quality {}) from {:?}", width, height, quality_byte, path);
    Ok(PlanarImage {
        width,
        height,
        channels: 1,
        planes: vec![data],
    }
    .to_raster())
}
