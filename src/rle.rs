// Byte-wise run-length codec. Each run is stored as (value, run_length as
// big-endian u16); runs never exceed 65535.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::container::{check_magic, read_header, write_header};
use crate::error::{CodecError, Result};
use crate::image::{PlanarImage, Raster};

const MAGIC: &[u8; 4] = b"RLE ";

/// Encode one channel's worth of bytes as (value, run_hi, run_lo) triples.
pub fn encode_channel(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        let value = data[i];
        let mut run: usize = 1;
        while i + run < data.len() && data[i + run] == value && run < 0xFFFF {
            run += 1;
        }
        out.push(value);
        out.push((run >> 8) as u8);
        out.push((run & 0xFF) as u8);
        i += run;
    }
    out
}

/// Decode (value, run_hi, run_lo) triples back into a byte plane. Any
/// trailing remainder that doesn't form a full triple is malformed input.
pub fn decode_channel(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() % 3 != 0 {
        return Err(CodecError::MalformedStream(
            "RLE payload length is not a multiple of 3".into(),
        ));
    }
    let mut out = Vec::new();
    for triple in data.chunks_exact(3) {
        let value = triple[0];
        let run = ((triple[1] as usize) << 8) | triple[2] as usize;
        out.resize(out.len() + run, value);
    }
    Ok(out)
}

pub fn compress(raster: &Raster, path: &Path) -> Result<()> {
    let planar = PlanarImage::from_raster(raster)?;
    let mut file = File::create(path)?;
    write_header(&mut file, MAGIC, planar.width, planar.height, planar.channels)?;
    for plane in &planar.planes {
        let encoded = encode_channel(plane);
        file.write_u32::<LittleEndian>(encoded.len() as u32)?;
        file.write_all(&encoded)?;
    }
    log::debug!("rle: wrote {}x{}x{} to {:?}", planar.width, planar.height, planar.channels, path);
    Ok(())
}

pub fn decompress(path: &Path) -> Result<Raster> {
    let mut file = File::open(path)?;
    check_magic(&mut file, MAGIC)?;
    let (width, height, channels) = read_header(&mut file)?;

    let mut planes = Vec::with_capacity(channels as usize);
    for _ in 0..channels {
        let size = file.read_u32::<LittleEndian>()? as usize;
        let mut encoded = vec![0u8; size];
        file.read_exact(&mut encoded)?;
        planes.push(decode_channel(&encoded)?);
    }

    log::debug!("rle: read {}x{}x{} from {:?}", width, height, channels, path);
    Ok(PlanarImage {
        width,
        height,
        channels,
        planes,
    }
    .to_raster())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("imgcodec_rle_{}_{}", std::process::id(), name))
    }

    #[test]
    fn constant_plane_encodes_as_single_triple() {
        // W=4, H=2, C=1, all samples = 0xAB
        let data = vec![0xABu8; 8];
        let encoded = encode_channel(&data);
        assert_eq!(encoded, vec![0xAB, 0x00, 0x08]);
    }

    #[test]
    fn maximum_run_is_split_at_65535() {
        let data = vec![7u8; 100_000];
        let encoded = encode_channel(&data);
        assert_eq!(encoded.len() % 3, 0);
        assert_eq!(encoded.len() / 3, 100_000usize.div_ceil(0xFFFF));
    }

    #[test]
    fn round_trip_channel() {
        let data = vec![1, 1, 1, 2, 3, 3, 3, 3, 3, 0, 0];
        let encoded = encode_channel(&data);
        let decoded = decode_channel(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let err = decode_channel(&[1, 0]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream(_)));
    }

    #[test]
    fn file_round_trip_gray() {
        let path = temp_path("gray.rle");
        let raster = Raster::new(4, 2, 1, vec![0xAB; 8]);
        compress(&raster, &path).unwrap();
        let back = decompress(&path).unwrap();
        assert_eq!(back.data, raster.data);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn file_round_trip_color() {
        let path = temp_path("color.rle");
        let raster = Raster::new(2, 1, 3, vec![1, 2, 3, 1, 2, 3]);
        compress(&raster, &path).unwrap();
        let back = decompress(&path).unwrap();
        assert_eq!(back.data, raster.data);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn magic_mismatch_rejected() {
        let path = temp_path("bad_magic.huff");
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(b"HUFF").unwrap();
        }
        let err = decompress(&path).unwrap_err();
        assert!(matches!(err, CodecError::BadMagic { .. }));
        std::fs::remove_file(&path).ok();
    }
}
