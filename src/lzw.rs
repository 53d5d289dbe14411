// 12-bit-code dictionary LZW codec.
//
// The dictionary starts pre-seeded with the 256 single-byte sequences and
// grows by one entry per emitted code until code 4095 has been assigned;
// growth then halts permanently (no reset), matching spec.md's literal
// "next free < 4096" growth rule.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::bitio::{BitReader, BitWriter};
use crate::container::{check_magic, read_header, write_header};
use crate::error::{CodecError, Result};
use crate::image::{PlanarImage, Raster};

const MAGIC: &[u8; 4] = b"LZW ";
const DICT_CAP: u32 = 4096;

/// Encode a byte plane into a sequence of 12-bit dictionary codes.
pub fn encode_channel(data: &[u8]) -> Vec<u16> {
    let mut dict: HashMap<Vec<u8>, u16> = (0u16..256).map(|i| (vec![i as u8], i)).collect();
    let mut next_free: u32 = 256;

    let mut w: Vec<u8> = Vec::new();
    let mut codes = Vec::new();

    for &c in data {
        let mut wc = w.clone();
        wc.push(c);
        if dict.contains_key(&wc) {
            w = wc;
        } else {
            codes.push(dict[&w]);
            if next_free < DICT_CAP {
                dict.insert(wc, next_free as u16);
                next_free += 1;
            }
            w = vec![c];
        }
    }
    if !w.is_empty() {
        codes.push(dict[&w]);
    }

    codes
}

/// Decode a sequence of 12-bit dictionary codes back into a byte plane.
pub fn decode_channel(codes: &[u16]) -> Result<Vec<u8>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }

    let mut dict: Vec<Vec<u8>> = (0..DICT_CAP as usize).map(|_| Vec::new()).collect();
    for i in 0..256usize {
        dict[i] = vec![i as u8];
    }
    let mut next_free: usize = 256;

    let k0 = codes[0] as usize;
    if k0 >= next_free {
        return Err(CodecError::MalformedStream(format!(
            "initial LZW code {} is not a seeded dictionary entry",
            k0
        )));
    }
    let mut w = dict[k0].clone();
    let mut out = w.clone();

    for &code in &codes[1..] {
        let k = code as usize;
        let entry = if k < next_free {
            dict[k].clone()
        } else if k == next_free {
            // KwKwK case.
            let mut e = w.clone();
            e.push(w[0]);
            e
        } else {
            return Err(CodecError::MalformedStream(format!(
                "LZW code {} exceeds dictionary bounds (next free {})",
                k, next_free
            )));
        };

        out.extend_from_slice(&entry);

        if next_free < DICT_CAP as usize {
            let mut new_entry = w.clone();
            new_entry.push(entry[0]);
            dict[next_free] = new_entry;
            next_free += 1;
        }
        w = entry;
    }

    Ok(out)
}

fn pack_codes(codes: &[u16]) -> (Vec<u8>, u64) {
    let mut writer = BitWriter::new();
    for &code in codes {
        writer.write_bits(code as u64, 12);
    }
    let valid_bits = writer.total_bits_written();
    (writer.finish(), valid_bits)
}

fn unpack_codes(packed: &[u8], valid_bits: u64) -> Result<Vec<u16>> {
    if valid_bits % 12 != 0 {
        return Err(CodecError::MalformedStream(
            "LZW valid bit count is not a multiple of 12".into(),
        ));
    }
    let mut reader = BitReader::new(packed);
    let mut codes = Vec::with_capacity((valid_bits / 12) as usize);
    let mut consumed = 0u64;
    while consumed < valid_bits {
        let code = reader
            .read_bits(12)
            .ok_or_else(|| CodecError::MalformedStream("truncated LZW code stream".into()))?;
        codes.push(code as u16);
        consumed += 12;
    }
    Ok(codes)
}

pub fn compress(raster: &Raster, path: &Path) -> Result<()> {
    let planar = PlanarImage::from_raster(raster)?;
    let mut file = File::create(path)?;
    write_header(&mut file, MAGIC, planar.width, planar.height, planar.channels)?;

    for plane in &planar.planes {
        let codes = encode_channel(plane);
        let (packed, valid_bits) = pack_codes(&codes);
        file.write_u64::<LittleEndian>(valid_bits)?;
        file.write_u32::<LittleEndian>(packed.len() as u32)?;
        file.write_all(&packed)?;
    }

    log::debug!("lzw: wrote {}x{}x{} to {:?}", planar.width, planar.height, planar.channels, path);
    Ok(())
}

pub fn decompress(path: &Path) -> Result<Raster> {
    let mut file = File::open(path)?;
    check_magic(&mut file, MAGIC)?;
    let (width, height, channels) = read_header(&mut file)?;

    let mut planes = Vec::with_capacity(channels as usize);
    for _ in 0..channels {
        let valid_bits = file.read_u64::<LittleEndian>()?;
        let size = file.read_u32::<LittleEndian>()? as usize;
        let mut packed = vec![0u8; size];
        file.read_exact(&mut packed)?;
        let codes = unpack_codes(&packed, valid_bits)?;
        planes.push(decode_channel(&codes)?);
    }

    log::debug!("lzw: read {}x{}x{} from {:?}", width, height, channels, path);
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
        env::temp_dir().join(format!("imgcodec_lzw_{}_{}", std::process::id(), name))
    }

    #[test]
    fn empty_input_produces_no_codes() {
        assert!(encode_channel(&[]).is_empty());
    }

    #[test]
    fn single_byte_produces_one_code() {
        let codes = encode_channel(&[42]);
        assert_eq!(codes, vec![42]);
    }

    #[test]
    fn tobeornottobeorenot_matches_textbook_output() {
        // Canonical LZW example, 8-bit alphabet, codes seeded at 256.
        let data = b"TOBEORNOTTOBEORTOBEORNOT";
        let codes = encode_channel(data);
        let expected: Vec<u16> = vec![
            b'T' as u16,
            b'O' as u16,
            b'B' as u16,
            b'E' as u16,
            b'O' as u16,
            b'R' as u16,
            b'N' as u16,
            b'O' as u16,
            b'T' as u16,
            256,
            258,
            260,
            265,
            259,
            261,
            263,
        ];
        assert_eq!(codes, expected);
    }

    #[test]
    fn round_trip_channel() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT".to_vec();
        let codes = encode_channel(&data);
        let decoded = decode_channel(&codes).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_repetitive_data_fills_dictionary() {
        let data: Vec<u8> = (0..20000u32).map(|i| (i % 3) as u8).collect();
        let codes = encode_channel(&data);
        let decoded = decode_channel(&codes).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn code_beyond_next_free_is_malformed() {
        let err = decode_channel(&[0, 4090]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream(_)));
    }

    #[test]
    fn non_multiple_of_twelve_valid_bits_is_malformed() {
        let err = unpack_codes(&[0, 0], 13).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream(_)));
    }

    #[test]
    fn file_round_trip() {
        let path = temp_path("color.lzw");
        let raster = Raster::new(4, 4, 3, (0..48).map(|i| (i % 5) as u8).collect());
        compress(&raster, &path).unwrap();
        let back = decompress(&path).unwrap();
        assert_eq!(back.data, raster.data);
        std::fs::remove_file(&path).ok();
    }
}
