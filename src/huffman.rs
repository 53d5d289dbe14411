// Per-channel Huffman entropy codec.
//
// The tree is rebuilt from a persisted 256-entry frequency table on both
// encode and decode, so nothing but the frequencies need to survive between
// the two. Nodes live in an arena (`Vec<Node>`, children addressed by
// index) rather than behind raw pointers, so there is nothing to leak and
// no recursion-depth limit on teardown.
//
// Ties in the priority queue are broken FIFO on insertion order: leaves are
// inserted in ascending symbol order during the initial tally, and internal
// nodes are inserted in the order they're created during the combine loop.
// Encode and decode both rebuild the tree this same way from the same
// frequency table, so they always agree.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::bitio::{BitReader, BitWriter};
use crate::container::{check_magic, read_header, write_header};
use crate::error::{CodecError, Result};
use crate::image::{PlanarImage, Raster};

const MAGIC: &[u8; 4] = b"HUFF";

enum NodeKind {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

struct Node {
    kind: NodeKind,
}

/// Rebuild a Huffman tree from a 256-entry frequency table. Returns the
/// node arena and the root's index.
fn build_tree(freq_table: &[u64; 256]) -> Result<(Vec<Node>, usize)> {
    let mut arena: Vec<Node> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::new();
    let mut seq: u64 = 0;

    for symbol in 0..256usize {
        let freq = freq_table[symbol];
        if freq > 0 {
            let idx = arena.len();
            arena.push(Node {
                kind: NodeKind::Leaf(symbol as u8),
            });
            heap.push(Reverse((freq, seq, idx)));
            seq += 1;
        }
    }

    if heap.is_empty() {
        return Err(CodecError::MalformedStream(
            "frequency table implies empty tree".into(),
        ));
    }

    if heap.len() == 1 {
        let Reverse((freq, _, leaf_idx)) = heap.pop().unwrap();
        let symbol = match arena[leaf_idx].kind {
            NodeKind::Leaf(s) => s,
            NodeKind::Internal { .. } => unreachable!(),
        };
        let dup_idx = arena.len();
        arena.push(Node {
            kind: NodeKind::Leaf(symbol),
        });
        let root_idx = arena.len();
        arena.push(Node {
            kind: NodeKind::Internal {
                left: leaf_idx,
                right: dup_idx,
            },
        });
        let _ = freq;
        return Ok((arena, root_idx));
    }

    while heap.len() > 1 {
        let Reverse((freq_a, _, a)) = heap.pop().unwrap();
        let Reverse((freq_b, _, b)) = heap.pop().unwrap();
        let parent_idx = arena.len();
        arena.push(Node {
            kind: NodeKind::Internal { left: a, right: b },
        });
        heap.push(Reverse((freq_a + freq_b, seq, parent_idx)));
        seq += 1;
    }

    let Reverse((_, _, root_idx)) = heap.pop().unwrap();
    Ok((arena, root_idx))
}

/// Derive a byte -> MSB-first bit sequence code table by a pre-order walk
/// (0 for left, 1 for right).
fn build_code_table(arena: &[Node], root: usize) -> [Vec<bool>; 256] {
    let mut table: [Vec<bool>; 256] = std::array::from_fn(|_| Vec::new());
    let mut stack: Vec<(usize, Vec<bool>)> = vec![(root, Vec::new())];

    while let Some((idx, path)) = stack.pop() {
        match arena[idx].kind {
            NodeKind::Leaf(symbol) => {
                // A zero-length code can only happen if the tree is a lone
                // leaf, which build_tree never produces - kept as a guard.
                let code = if path.is_empty() { vec![false] } else { path };
                table[symbol as usize] = code;
            }
            NodeKind::Internal { left, right } => {
                let mut left_path = path.clone();
                left_path.push(false);
                let mut right_path = path;
                right_path.push(true);
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }

    table
}

/// Encode one channel's bytes. Returns the packed payload, the number of
/// meaningful bits in it, and the frequency table used to build the tree.
pub fn compress_channel(data: &[u8]) -> Result<(Vec<u8>, u64, [u64; 256])> {
    if data.is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] += 1;
    }

    let (arena, root) = build_tree(&freq)?;
    let table = build_code_table(&arena, root);

    let mut writer = BitWriter::new();
    for &b in data {
        for &bit in &table[b as usize] {
            writer.write_bit(bit as u8);
        }
    }
    let valid_bits = writer.total_bits_written();
    let encoded = writer.finish();

    Ok((encoded, valid_bits, freq))
}

/// Decode a channel given its packed payload, valid bit count, and frequency table.
pub fn decompress_channel(encoded: &[u8], valid_bits: u64, freq: &[u64; 256]) -> Result<Vec<u8>> {
    let (arena, root) = build_tree(freq)?;

    let mut reader = BitReader::new(encoded);
    let mut out = Vec::new();
    let mut cur = root;

    for _ in 0..valid_bits {
        let bit = reader
            .read_bit()
            .ok_or_else(|| CodecError::MalformedStream("truncated Huffman payload".into()))?;

        cur = match arena[cur].kind {
            NodeKind::Internal { left, right } => {
                if bit == 0 {
                    left
                } else {
                    right
                }
            }
            NodeKind::Leaf(_) => {
                return Err(CodecError::MalformedStream(
                    "Huffman bit stream descended past a leaf".into(),
                ))
            }
        };

        if let NodeKind::Leaf(symbol) = arena[cur].kind {
            out.push(symbol);
            cur = root;
        }
    }

    Ok(out)
}

pub fn compress(raster: &Raster, path: &Path) -> Result<()> {
    let planar = PlanarImage::from_raster(raster)?;
    let mut file = File::create(path)?;
    write_header(&mut file, MAGIC, planar.width, planar.height, planar.channels)?;

    for plane in &planar.planes {
        let (encoded, valid_bits, freq) = compress_channel(plane)?;
        for &f in &freq {
            file.write_u64::<LittleEndian>(f)?;
        }
        file.write_u64::<LittleEndian>(valid_bits)?;
        file.write_u32::<LittleEndian>(encoded.len() as u32)?;
        file.write_all(&encoded)?;
    }

    log::debug!("huffman: wrote {}x{}x{} to {:?}", planar.width, planar.height, planar.channels, path);
    Ok(())
}

pub fn decompress(path: &Path) -> Result<Raster> {
    let mut file = File::open(path)?;
    check_magic(&mut file, MAGIC)?;
    let (width, height, channels) = read_header(&mut file)?;

    let mut planes = Vec::with_capacity(channels as usize);
    for _ in 0..channels {
        let mut freq = [0u64; 256];
        for f in freq.iter_mut() {
            *f = file.read_u64::<LittleEndian>()?;
        }
        let valid_bits = file.read_u64::<LittleEndian>()?;
        let size = file.read_u32::<LittleEndian>()? as usize;
        let mut encoded = vec![0u8; size];
        file.read_exact(&mut encoded)?;
        planes.push(decompress_channel(&encoded, valid_bits, &freq)?);
    }

    log::debug!("huffman: read {}x{}x{} from {:?}", width, height, channels, path);
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
        env::temp_dir().join(format!("imgcodec_huffman_{}_{}", std::process::id(), name))
    }

    #[test]
    fn single_symbol_gets_one_bit_codes() {
        let data = vec![42u8; 6];
        let (encoded, valid_bits, freq) = compress_channel(&data).unwrap();
        assert_eq!(valid_bits, 6);
        let decoded = decompress_channel(&encoded, valid_bits, &freq).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn two_symbol_alternating() {
        let data = vec![0u8, 1, 0, 1, 0, 1];
        let (encoded, valid_bits, freq) = compress_channel(&data).unwrap();
        assert_eq!(valid_bits, 6);
        let decoded = decompress_channel(&encoded, valid_bits, &freq).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn empty_channel_is_rejected() {
        let err = compress_channel(&[]).unwrap_err();
        assert!(matches!(err, CodecError::EmptyInput));
    }

    #[test]
    fn all_zero_frequency_table_is_malformed_on_decode() {
        let freq = [0u64; 256];
        let err = decompress_channel(&[], 0, &freq).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream(_)));
    }

    #[test]
    fn round_trip_varied_distribution() {
        let mut data = Vec::new();
        for i in 0..50u32 {
            data.push((i % 17) as u8);
        }
        let (encoded, valid_bits, freq) = compress_channel(&data).unwrap();
        let decoded = decompress_channel(&encoded, valid_bits, &freq).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn file_round_trip() {
        let path = temp_path("gray.huff");
        let raster = Raster::new(3, 3, 1, vec![1, 1, 2, 2, 2, 3, 4, 4, 4]);
        compress(&raster, &path).unwrap();
        let back = decompress(&path).unwrap();
        assert_eq!(back.data, raster.data);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn magic_mismatch_rejected() {
        let path = temp_path("bad_magic.rle");
        {
            let mut f = File::create(&path).unwrap();
            f.write_all(b"RLE ").unwrap();
        }
        let err = decompress(&path).unwrap_err();
        assert!(matches!(err, CodecError::BadMagic { .. }));
        std::fs::remove_file(&path).ok();
    }
}
