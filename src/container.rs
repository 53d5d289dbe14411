// Shared container header I/O: every codec's file begins with a 4-byte magic
// followed by width/height/channels and 3 bytes of padding. All multi-byte
// integers are explicit little-endian.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CodecError, Result};

/// Write `magic`, then width/height/channels, then 3 zero padding bytes.
pub fn write_header<W: Write>(w: &mut W, magic: &[u8; 4], width: u32, height: u32, channels: u8) -> Result<()> {
    w.write_all(magic)?;
    w.write_u32::<LittleEndian>(width)?;
    w.write_u32::<LittleEndian>(height)?;
    w.write_u8(channels)?;
    w.write_all(&[0u8; 3])?;
    Ok(())
}

/// Read a 4-byte magic and compare it against `expected`.
pub fn check_magic<R: Read>(r: &mut R, expected: &[u8; 4]) -> Result<()> {
    let mut found = [0u8; 4];
    r.read_exact(&mut found)?;
    if &found != expected {
        return Err(CodecError::BadMagic {
            expected: *expected,
            found,
        });
    }
    Ok(())
}

/// Read width/height/channels and discard the 3 padding bytes. The magic
/// must already have been consumed via `check_magic`.
pub fn read_header<R: Read>(r: &mut R) -> Result<(u32, u32, u8)> {
    let width = r.read_u32::<LittleEndian>()?;
    let height = r.read_u32::<LittleEndian>()?;
    let channels = r.read_u8()?;
    let mut pad = [0u8; 3];
    r.read_exact(&mut pad)?;
    Ok((width, height, channels))
}
