// Raster <-> per-channel plane conversion.
//
// `Raster` is the interleaved, row-major representation used at the
// boundary with callers (pixel I/O, CLI). `PlanarImage` is the decomposed
// per-channel representation the codecs actually consume: `planes[k][y*w+x]`
// is channel `k`'s sample at `(x, y)`.

use crate::error::{CodecError, Result};

/// An interleaved 8-bit raster: row 0 first, pixel 0 of each row first,
/// channels contiguous within a pixel. Color order is BGR(A).
#[derive(Clone, Debug)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width as usize * height as usize * channels as usize);
        Self {
            width,
            height,
            channels,
            data,
        }
    }
}

/// A decomposed raster: one byte plane per channel, each of length `width * height`.
#[derive(Clone, Debug)]
pub struct PlanarImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub planes: Vec<Vec<u8>>,
}

impl PlanarImage {
    /// Decompose a raster into planes. BGRA input is first reduced to BGR by
    /// dropping the alpha channel; anything else outside {1, 3} is rejected.
    pub fn from_raster(img: &Raster) -> Result<Self> {
        let pixel_count = img.width as usize * img.height as usize;

        let (channels, data): (u8, &[u8]) = match img.channels {
            1 | 3 => (img.channels, &img.data),
            4 => (3, &img.data), // handled below via the BGRA branch
            other => return Err(CodecError::UnsupportedChannelCount(other)),
        };

        if img.channels == 4 {
            let mut planes = vec![Vec::with_capacity(pixel_count); 3];
            for px in img.data.chunks_exact(4) {
                planes[0].push(px[0]);
                planes[1].push(px[1]);
                planes[2].push(px[2]);
                // px[3] (alpha) is dropped.
            }
            return Ok(Self {
                width: img.width,
                height: img.height,
                channels: 3,
                planes,
            });
        }

        let mut planes = vec![Vec::with_capacity(pixel_count); channels as usize];
        for px in data.chunks_exact(channels as usize) {
            for (k, plane) in planes.iter_mut().enumerate() {
                plane.push(px[k]);
            }
        }

        Ok(Self {
            width: img.width,
            height: img.height,
            channels,
            planes,
        })
    }

    /// Interleave planes back into a single raster.
    pub fn to_raster(&self) -> Raster {
        let pixel_count = self.width as usize * self.height as usize;
        let mut data = vec![0u8; pixel_count * self.channels as usize];
        for (k, plane) in self.planes.iter().enumerate() {
            for (i, &sample) in plane.iter().enumerate() {
                data[i * self.channels as usize + k] = sample;
            }
        }
        Raster {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_decomposition_matches_spec_scenario() {
        // W=2, H=1, C=3, pixels {(1,2,3),(1,2,3)}
        let raster = Raster::new(2, 1, 3, vec![1, 2, 3, 1, 2, 3]);
        let planar = PlanarImage::from_raster(&raster).unwrap();
        assert_eq!(planar.planes, vec![vec![1, 1], vec![2, 2], vec![3, 3]]);
    }

    #[test]
    fn round_trip_color() {
        let raster = Raster::new(3, 2, 3, (0..18).collect());
        let planar = PlanarImage::from_raster(&raster).unwrap();
        let back = planar.to_raster();
        assert_eq!(back.data, raster.data);
    }

    #[test]
    fn round_trip_gray() {
        let raster = Raster::new(4, 4, 1, (0..16).collect());
        let planar = PlanarImage::from_raster(&raster).unwrap();
        let back = planar.to_raster();
        assert_eq!(back.data, raster.data);
    }

    #[test]
    fn bgra_drops_alpha() {
        let raster = Raster::new(1, 1, 4, vec![10, 20, 30, 255]);
        let planar = PlanarImage::from_raster(&raster).unwrap();
        assert_eq!(planar.channels, 3);
        assert_eq!(planar.planes, vec![vec![10], vec![20], vec![30]]);
    }

    #[test]
    fn rejects_unsupported_channel_count() {
        let raster = Raster::new(1, 1, 2, vec![1, 2]);
        let err = PlanarImage::from_raster(&raster).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedChannelCount(2)));
    }
}
