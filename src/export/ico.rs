//! Multi-resolution `.ico` container with PNG-compressed entries.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! header   reserved u16 = 0, type u16 = 1, count u16
//! entry    width u8, height u8 (0 = 256), colors u8 = 0, reserved u8 = 0,
//!          planes u16 = 1, bpp u16 = 32, size u32, offset u32
//! data     PNG streams in entry order
//! ```

use crate::error::{Error, Result};

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const MAX_DIMENSION: u32 = 256;

/// One PNG-encoded image destined for the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcoEntry {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl IcoEntry {
    pub fn new(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self { width, height, png }
    }
}

/// Assembles the container bytes.
pub fn encode_ico(entries: &[IcoEntry]) -> Result<Vec<u8>> {
    if entries.is_empty() {
        return Err(Error::IconContainer("no images".into()));
    }
    let count = u16::try_from(entries.len())
        .map_err(|_| Error::IconContainer(format!("{} images", entries.len())))?;

    let data_len: usize = entries.iter().map(|e| e.png.len()).sum();
    let mut out = Vec::with_capacity(HEADER_LEN + ENTRY_LEN * entries.len() + data_len);

    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = HEADER_LEN + ENTRY_LEN * entries.len();
    for entry in entries {
        let len = u32::try_from(entry.png.len())
            .map_err(|_| Error::IconContainer("image data too large".into()))?;
        let start = u32::try_from(offset)
            .map_err(|_| Error::IconContainer("container too large".into()))?;

        out.push(dimension_byte(entry.width)?);
        out.push(dimension_byte(entry.height)?);
        out.push(0);
        out.push(0);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&start.to_le_bytes());

        offset += entry.png.len();
    }

    for entry in entries {
        out.extend_from_slice(&entry.png);
    }

    Ok(out)
}

fn dimension_byte(value: u32) -> Result<u8> {
    match value {
        MAX_DIMENSION => Ok(0),
        1..MAX_DIMENSION => Ok(value as u8),
        _ => Err(Error::IconContainer(format!(
            "dimension {value} outside 1..=256"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterImage;
    use image::{ImageFormat, Rgba};

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn header_and_directory_layout() {
        let entries = vec![
            IcoEntry::new(16, 16, vec![1; 10]),
            IcoEntry::new(32, 32, vec![2; 20]),
            IcoEntry::new(256, 256, vec![3; 5]),
        ];
        let bytes = encode_ico(&entries).unwrap();

        assert_eq!(&bytes[..6], &[0, 0, 1, 0, 3, 0]);
        assert_eq!(bytes.len(), 6 + 3 * 16 + 35);

        // First entry.
        assert_eq!(&bytes[6..12], &[16, 16, 0, 0, 1, 0]);
        assert_eq!(&bytes[12..14], &[32, 0]);
        assert_eq!(le_u32(&bytes, 14), 10);
        assert_eq!(le_u32(&bytes, 18), 54);

        // Offsets accumulate after the directory.
        assert_eq!(le_u32(&bytes, 22 + 12), 64);
        assert_eq!(le_u32(&bytes, 38 + 12), 84);

        // 256 is written as 0.
        assert_eq!(&bytes[38..40], &[0, 0]);

        assert_eq!(&bytes[54..64], &[1; 10]);
        assert_eq!(&bytes[84..], &[3; 5]);
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(encode_ico(&[]).is_err());
        assert!(encode_ico(&[IcoEntry::new(512, 512, vec![0])]).is_err());
        assert!(encode_ico(&[IcoEntry::new(0, 16, vec![0])]).is_err());
    }

    #[test]
    fn standard_decoder_reads_container() {
        let entries: Vec<IcoEntry> = [16, 32, 48]
            .iter()
            .map(|&s| {
                let img = RasterImage::from_pixel(s, s, Rgba([0, 128, 255, 255]));
                IcoEntry::new(s, s, img.encode_png().unwrap())
            })
            .collect();
        let bytes = encode_ico(&entries).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Ico).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 48));
        assert_eq!(decoded.to_rgba8().get_pixel(10, 10).0, [0, 128, 255, 255]);
    }
}
