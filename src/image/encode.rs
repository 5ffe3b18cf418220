// Lossless PNG encoding of BGRA8 pixel buffers via the `image` crate.
//
// Only the channel order changes (BGRA -> RGBA); no color-space conversion,
// no alpha premultiplication.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use tracing::{instrument, Level};

use super::PixelBuffer;
use crate::config::PngCompression;
use crate::error::{Error, Result};

impl PngCompression {
    fn encoder_settings(self) -> (CompressionType, FilterType) {
        match self {
            Self::Fast => (CompressionType::Fast, FilterType::Sub),
            Self::Default => (CompressionType::Default, FilterType::Adaptive),
            Self::Best => (CompressionType::Best, FilterType::Adaptive),
        }
    }
}

/// Encode tightly packed RGBA8 pixels as a PNG stream.
pub(crate) fn encode_rgba<W: Write>(
    writer: W,
    rgba: &[u8],
    width: u32,
    height: u32,
    compression: PngCompression,
) -> Result<()> {
    let (compression_type, filter) = compression.encoder_settings();
    PngEncoder::new_with_quality(writer, compression_type, filter)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(Error::EncodeFailed)
}

/// Encode a BGRA8 buffer (any row pitch) as a PNG stream.
///
/// On failure the stream contents are unspecified.
pub fn encode_bgra_to_png<W: Write>(
    buffer: &PixelBuffer,
    writer: W,
    compression: PngCompression,
) -> Result<()> {
    let rgba = buffer.to_rgba();
    encode_rgba(writer, &rgba, buffer.width(), buffer.height(), compression)
}

/// Encode a BGRA8 buffer to a PNG file, truncating any existing file.
///
/// The file is flushed and closed before returning, so it can be read back immediately.
#[instrument(level = Level::DEBUG, skip(buffer), fields(size = ?buffer.size()), err)]
pub fn save_png(buffer: &PixelBuffer, path: &Path, compression: PngCompression) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    encode_bgra_to_png(buffer, &mut writer, compression)?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 0xFF } else { 0x00 };
                // Distinct B and R so a missed channel swap shows up.
                data.extend_from_slice(&[v, 0x40, 0x10, 0xFF]);
            }
        }
        PixelBuffer::from_packed(data, width, height).unwrap()
    }

    #[test]
    fn encodes_valid_png_with_rgba_channels() {
        let buffer = checkerboard(4, 3);
        let mut png = Vec::new();
        encode_bgra_to_png(&buffer, &mut png, PngCompression::Fast).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [0x10, 0x40, 0xFF, 0xFF]);
        assert_eq!(decoded.get_pixel(1, 0).0, [0x10, 0x40, 0x00, 0xFF]);
    }

    #[test]
    fn encodes_from_pitched_rows() {
        let packed = checkerboard(5, 2);
        let mut source = Vec::new();
        for row in packed.rows() {
            source.extend_from_slice(row);
            source.extend_from_slice(&[0xAB; 12]);
        }
        let pitched = PixelBuffer::from_pitched(&source, 5, 2, 32).unwrap();

        let mut from_packed = Vec::new();
        let mut from_pitched = Vec::new();
        encode_bgra_to_png(&packed, &mut from_packed, PngCompression::Default).unwrap();
        encode_bgra_to_png(&pitched, &mut from_pitched, PngCompression::Default).unwrap();

        assert_eq!(from_packed, from_pitched);
    }

    #[test]
    fn alpha_is_not_premultiplied() {
        let buffer = PixelBuffer::from_packed(vec![200, 100, 50, 128], 1, 1).unwrap();
        let mut png = Vec::new();
        encode_bgra_to_png(&buffer, &mut png, PngCompression::Best).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [50, 100, 200, 128]);
    }

    #[test]
    fn empty_image_fails_to_encode() {
        let buffer = PixelBuffer::from_packed(Vec::new(), 0, 0).unwrap();
        let err = encode_bgra_to_png(&buffer, Vec::new(), PngCompression::Fast).unwrap_err();
        assert!(matches!(err, Error::EncodeFailed(_)), "{err}");
    }

    #[test]
    fn save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        save_png(&checkerboard(6, 6), &path, PngCompression::Fast).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 6));
    }
}
