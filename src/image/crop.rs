// Crop an encoded PNG file in place.
//
// The whole file is read into memory before anything is written back, so the
// source image is never truncated before it has been decoded.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{imageops, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, instrument, warn};

use super::encode::encode_rgba;
use crate::config::{PngCompression, SizeCheck};
use crate::error::{Error, Result};
use crate::geometry::Rect;

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|source| {
        Error::DecodeFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(image.into_rgba8())
}

/// Dimensions of the PNG at `path`, read from its header.
///
/// The file is always decoded as PNG, whatever its extension.
pub fn image_size(path: &Path) -> Result<(u32, u32)> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    ImageReader::with_format(BufReader::new(file), ImageFormat::Png)
        .into_dimensions()
        .map_err(|source| Error::DecodeFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Verify that the image at `path` is exactly `expected` pixels.
///
/// Under [`SizeCheck::Warn`] a disagreement is logged and `Ok` is returned.
#[instrument(skip(path), err)]
pub fn check_captured_size(path: &Path, expected: (u32, u32), policy: SizeCheck) -> Result<()> {
    let actual = image_size(path)?;
    if actual == expected {
        return Ok(());
    }

    match policy {
        SizeCheck::Strict => Err(Error::SizeMismatch { expected, actual }),
        SizeCheck::Warn => {
            warn!(
                "captured image is {}x{} but window bounds are {}x{}, cropping anyway",
                actual.0, actual.1, expected.0, expected.1
            );
            Ok(())
        }
    }
}

/// Replace the PNG at `path` with its `crop_rect` sub-rectangle.
///
/// Fails with [`Error::InvalidCropRect`] (file untouched) when the rectangle is empty
/// or reaches outside the image. Cropping to the full image leaves the file as is.
#[instrument(skip(path), fields(path = %path.display()), err)]
pub fn crop_image_file(path: &Path, crop_rect: Rect, compression: PngCompression) -> Result<()> {
    let source = load_rgba(path)?;
    let (width, height) = source.dimensions();

    if crop_rect.is_empty() || !crop_rect.fits_within(width, height) {
        return Err(Error::InvalidCropRect {
            rect: crop_rect,
            width,
            height,
        });
    }

    if crop_rect.size() == (width, height) {
        debug!("crop covers the whole {width}x{height} image, leaving file unchanged");
        return Ok(());
    }

    let cropped = imageops::crop_imm(
        &source,
        crop_rect.left() as u32,
        crop_rect.top() as u32,
        crop_rect.width(),
        crop_rect.height(),
    )
    .to_image();
    drop(source);

    let mut png = Vec::new();
    encode_rgba(
        &mut png,
        cropped.as_raw(),
        cropped.width(),
        cropped.height(),
        compression,
    )?;
    std::fs::write(path, png).map_err(|e| Error::io(path, e))?;
    Ok(())
}
