//! Image decoding

use anyhow::{Context, Result};
use imageproc::image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

/// Decode the primary image of a HEIF/HEIC container to 8-bit RGB.
///
/// Alpha is dropped by libheif; JPEG has nowhere to put it.
pub fn decode_heic(data: &[u8]) -> Result<DynamicImage> {
    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).context("Failed to read HEIF container")?;
    let handle = ctx
        .primary_image_handle()
        .context("HEIF container has no primary image")?;

    log::debug!(
        "Decoding primary image {}x{} (alpha: {})",
        handle.width(),
        handle.height(),
        handle.has_alpha_channel()
    );

    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .context("Failed to decode HEIF image")?;

    let planes = image.planes();
    let plane = planes
        .interleaved
        .context("Decoded HEIF image has no interleaved RGB plane")?;

    let rgb = interleaved_to_rgb(plane.data, plane.width, plane.height, plane.stride)?;
    Ok(DynamicImage::ImageRgb8(rgb))
}

/// Copy a strided RGB plane into a tightly packed buffer
fn interleaved_to_rgb(data: &[u8], width: u32, height: u32, stride: usize) -> Result<RgbImage> {
    let row_len = width as usize * 3;
    anyhow::ensure!(
        stride >= row_len,
        "Plane stride {stride} is shorter than a {width}px RGB row"
    );

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        let row = data
            .get(start..start + row_len)
            .with_context(|| format!("Plane data ends before row {y}"))?;
        pixels.extend_from_slice(row);
    }

    RgbImage::from_raw(width, height, pixels).context("Failed to build RGB image from plane")
}

#[cfg(test)]
mod tests {
    use super::*;
    use libheif_rs::{Channel, CompressionFormat, Image};

    /// Build a small HEIF in memory with whichever encoder plugin libheif ships
    fn heif_fixture(width: u32, height: u32) -> Vec<u8> {
        let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::C444)).unwrap();
        for channel in [Channel::R, Channel::G, Channel::B] {
            image.create_plane(channel, width, height, 8).unwrap();
        }

        let planes = image.planes_mut();
        for (plane, value) in [(planes.r, 200u8), (planes.g, 120), (planes.b, 40)] {
            let data = plane.unwrap().data;
            data.fill(value);
        }

        let lib_heif = LibHeif::new();
        let mut encoder = [
            CompressionFormat::Hevc,
            CompressionFormat::Av1,
            CompressionFormat::Jpeg,
        ]
        .into_iter()
        .find_map(|format| lib_heif.encoder_for_format(format).ok())
        .expect("libheif was built without any encoder plugin");

        let mut ctx = HeifContext::new().unwrap();
        ctx.encode_image(&image, &mut encoder, None).unwrap();
        ctx.write_to_bytes().unwrap()
    }

    #[test]
    fn decodes_real_heif() {
        let data = heif_fixture(64, 48);

        let img = decode_heic(&data).unwrap();

        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 48);
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn packs_padded_rows() {
        // 2x2 image, each row padded to 8 bytes
        let data = [
            1, 2, 3, 4, 5, 6, 0, 0, //
            7, 8, 9, 10, 11, 12, 0, 0,
        ];
        let img = interleaved_to_rgb(&data, 2, 2, 8).unwrap();

        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.as_raw(), &vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn last_row_may_omit_padding() {
        let data = [1, 2, 3, 0, 4, 5, 6];
        let img = interleaved_to_rgb(&data, 1, 2, 4).unwrap();

        assert_eq!(img.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn truncated_plane_is_an_error() {
        let data = [1, 2, 3, 4, 5, 6];
        assert!(interleaved_to_rgb(&data, 2, 2, 6).is_err());
        assert!(interleaved_to_rgb(&data, 2, 1, 3).is_err());
    }

    #[test]
    fn garbage_is_not_heif() {
        assert!(decode_heic(b"definitely not an image").is_err());
        assert!(decode_heic(&[]).is_err());
    }
}
