//! Image encoding: JPEG

use anyhow::{Context, Result};
use imageproc::image::{DynamicImage, GenericImageView};

/// Compress an image to JPEG format with the specified quality
pub fn compress_to_jpeg<W>(img: &DynamicImage, writer: &mut W, quality: u8) -> Result<()>
where
    W: std::io::Write,
{
    let mut encoder =
        imageproc::image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);

    encoder
        .encode_image(img)
        .with_context(|| "Failed to compress image to JPEG")?;

    Ok(())
}

/// Encode an image into an in-memory JPEG
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity(buffer_capacity(width, height));

    compress_to_jpeg(img, &mut buffer, quality)?;

    log::trace!("Encoded {width}x{height} JPEG, {} bytes", buffer.len());
    Ok(buffer)
}

/// One byte per pixel is a generous upper bound for a compressed JPEG
fn buffer_capacity(width: u32, height: u32) -> usize {
    width as usize * height as usize
}
