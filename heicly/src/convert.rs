//! HEIC to JPEG conversion

use anyhow::{Context, Result};
use imageproc::image::DynamicImage;

use std::fs;
use std::path::{Path, PathBuf};

use crate::filename::allowed_file;
use crate::image::{self, JPEG_EXTENSION};

/// Quality used when none is configured
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Turns encoded source bytes into pixels
pub type DecodeFn = fn(&[u8]) -> Result<DynamicImage>;

#[derive(Debug, Clone, Copy)]
pub struct Converter {
    quality: u8,
    decode: DecodeFn,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            decode: image::decode_heic,
        }
    }
}

impl Converter {
    pub fn new(quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            anyhow::bail!("Quality must be between 1 and 100");
        }

        Ok(Self {
            quality,
            ..Self::default()
        })
    }

    /// Swap the decoder, e.g. to feed the converter something other than HEIC
    pub fn with_decoder(self, decode: DecodeFn) -> Self {
        Self { decode, ..self }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn convert_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let img = (self.decode)(data)?;
        image::encode_jpeg(&img, self.quality)
    }

    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        let data =
            fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
        let jpeg = self
            .convert_bytes(&data)
            .with_context(|| format!("Failed to convert {}", input.display()))?;
        fs::write(output, jpeg).with_context(|| format!("Failed to write {}", output.display()))?;

        log::info!("Converted: {} -> {}", input.display(), output.display());
        Ok(())
    }

    /// Convert every HEIC file in `inputs` into `output_dir`, skipping the ones that fail.
    ///
    /// Returns the paths that were written. Errors only if nothing could be converted.
    pub fn convert_files(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>> {
        log::debug!("Converting {} files into {}", inputs.len(), output_dir.display());

        let converted: Vec<PathBuf> = inputs
            .iter()
            .filter(|input| {
                let name = input.file_name().unwrap_or_default().to_string_lossy();
                let allowed = allowed_file(&name);
                if !allowed {
                    log::warn!("Skipping {}: not a HEIC file", input.display());
                }
                allowed
            })
            .filter_map(|input| {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let output = output_dir.join(format!("{stem}.{JPEG_EXTENSION}"));

                match self.convert_file(input, &output) {
                    Ok(()) => Some(output),
                    Err(e) => {
                        log::warn!("Failed to convert {}: {:#}", input.display(), e);
                        None
                    }
                }
            })
            .collect();

        log::debug!("Converted {} of {} files", converted.len(), inputs.len());

        if converted.is_empty() {
            anyhow::bail!("No images were converted");
        }

        Ok(converted)
    }
}
