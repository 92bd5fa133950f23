//! A decoded FER2013 dataset row.

use anyhow::{bail, Result};
use image::{GrayImage, Luma};

use super::Emotion;

/// FER2013 images are 48x48 grayscale.
pub const IMAGE_SIZE: u32 = 48;

/// Pixel count per image.
pub const PIXELS_PER_IMAGE: usize = (IMAGE_SIZE * IMAGE_SIZE) as usize;

/// One labeled FER2013 sample with its decoded pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSample {
    /// Emotion label.
    pub emotion: Emotion,
    /// Row-major 48x48 grayscale pixels.
    pixels: Vec<u8>,
}

impl PixelSample {
    /// Parses a raw dataset row into a sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the emotion id is outside 0-6, the pixel string
    /// does not hold exactly 2304 values, or any value is outside 0-255.
    /// Malformed rows are fatal; only no-face images are skippable.
    pub fn parse(emotion_id: u8, pixels: &str) -> Result<Self> {
        let Some(emotion) = Emotion::from_id(emotion_id) else {
            bail!("invalid emotion id {emotion_id}, expected 0-6");
        };

        let mut decoded = Vec::with_capacity(PIXELS_PER_IMAGE);
        for token in pixels.split_ascii_whitespace() {
            let value: u32 = token
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid pixel value '{token}'"))?;
            if value > 255 {
                bail!("pixel value {value} out of range 0-255");
            }
            decoded.push(value as u8);
        }

        if decoded.len() != PIXELS_PER_IMAGE {
            bail!(
                "expected {PIXELS_PER_IMAGE} pixels for a {IMAGE_SIZE}x{IMAGE_SIZE} image, got {}",
                decoded.len()
            );
        }

        Ok(Self {
            emotion,
            pixels: decoded,
        })
    }

    /// Returns the raw pixel buffer.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reassembles the 48x48 grayscale image, row-major.
    #[must_use]
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |x, y| {
            Luma([self.pixels[(y * IMAGE_SIZE + x) as usize]])
        })
    }
}
