use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;
use thiserror::Error;

/// Compression errors. The ladder itself never fails to produce *some*
/// buffer; errors here mean the input could not be decoded or an encoder
/// rejected its input.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// One candidate setting in the compression ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionStep {
    /// JPEG quality (0-100).
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
}

/// Target byte budget plus the ordered ladder of candidates tried from
/// least- to most-aggressive. The ladder is plain data so the fallback
/// order is testable rather than implicit control flow.
#[derive(Debug, Clone)]
pub struct CompressionPolicy {
    pub target_bytes: usize,
    pub ladder: Vec<CompressionStep>,
}

impl CompressionPolicy {
    /// Default ladder: qualities 70..30 at full HD, then quality 60 at
    /// progressively smaller bounding boxes. The final step doubles as the
    /// best-effort fallback when nothing meets the budget.
    pub fn for_target(target_bytes: usize) -> Self {
        let mut ladder: Vec<CompressionStep> = [70u8, 60, 50, 40, 30]
            .iter()
            .map(|&quality| CompressionStep {
                quality,
                max_width: 1920,
                max_height: 1080,
            })
            .collect();

        for (max_width, max_height) in [(1440, 810), (1280, 720), (1024, 576)] {
            ladder.push(CompressionStep {
                quality: 60,
                max_width,
                max_height,
            });
        }

        ladder.push(CompressionStep {
            quality: 30,
            max_width: 1024,
            max_height: 576,
        });

        CompressionPolicy {
            target_bytes,
            ladder,
        }
    }
}

/// Main compression service.
pub struct ImageCompressor;

impl ImageCompressor {
    /// Compress `data` toward the policy's byte budget.
    ///
    /// Inputs already at or under the budget are returned untouched, format
    /// preserved. Otherwise the ladder is walked in order, re-encoding to
    /// JPEG at each step, and the first result at or under the budget wins.
    /// If no step satisfies the budget the result of the last (most
    /// aggressive) step is returned anyway; the caller's remote backend may
    /// still reject it, which is a recoverable upload error there.
    pub fn compress_to_limit(
        data: &[u8],
        policy: &CompressionPolicy,
    ) -> Result<Bytes, CompressError> {
        if data.len() <= policy.target_bytes {
            tracing::debug!(
                size_bytes = data.len(),
                target_bytes = policy.target_bytes,
                "Image already under target, skipping compression"
            );
            return Ok(Bytes::copy_from_slice(data));
        }

        let cursor = Cursor::new(data);
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .decode()?;

        let (width, height) = img.dimensions();
        tracing::debug!(
            width = width,
            height = height,
            size_bytes = data.len(),
            target_bytes = policy.target_bytes,
            "Compressing image through ladder"
        );

        let mut last = None;
        for step in &policy.ladder {
            let candidate = Self::encode_step(&img, *step)?;
            if candidate.len() <= policy.target_bytes {
                tracing::debug!(
                    quality = step.quality,
                    max_width = step.max_width,
                    max_height = step.max_height,
                    size_bytes = candidate.len(),
                    "Ladder step satisfied target"
                );
                return Ok(candidate);
            }
            last = Some(candidate);
        }

        // Best effort: return the most aggressive attempt even if oversized.
        // An empty ladder degenerates to the identity transform.
        match last {
            Some(fallback) => {
                tracing::warn!(
                    size_bytes = fallback.len(),
                    target_bytes = policy.target_bytes,
                    "No ladder step met the target, returning most aggressive result"
                );
                Ok(fallback)
            }
            None => Ok(Bytes::copy_from_slice(data)),
        }
    }

    /// Encode one ladder candidate: shrink into the step's bounding box
    /// (never enlarging) and re-encode as progressive JPEG.
    fn encode_step(img: &DynamicImage, step: CompressionStep) -> Result<Bytes, CompressError> {
        let (width, height) = img.dimensions();

        let resized = if width > step.max_width || height > step.max_height {
            img.resize(
                step.max_width,
                step.max_height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            img.clone()
        };

        Self::encode_jpeg(&resized, step.quality)
    }

    /// Encode to JPEG via mozjpeg with progressive mode and optimized coding.
    fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, CompressError> {
        let rgb_img = img.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        comp.set_size(width as usize, height as usize);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| CompressError::Encode(e.to_string()))?;
        comp.write_scanlines(&rgb_img)
            .map_err(|e| CompressError::Encode(e.to_string()))?;
        let jpeg_data = comp
            .finish()
            .map_err(|e| CompressError::Encode(e.to_string()))?;

        Ok(Bytes::from(jpeg_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Gradient image: compresses well as JPEG, unlike a flat fill.
    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x % 256) as u8,
                (y % 256) as u8,
                ((x + y) % 256) as u8,
            ])
        })
    }

    /// Noise image: near-incompressible as PNG, so a large one always
    /// exceeds a multi-megabyte budget and enters the ladder.
    fn noise_image(width: u32, height: u32) -> RgbImage {
        let mut state = 0x9e37_79b9u32;
        RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Rgb([
                (state & 0xff) as u8,
                ((state >> 8) & 0xff) as u8,
                ((state >> 16) & 0xff) as u8,
            ])
        })
    }

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buffer
    }

    fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap();
        img.dimensions()
    }

    #[test]
    fn input_under_target_is_identity() {
        let png = encode_png(&gradient_image(64, 64));
        let policy = CompressionPolicy::for_target(png.len() + 1);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        assert_eq!(out.as_ref(), png.as_slice());
        // Format untouched too: still a PNG.
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn oversized_input_is_compressed_under_target() {
        let png = encode_png(&gradient_image(512, 512));
        let target = png.len() / 4;
        let policy = CompressionPolicy::for_target(target);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        assert!(out.len() <= target, "{} > {}", out.len(), target);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn full_quality_ladder_bounds_dimensions_to_full_hd() {
        // ~10 MB of raw noise against a 4 MB budget: the input is over
        // budget, and a 2-megapixel JPEG fits 4 MB at every quality in the
        // primary ladder, so the result comes from the full-HD box.
        let png = encode_png(&noise_image(2400, 1400));
        let target = 4 * 1024 * 1024;
        assert!(png.len() > target);
        let policy = CompressionPolicy::for_target(target);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        assert!(out.len() <= target, "{} > {}", out.len(), target);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);

        let (w, h) = decoded_dimensions(&out);
        assert!(w <= 1920, "{}", w);
        assert_eq!(h, 1080);
        let ratio = w as f64 / h as f64;
        assert!((ratio - 2400.0 / 1400.0).abs() < 0.02);
    }

    #[test]
    fn small_image_is_never_enlarged() {
        let png = encode_png(&gradient_image(100, 80));
        // Unsatisfiable budget: forces the full ladder including the
        // smallest bounding box, which must still not enlarge 100x80.
        let policy = CompressionPolicy::for_target(1);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        assert_eq!(decoded_dimensions(&out), (100, 80));
    }

    #[test]
    fn large_image_shrinks_within_bounding_box() {
        let png = encode_png(&gradient_image(2500, 1500));
        let policy = CompressionPolicy::for_target(1);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        let (w, h) = decoded_dimensions(&out);
        assert!(w <= 1024 && h <= 576, "{}x{}", w, h);
        // Aspect ratio preserved by fit-inside resize.
        let ratio = w as f64 / h as f64;
        assert!((ratio - 2500.0 / 1500.0).abs() < 0.02);
    }

    #[test]
    fn unsatisfiable_budget_still_returns_a_buffer() {
        let png = encode_png(&gradient_image(256, 256));
        let policy = CompressionPolicy::for_target(1);

        let out = ImageCompressor::compress_to_limit(&png, &policy).unwrap();
        assert!(!out.is_empty());
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        let policy = CompressionPolicy::for_target(1);
        let result = ImageCompressor::compress_to_limit(b"not an image", &policy);
        assert!(matches!(result, Err(CompressError::Decode(_))));
    }

    #[test]
    fn default_ladder_orders_least_to_most_aggressive() {
        let policy = CompressionPolicy::for_target(1024);
        assert_eq!(
            policy.ladder.first(),
            Some(&CompressionStep {
                quality: 70,
                max_width: 1920,
                max_height: 1080
            })
        );
        assert_eq!(
            policy.ladder.last(),
            Some(&CompressionStep {
                quality: 30,
                max_width: 1024,
                max_height: 576
            })
        );
    }
}
