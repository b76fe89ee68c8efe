use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use tracing::{debug, warn};

use super::PendingFile;
use crate::config::AssetConfig;

pub const DEFAULT_MAX_DIMENSION: u32 = 1200;
pub const DEFAULT_QUALITY: u8 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u8,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl From<&AssetConfig> for OptimizeOptions {
    fn from(config: &AssetConfig) -> Self {
        Self {
            max_width: config.max_dimension,
            max_height: config.max_dimension,
            quality: config.jpeg_quality.clamp(1, 100),
        }
    }
}

/// Bytes ready for upload
#[derive(Debug, Clone)]
pub struct Optimized {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub extension: String,
}

/// Scales `(width, height)` down so neither side exceeds its bound.
///
/// Width is clamped first, then height, each step rounding the other side to
/// the nearest pixel. Images already within bounds are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);

    if w > max_width as f64 {
        h = (h * max_width as f64 / w).round();
        w = max_width as f64;
    }

    if h > max_height as f64 {
        w = (w * max_height as f64 / h).round();
        h = max_height as f64;
    }

    ((w as u32).max(1), (h as u32).max(1))
}

fn passthrough(file: &PendingFile) -> Optimized {
    Optimized {
        bytes: file.bytes.clone(),
        mime: file.mime.clone(),
        extension: file.extension(),
    }
}

/// Downscales and re-encodes an image. Non-image files pass through as-is.
///
/// PNG stays PNG; every other decodable format is written as JPEG at the
/// configured quality. Bytes that claim to be an image but cannot be decoded
/// are passed through with a warning.
pub fn optimize(file: &PendingFile, options: &OptimizeOptions) -> Optimized {
    if !file.is_image() {
        return passthrough(file);
    }

    let decoded = image::guess_format(&file.bytes)
        .and_then(|format| image::load_from_memory_with_format(&file.bytes, format).map(|img| (format, img)));

    let (format, img) = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Could not decode {} ({}), uploading original bytes: {}", file.name, file.mime, e);
            return passthrough(file);
        }
    };

    let (w, h) = fit_within(img.width(), img.height(), options.max_width, options.max_height);
    let img = if (w, h) != (img.width(), img.height()) {
        debug!("Resizing {} from {}x{} to {}x{}", file.name, img.width(), img.height(), w, h);
        img.resize_exact(w, h, FilterType::Lanczos3)
    } else {
        img
    };

    let encoded = match format {
        ImageFormat::Png => encode_png(&img).map(|bytes| Optimized {
            bytes,
            mime: "image/png".to_string(),
            extension: "png".to_string(),
        }),
        _ => encode_jpeg(&img, options.quality).map(|bytes| Optimized {
            bytes,
            mime: "image/jpeg".to_string(),
            extension: "jpg".to_string(),
        }),
    };

    encoded.unwrap_or_else(|e| {
        warn!("Could not re-encode {}, uploading original bytes: {}", file.name, e);
        passthrough(file)
    })
}

fn encode_png(img: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png)?;
    Ok(out.into_inner())
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> image::ImageResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{jpeg_bytes, png_bytes};

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(2400, 1600, 1200, 1200), (1200, 800));
        assert_eq!(fit_within(1000, 3000, 1200, 1200), (400, 1200));
        assert_eq!(fit_within(800, 600, 1200, 1200), (800, 600));
        assert_eq!(fit_within(3000, 2999, 1200, 1200), (1200, 1200));
    }

    #[test]
    fn large_jpeg_is_downscaled() {
        let file = PendingFile::new(jpeg_bytes(1800, 900), "image/jpeg", "wide.jpeg");
        let out = optimize(&file, &OptimizeOptions::default());
        let img = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 600));
        assert_eq!(out.mime, "image/jpeg");
        assert_eq!(out.extension, "jpg");
    }

    #[test]
    fn png_stays_png() {
        let file = PendingFile::new(png_bytes(1300, 100), "image/png", "banner.png");
        let out = optimize(&file, &OptimizeOptions::default());
        assert_eq!(out.mime, "image/png");
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn non_image_passes_through() {
        let file = PendingFile::new(b"%PDF-1.4".to_vec(), "application/pdf", "menu.pdf");
        let out = optimize(&file, &OptimizeOptions::default());
        assert_eq!(out.bytes, b"%PDF-1.4");
        assert_eq!(out.extension, "pdf");
    }

    #[test]
    fn undecodable_image_passes_through() {
        let file = PendingFile::new(b"not really a png".to_vec(), "image/png", "broken.png");
        let out = optimize(&file, &OptimizeOptions::default());
        assert_eq!(out.bytes, b"not really a png");
        assert_eq!(out.mime, "image/png");
    }
}
