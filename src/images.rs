//! Image intake
//!
//! Saves uploaded image bytes into the working directory and validates them
//! by file header before they are handed to the AI gateway. No resizing or
//! other transformation is applied, and no size ceiling is enforced.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Supported upload formats, detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
}

impl ImageFormat {
    /// Detect the format from a file header
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]) {
            return Some(ImageFormat::Png);
        }
        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            return Some(ImageFormat::Jpeg);
        }
        // GIF87a / GIF89a
        if bytes.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        // BMP: 42 4D
        if bytes.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        // WebP: RIFF ... WEBP
        if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && bytes[8..12] == *b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Saves and validates uploaded images under one directory
#[derive(Debug, Clone)]
pub struct ImageIntake {
    upload_dir: PathBuf,
}

impl ImageIntake {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Persist uploaded bytes under the given file name
    pub fn save_upload(&self, content: &[u8], filename: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.upload_dir)?;
        let path = self.upload_dir.join(filename);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Whether the file at `path` looks like a raster image
    pub fn validate_image(&self, path: &Path) -> bool {
        match fs::read(path) {
            Ok(bytes) => ImageFormat::detect(&bytes).is_some(),
            Err(e) => {
                warn!("Image validation failed for {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Best-effort removal of a stored file
    pub fn cleanup(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const JPEG_HEADER: [u8; 8] = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46];

    #[test]
    fn test_detect_known_formats() {
        assert_eq!(ImageFormat::detect(&JPEG_HEADER), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::detect(&[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"not an image"), None);
        assert_eq!(ImageFormat::detect(&[0xff]), None);
    }

    #[test]
    fn test_save_and_validate_round_trip() {
        let dir = tempdir().unwrap();
        let intake = ImageIntake::new(dir.path().join("uploads"));

        let path = intake.save_upload(&JPEG_HEADER, "essay.jpg").unwrap();
        assert!(path.exists());
        assert!(intake.validate_image(&path));

        let bad = intake.save_upload(b"plain text", "fake.jpg").unwrap();
        assert!(!intake.validate_image(&bad));

        intake.cleanup(&path);
        assert!(!path.exists());
    }
}
