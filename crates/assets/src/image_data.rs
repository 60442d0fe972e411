use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AssetError;

/// Texture coordinate addressing outside `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Decoded RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// Decode an image file. The format is picked from the file contents.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        tracing::debug!(?path, "decoding image");
        let img = image::open(path).map_err(|e| AssetError::ImageDecode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::info!("loaded image {width}x{height} from {path:?}");
        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Decode an in-memory encoded image (PNG or JPEG).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::ImageDecode {
            path: "<memory>".into(),
            message: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    /// A single-color image.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Result<Self, AssetError> {
        let count = usize::try_from(u64::from(width) * u64::from(height))
            .ok()
            .filter(|n| n.checked_mul(color.len()).is_some_and(|b| b <= isize::MAX as usize))
            .ok_or(AssetError::ImageTooLarge { width, height })?;
        Ok(Self {
            pixels: color.repeat(count),
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fills_every_pixel() {
        let img = ImageData::solid(2, 3, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.pixels.len(), 2 * 3 * 4);
        assert!(img.pixels.chunks_exact(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn solid_rejects_sizes_past_the_address_space() {
        if usize::BITS == 64 {
            let err = ImageData::solid(u32::MAX, u32::MAX, [0; 4]).unwrap_err();
            assert!(matches!(
                err,
                AssetError::ImageTooLarge {
                    width: u32::MAX,
                    height: u32::MAX
                }
            ));
        }
        assert_eq!(ImageData::solid(0, 7, [1; 4]).unwrap().pixels.len(), 0);
    }

    #[test]
    fn decode_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let img = ImageData::from_file(&path).unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(&img.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = ImageData::from_file("does/not/exist.png").unwrap_err();
        assert!(matches!(err, AssetError::ImageDecode { .. }));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(ImageData::from_bytes(b"not an image").is_err());
    }

    #[test]
    fn wrap_mode_serializes_snake_case() {
        let mode: WrapMode = serde_json::from_str("\"mirrored_repeat\"").unwrap();
        assert_eq!(mode, WrapMode::MirroredRepeat);
        assert_eq!(
            serde_json::to_string(&WrapMode::ClampToEdge).unwrap(),
            "\"clamp_to_edge\""
        );
    }
}
