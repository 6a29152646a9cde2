use std::path::{Path, PathBuf};

use base64::Engine as _;
use image::{ImageReader, RgbaImage};
use thiserror::Error;

use super::source_locator::{validate_source_locator, SourceLocatorError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid source locator \"{locator}\": {source}")]
    InvalidLocator {
        locator: String,
        #[source]
        source: SourceLocatorError,
    },
    #[error("malformed data url: {reason}")]
    MalformedDataUrl { reason: &'static str },
    #[error("failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image loader panicked")]
    LoaderPanicked,
}

/// Decodes an image named by a source string. Called from worker threads.
pub trait ImageLoader: Send + Sync {
    fn load(&self, src: &str) -> Result<RgbaImage, LoadError>;
}

/// Loads `data:` URLs in place and everything else as a file below `root`.
#[derive(Debug, Clone)]
pub struct FileImageLoader {
    root: PathBuf,
}

impl Default for FileImageLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, locator: &str) -> Result<PathBuf, LoadError> {
        validate_source_locator(locator).map_err(|source| LoadError::InvalidLocator {
            locator: locator.to_string(),
            source,
        })?;
        Ok(self.root.join(locator))
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, src: &str) -> Result<RgbaImage, LoadError> {
        if let Some(rest) = src.strip_prefix("data:") {
            let bytes = decode_data_url_payload(rest)?;
            return Ok(image::load_from_memory(&bytes)?.to_rgba8());
        }

        let path = self.resolve(src)?;
        let reader = ImageReader::open(&path).map_err(|source| LoadError::Open {
            path: path.clone(),
            source,
        })?;
        let decoded = reader.with_guessed_format().map_err(|source| LoadError::Open {
            path,
            source,
        })?;
        Ok(decoded.decode()?.to_rgba8())
    }
}

/// `rest` is everything after `data:`; only base64 payloads are accepted.
fn decode_data_url_payload(rest: &str) -> Result<Vec<u8>, LoadError> {
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(LoadError::MalformedDataUrl {
            reason: "missing ','",
        });
    };
    if !header.ends_with(";base64") {
        return Err(LoadError::MalformedDataUrl {
            reason: "payload is not base64",
        });
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::encode_png_data_url;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .expect("write png");
    }

    #[test]
    fn loads_png_relative_to_root() {
        let temp = TempDir::new().expect("temp dir");
        write_png(temp.path(), "sprites/hero.png", 3, 2);
        let loader = FileImageLoader::new(temp.path());
        let image = loader.load("sprites/hero.png").expect("load");
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let temp = TempDir::new().expect("temp dir");
        let loader = FileImageLoader::new(temp.path());
        assert!(matches!(
            loader.load("nope.png"),
            Err(LoadError::Open { .. })
        ));
    }

    #[test]
    fn traversal_is_rejected_before_touching_disk() {
        let loader = FileImageLoader::default();
        assert!(matches!(
            loader.load("../secret.png"),
            Err(LoadError::InvalidLocator {
                source: SourceLocatorError::ParentTraversal,
                ..
            })
        ));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("bad.png"), b"not an image").expect("write");
        let loader = FileImageLoader::new(temp.path());
        assert!(loader.load("bad.png").is_err());
    }

    #[test]
    fn data_url_is_decoded_in_place() {
        let source = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let url = encode_png_data_url(&source).expect("encode");
        let loaded = FileImageLoader::default().load(&url).expect("load");
        assert_eq!(loaded, source);
    }

    #[test]
    fn non_base64_data_url_is_rejected() {
        assert!(matches!(
            FileImageLoader::default().load("data:text/plain,hello"),
            Err(LoadError::MalformedDataUrl { .. })
        ));
    }
}
