//! # Output Sinks
//!
//! Destinations for encoded outputs. A batch hands every finished artifact or
//! page to a sink as `(name, png_bytes)`; how the sink stores or packages them
//! is up to the sink.

use image::{ImageEncoder, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CertmergeError;

/// Receives named, encoded outputs.
pub trait OutputSink {
    fn accept(&mut self, name: &str, png: &[u8]) -> Result<(), CertmergeError>;
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CertmergeError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e: image::ImageError| {
            CertmergeError::Image(format!("Failed to encode PNG: {}", e))
        })?;
    Ok(png_bytes)
}

/// Make an identifier safe to use as a file name component.
pub fn safe_name(id: &str) -> String {
    id.replace(['/', '\\'], "_")
}

/// Writes each output to a file in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Use `dir`, creating it if necessary.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, CertmergeError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DirectorySink {
    fn accept(&mut self, name: &str, png: &[u8]) -> Result<(), CertmergeError> {
        fs::write(self.dir.join(name), png)?;
        Ok(())
    }
}

/// Keeps outputs in memory, in the order they arrived.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub outputs: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.outputs.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl OutputSink for MemorySink {
    fn accept(&mut self, name: &str, png: &[u8]) -> Result<(), CertmergeError> {
        self.outputs.push((name.to_string(), png.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("a/b\\c"), "a_b_c");
        assert_eq!(safe_name("王小明"), "王小明");
    }

    #[test]
    fn test_encode_png_decodes_back() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.accept("b.png", &[1]).unwrap();
        sink.accept("a.png", &[2]).unwrap();
        assert_eq!(sink.names(), vec!["b.png", "a.png"]);
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = std::env::temp_dir().join(format!("certmerge-sink-{}", std::process::id()));
        let mut sink = DirectorySink::create(&dir).unwrap();
        sink.accept("one.png", b"data").unwrap();
        assert_eq!(fs::read(dir.join("one.png")).unwrap(), b"data");
        fs::remove_dir_all(&dir).unwrap();
    }
}
