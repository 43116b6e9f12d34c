//! Writing rendered images to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::renderer::ImageBuffer;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("unsupported output format '{0}' (expected .png or .ppm)")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Save as an 8-bit gamma-corrected PNG.
pub fn save_png(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    image::save_buffer(
        path.as_ref(),
        &image.to_rgba(),
        image.width,
        image.height,
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

/// Save as a binary (P6) PPM.
pub fn save_ppm(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_ppm(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Encode a binary PPM into any writer.
pub fn write_ppm<W: Write>(image: &ImageBuffer, writer: &mut W) -> std::io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", image.width, image.height)?;
    writer.write_all(&image.to_rgb())
}

/// Save in the format implied by the file extension.
pub fn save_image(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => save_png(image, path)?,
        "ppm" => save_ppm(image, path)?,
        other => return Err(OutputError::UnsupportedFormat(other.to_string())),
    }

    log::info!("Wrote {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Color;
    use tempfile::tempdir;

    fn checker() -> ImageBuffer {
        let mut image = ImageBuffer::new(2, 2);
        image.set(0, 0, Color::ONE);
        image.set(1, 1, Color::new(0.25, 0.0, 1.0));
        image
    }

    #[test]
    fn test_write_ppm() {
        let mut bytes = Vec::new();
        write_ppm(&checker(), &mut bytes).unwrap();

        let header = b"P6\n2 2\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(
            &bytes[header.len()..],
            &[255, 255, 255, 0, 0, 0, 0, 0, 0, 127, 0, 255]
        );
    }

    #[test]
    fn test_save_png_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(&checker(), &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [127, 0, 255, 255]);
    }

    #[test]
    fn test_save_ppm_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.PPM");
        save_image(&checker(), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap().len(), 11 + 12);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let err = save_image(&checker(), dir.path().join("out.exr")).unwrap_err();
        assert!(matches!(err, OutputError::UnsupportedFormat(ref ext) if ext == "exr"));
    }
}
