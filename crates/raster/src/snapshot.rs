//! PNG output of a [`RasterSurface`].
//!
//! Feature-gated behind `png` (default on) so byte-only users can skip the
//! `image` crate. The pixel conversion itself lives in [`crate::pixel`].

use ambient_field_core::{FieldError, Rgba};
use std::path::Path;

use crate::buffer::RasterSurface;
use crate::pixel::to_rgba8;

/// Writes the surface as a PNG, composited over `background` if given.
///
/// Returns `FieldError::InvalidDimensions` if the surface dimensions overflow
/// `u32`, or `FieldError::Io` on write failure.
pub fn write_png(
    surface: &RasterSurface,
    background: Option<Rgba>,
    path: &Path,
) -> Result<(), FieldError> {
    let rgba = to_rgba8(surface, background);
    let w = u32::try_from(surface.width()).map_err(|_| FieldError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| FieldError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FieldError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), width = w, height = h, "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambient_field_core::Surface;
    use glam::DVec2;

    #[test]
    fn write_png_round_trip() {
        let mut surface = RasterSurface::new(16, 12).unwrap();
        surface
            .fill_disc(DVec2::new(8.0, 6.0), 3.0, Rgba::WHITE)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.png");

        write_png(&surface, Some(Rgba::from_rgba8(0, 0, 0, 1.0)), &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(8, 6).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn write_png_reports_unwritable_path() {
        let surface = RasterSurface::new(4, 4).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("field.png");
        assert!(matches!(
            write_png(&surface, None, &path),
            Err(FieldError::Io(_))
        ));
    }
}
