//! Drawing surfaces.
//!
//! The field draws through the [`Surface`] trait, which covers the handful of
//! 2D primitives the effect needs. A browser canvas, the CPU rasterizer, and
//! the [`RecordingSurface`] used in tests all implement it.

use glam::DVec2;

use crate::color::Rgba;
use crate::error::FieldError;

/// Width and height of a surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width * height`.
    pub fn area(self) -> f64 {
        self.width * self.height
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Returns `self`, or `fallback` when `self` is degenerate.
    pub fn or_fallback(self, fallback: Size) -> Size {
        if self.is_degenerate() {
            fallback
        } else {
            self
        }
    }
}

/// A 2D drawing target.
///
/// This trait is object-safe; the field draws through `&mut dyn Surface`.
pub trait Surface {
    /// Current drawable size in pixels.
    fn size(&self) -> Size;

    /// Refits the surface to its host (for a page canvas, the window) before
    /// it is measured. Surfaces with a fixed size keep the default no-op.
    fn sync_size(&mut self) {}

    /// Clears every pixel to transparent.
    fn clear(&mut self) -> Result<(), FieldError>;

    /// Fills a disc with `color`, alpha-blended over existing content.
    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba) -> Result<(), FieldError>;

    /// Strokes a straight line segment.
    fn stroke_line(
        &mut self,
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    ) -> Result<(), FieldError>;
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Disc {
        center: DVec2,
        radius: f64,
        color: Rgba,
    },
    Line {
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    },
}

/// A surface that records every call instead of drawing.
///
/// `clear` discards previously recorded commands and then records itself,
/// so after a frame the list holds exactly that frame's calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Changes the reported size, as a window resize would.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded discs.
    pub fn disc_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Disc { .. }))
            .count()
    }

    /// Recorded lines as `(from, to, color)`.
    pub fn lines(&self) -> Vec<(DVec2, DVec2, Rgba)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, color, .. } => Some((*from, *to, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        Ok(())
    }

    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba) -> Result<(), FieldError> {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    ) -> Result<(), FieldError> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_area_and_degenerate_checks() {
        assert_eq!(Size::new(400.0, 300.0).area(), 120_000.0);
        assert!(Size::new(0.0, 300.0).is_degenerate());
        assert!(Size::new(400.0, 0.0).is_degenerate());
        assert!(Size::new(f64::NAN, 300.0).is_degenerate());
        assert!(Size::new(-1.0, 300.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
    }

    #[test]
    fn or_fallback_only_replaces_degenerate_sizes() {
        let fallback = Size::new(1920.0, 1080.0);
        assert_eq!(Size::new(0.0, 0.0).or_fallback(fallback), fallback);
        assert_eq!(
            Size::new(800.0, 600.0).or_fallback(fallback),
            Size::new(800.0, 600.0)
        );
    }

    #[test]
    fn recording_surface_records_calls_in_order() {
        let mut s = RecordingSurface::new(100.0, 50.0);
        s.fill_disc(DVec2::new(1.0, 2.0), 3.0, Rgba::WHITE).unwrap();
        s.stroke_line(DVec2::ZERO, DVec2::ONE, 1.0, Rgba::WHITE).unwrap();
        assert_eq!(s.commands().len(), 2);
        assert_eq!(s.disc_count(), 1);
        assert_eq!(s.lines().len(), 1);
    }

    #[test]
    fn clear_starts_a_new_frame() {
        let mut s = RecordingSurface::new(100.0, 50.0);
        s.fill_disc(DVec2::ZERO, 1.0, Rgba::WHITE).unwrap();
        s.clear().unwrap();
        assert_eq!(s.commands(), &[DrawCommand::Clear]);
    }

    #[test]
    fn surface_trait_is_object_safe() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        let dynamic: &mut dyn Surface = &mut s;
        dynamic.sync_size();
        assert_eq!(dynamic.size(), Size::new(10.0, 10.0));
    }
}
