//! A CPU drawing surface over a premultiplied RGBA buffer.
//!
//! Discs and lines are anti-aliased by pixel-center distance: coverage falls
//! from 1 to 0 across the one-pixel band straddling the shape edge. Every
//! draw is composited source-over, like a canvas 2D context.

use ambient_field_core::{FieldError, Rgba, Size, Surface};
use glam::DVec2;

/// Premultiplied RGBA pixel, channels in [0, 1].
type Pixel = [f64; 4];

#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    data: Vec<Pixel>,
}

impl RasterSurface {
    /// Creates a transparent surface.
    ///
    /// Returns `FieldError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(FieldError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![[0.0; 4]; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major premultiplied pixels.
    pub fn data(&self) -> &[[f64; 4]] {
        &self.data
    }

    /// Straight-alpha color at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, a] = self.data[y * self.width + x];
        if a <= 0.0 {
            return Some(Rgba::TRANSPARENT);
        }
        Some(Rgba {
            r: r / a,
            g: g / a,
            b: b / a,
            a,
        })
    }

    /// Pixel index range covering `[lo, hi]` on an axis of `extent` pixels.
    fn span(lo: f64, hi: f64, extent: usize) -> std::ops::Range<usize> {
        let start = lo.floor().max(0.0);
        let end = (hi.ceil() + 1.0).min(extent as f64);
        if end <= start {
            return 0..0;
        }
        start as usize..end as usize
    }

    /// Runs `coverage` over every pixel center in the box and blends `color`
    /// weighted by the result.
    fn shade(
        &mut self,
        min: DVec2,
        max: DVec2,
        color: Rgba,
        coverage: impl Fn(DVec2) -> f64,
    ) {
        if color.a <= 0.0 {
            return;
        }
        for y in Self::span(min.y, max.y, self.height) {
            for x in Self::span(min.x, max.x, self.width) {
                let c = coverage(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
                if c > 0.0 {
                    blend(&mut self.data[y * self.width + x], color, c);
                }
            }
        }
    }
}

/// Source-over compositing of `color` at `coverage` onto a premultiplied pixel.
fn blend(dst: &mut Pixel, color: Rgba, coverage: f64) {
    let a = (color.a * coverage).clamp(0.0, 1.0);
    let src = [color.r * a, color.g * a, color.b * a, a];
    for (d, s) in dst.iter_mut().zip(src) {
        *d = s + *d * (1.0 - a);
    }
}

/// Distance from `p` to the segment `a..b`.
fn segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl Surface for RasterSurface {
    fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        self.data.fill([0.0; 4]);
        Ok(())
    }

    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba) -> Result<(), FieldError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(FieldError::Surface(format!(
                "disc radius must be finite and non-negative, got {radius}"
            )));
        }
        if !center.is_finite() {
            return Ok(());
        }
        let reach = DVec2::splat(radius + 1.0);
        self.shade(center - reach, center + reach, color, |p| {
            (radius + 0.5 - p.distance(center)).clamp(0.0, 1.0)
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
        if !width.is_finite() || width <= 0.0 {
            return Err(FieldError::Surface(format!(
                "line width must be finite and positive, got {width}"
            )));
        }
        if !from.is_finite() || !to.is_finite() {
            return Ok(());
        }
        let half = width / 2.0;
        let reach = DVec2::splat(half + 1.0);
        self.shade(from.min(to) - reach, from.max(to) + reach, color, |p| {
            (half + 0.5 - segment_distance(p, from, to)).clamp(0.0, 1.0)
        });
        Ok(())
    }
}
