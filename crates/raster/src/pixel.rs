//! Conversion of a [`RasterSurface`] to an RGBA8 pixel buffer.
//!
//! Always available (no feature gate) so callers that only need bytes, such as
//! a test or an in-memory preview, do not pull in the `image` crate.

use ambient_field_core::Rgba;

use crate::buffer::RasterSurface;

/// Flattens the surface into straight-alpha RGBA8 bytes, row-major.
///
/// With a `background`, the surface is composited over it first. The
/// buffer length is `width * height * 4`.
pub fn to_rgba8(surface: &RasterSurface, background: Option<Rgba>) -> Vec<u8> {
    let under = background.map(|bg| {
        let a = bg.a.clamp(0.0, 1.0);
        [bg.r * a, bg.g * a, bg.b * a, a]
    });
    surface
        .data()
        .iter()
        .flat_map(|&[r, g, b, a]| {
            let [r, g, b, a] = match under {
                Some([ur, ug, ub, ua]) => {
                    let k = 1.0 - a;
                    [r + ur * k, g + ug * k, b + ub * k, a + ua * k]
                }
                None => [r, g, b, a],
            };
            if a <= 0.0 {
                return [0, 0, 0, 0];
            }
            Rgba {
                r: r / a,
                g: g / a,
                b: b / a,
                a,
            }
            .to_rgba8()
        })
        .collect()
}
