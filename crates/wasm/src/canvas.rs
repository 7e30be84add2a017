//! `Surface` over a page `<canvas>` through its 2D context.

use ambient_field_core::{FieldError, Rgba, Size, Surface};
use glam::DVec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

/// A canvas sized to the window.
pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

fn surface_error(op: &str, e: JsValue) -> FieldError {
    FieldError::Surface(format!("{op}: {e:?}"))
}

impl CanvasSurface {
    pub fn new(window: Window, canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "not a 2d context")?;
        Ok(Self {
            window,
            canvas,
            ctx,
        })
    }

    fn window_extent(&self) -> Option<(u32, u32)> {
        let w = self.window.inner_width().ok()?.as_f64()?;
        let h = self.window.inner_height().ok()?.as_f64()?;
        Some((w.max(0.0) as u32, h.max(0.0) as u32))
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    /// Matches the backing store to the window, leaving it alone when the
    /// window reports nothing usable.
    fn sync_size(&mut self) {
        let Some((w, h)) = self.window_extent() else {
            return;
        };
        if w == 0 || h == 0 {
            return;
        }
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
    }

    fn clear(&mut self) -> Result<(), FieldError> {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn fill_disc(&mut self, center: DVec2, radius: f64, color: Rgba) -> Result<(), FieldError> {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
            .map_err(|e| surface_error("arc", e))?;
        self.ctx.fill();
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: DVec2,
        to: DVec2,
        width: f64,
        color: Rgba,
    ) -> Result<(), FieldError> {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
        Ok(())
    }
}
