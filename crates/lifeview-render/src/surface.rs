//! Drawing-surface abstraction.
//!
//! The renderer only issues the handful of operations below. A surface is
//! free to rasterise them however it likes; [`RasterSurface`] paints pixels
//! into an image buffer and [`RecordingSurface`] just remembers the calls.
//!
//! [`RasterSurface`]: crate::raster::RasterSurface

use crate::color::Rgb;

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Build a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether pixel `(px, py)` lies inside the rectangle.
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && py >= self.y
            && px.saturating_sub(self.x) < self.width
            && py.saturating_sub(self.y) < self.height
    }
}

/// The operations a renderer can issue.
pub trait Surface: Send {
    /// Resize to `width x height` pixels. Contents are unspecified afterwards.
    fn resize(&mut self, width: u32, height: u32);

    /// Current `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Paint every pixel with `color`.
    fn clear(&mut self, color: Rgb);

    /// Fill `rect`, clipped to the surface.
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);

    /// Draw a one-pixel outline along the inside edge of `rect`.
    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb);

    /// Draw a full-height one-pixel line at column `x`.
    fn vertical_line(&mut self, x: u32, color: Rgb);

    /// Draw a full-width one-pixel line at row `y`.
    fn horizontal_line(&mut self, y: u32, color: Rgb);
}

/// One recorded surface call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOp {
    /// [`Surface::resize`].
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// [`Surface::clear`].
    Clear(Rgb),
    /// [`Surface::fill_rect`].
    Fill(PixelRect, Rgb),
    /// [`Surface::stroke_rect`].
    Stroke(PixelRect, Rgb),
    /// [`Surface::vertical_line`].
    VerticalLine(u32, Rgb),
    /// [`Surface::horizontal_line`].
    HorizontalLine(u32, Rgb),
}

/// A surface that records calls instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call since the last [`Surface::clear`], in issue order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Colour of the last fill covering pixel `(px, py)`, if any.
    pub fn last_fill_at(&self, px: u32, py: u32) -> Option<Rgb> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Fill(rect, color) if rect.contains(px, py) => Some(*color),
            _ => None,
        })
    }

    /// Every stroke whose rectangle covers pixel `(px, py)`, in issue order.
    pub fn strokes_at(&self, px: u32, py: u32) -> Vec<Rgb> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke(rect, color) if rect.contains(px, py) => Some(*color),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.push(DrawOp::Resize { width, height });
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.ops.push(DrawOp::Stroke(rect, color));
    }

    fn vertical_line(&mut self, x: u32, color: Rgb) {
        self.ops.push(DrawOp::VerticalLine(x, color));
    }

    fn horizontal_line(&mut self, y: u32, color: Rgb) {
        self.ops.push(DrawOp::HorizontalLine(y, color));
    }
}
