//! In-memory pixel surface backed by an [`image::RgbImage`].

use std::path::Path;

use image::RgbImage;

use crate::color::{BACKGROUND, Rgb};
use crate::surface::{PixelRect, Surface};

/// Errors raised when exporting a raster frame.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Encoding or writing the image failed.
    #[error("failed to write frame: {source}")]
    Image {
        /// The underlying image error.
        #[from]
        source: image::ImageError,
    },
}

/// A surface that rasterises every call into an RGB pixel buffer.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbImage,
}

impl RasterSurface {
    /// Create a surface of `width x height` pixels painted with the
    /// background colour.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb(BACKGROUND.to_array())),
        }
    }

    /// Colour at pixel `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| Rgb::new(p.0[0], p.0[1], p.0[2]))
    }

    /// The underlying image buffer.
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Write the current contents as a PNG file.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Image`] if encoding or writing fails.
    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Paint the clipped span `[x0, x1) x [y0, y1)`.
    fn paint(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb) {
        let x1 = x1.min(self.image.width());
        let y1 = y1.min(self.image.height());
        let px = image::Rgb(color.to_array());
        for y in y0..y1 {
            for x in x0..x1 {
                self.image.put_pixel(x, y, px);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbImage::from_pixel(width, height, image::Rgb(BACKGROUND.to_array()));
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Rgb) {
        let px = image::Rgb(color.to_array());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        if rect.is_empty() {
            return;
        }
        let x1 = rect.x.saturating_add(rect.width);
        let y1 = rect.y.saturating_add(rect.height);
        self.paint(rect.x, rect.y, x1, y1, color);
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Rgb) {
        if rect.is_empty() {
            return;
        }
        let right = rect.x.saturating_add(rect.width);
        let bottom = rect.y.saturating_add(rect.height);
        let last_col = right.saturating_sub(1);
        let last_row = bottom.saturating_sub(1);
        self.paint(rect.x, rect.y, right, rect.y.saturating_add(1), color);
        self.paint(rect.x, last_row, right, bottom, color);
        self.paint(rect.x, rect.y, rect.x.saturating_add(1), bottom, color);
        self.paint(last_col, rect.y, right, bottom, color);
    }

    fn vertical_line(&mut self, x: u32, color: Rgb) {
        let height = self.image.height();
        self.paint(x, 0, x.saturating_add(1), height, color);
    }

    fn horizontal_line(&mut self, y: u32, color: Rgb) {
        let width = self.image.width();
        self.paint(0, y, width, y.saturating_add(1), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    #[test]
    fn new_surface_is_background() {
        let s = RasterSurface::new(3, 2);
        assert_eq!(s.dimensions(), (3, 2));
        assert_eq!(s.pixel(2, 1), Some(BACKGROUND));
        assert_eq!(s.pixel(3, 0), None);
    }

    #[test]
    fn fill_is_clipped() {
        let mut s = RasterSurface::new(4, 4);
        s.fill_rect(PixelRect::new(2, 2, 10, 10), RED);
        assert_eq!(s.pixel(3, 3), Some(RED));
        assert_eq!(s.pixel(1, 1), Some(BACKGROUND));
    }

    #[test]
    fn stroke_outlines_inside_edge() {
        let mut s = RasterSurface::new(8, 8);
        s.fill_rect(PixelRect::new(1, 1, 3, 3), RED);
        s.stroke_rect(PixelRect::new(1, 1, 3, 3), BLUE);
        assert_eq!(s.pixel(1, 1), Some(BLUE));
        assert_eq!(s.pixel(3, 3), Some(BLUE));
        assert_eq!(s.pixel(2, 1), Some(BLUE));
        assert_eq!(s.pixel(2, 2), Some(RED));
        assert_eq!(s.pixel(4, 4), Some(BACKGROUND));
    }

    #[test]
    fn lines_span_the_surface() {
        let mut s = RasterSurface::new(5, 5);
        s.vertical_line(2, RED);
        s.horizontal_line(4, BLUE);
        assert_eq!(s.pixel(2, 0), Some(RED));
        assert_eq!(s.pixel(2, 3), Some(RED));
        assert_eq!(s.pixel(0, 4), Some(BLUE));
        // Off-surface lines are ignored.
        s.vertical_line(9, BLUE);
    }

    #[test]
    fn resize_keeps_buffer_when_unchanged() {
        let mut s = RasterSurface::new(4, 4);
        s.fill_rect(PixelRect::new(0, 0, 1, 1), RED);
        s.resize(4, 4);
        assert_eq!(s.pixel(0, 0), Some(RED));
        s.resize(6, 2);
        assert_eq!(s.dimensions(), (6, 2));
        assert_eq!(s.pixel(0, 0), Some(BACKGROUND));
    }
}
