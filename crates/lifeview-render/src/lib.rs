//! Colour model, drawing surfaces and the grid renderer for Lifeview.
//!
//! # Modules
//!
//! - [`color`] -- Stage colours and generation-keyed interpolation
//! - [`surface`] -- The [`Surface`] trait and a call-recording surface
//! - [`raster`] -- An image-backed surface that can be saved as PNG
//! - [`renderer`] -- The two-layer frame renderer
//!
//! [`Surface`]: surface::Surface

pub mod color;
pub mod raster;
pub mod renderer;
pub mod surface;

pub use color::{Rgb, border_for, color_for, progress};
pub use raster::{RasterSurface, SurfaceError};
pub use renderer::{RenderStats, canvas_size, cell_at_pixel, cell_rect, render_frame};
pub use surface::{DrawOp, PixelRect, RecordingSurface, Surface};
