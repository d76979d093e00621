//! Two-layer frame renderer.
//!
//! Every frame is a full redraw, in this order:
//!
//! 1. clear to the background colour
//! 2. separator lines every `cell_size` pixels
//! 3. every live cell in the neutral live-cell colour
//! 4. every lineage group, in ascending stage order, in its stage colour,
//!    outlined with the border colour when the stage has one
//!
//! Painting order is what makes the picture correct: a lineage colour always
//! covers the generic live-cell fill, and where groups overlap the
//! higher-stage group is painted last and wins. Groups with equal stages keep
//! the order the service reported them in.
//!
//! Coordinates: a cell's row maps to the vertical pixel offset and its column
//! to the horizontal one, in both layers.

use lifeview_types::{Cell, GridSnapshot, LineageGroup, SpeciesSnapshot};
use tracing::trace;

use crate::color::{self, BACKGROUND, GRID_LINE, LIVE_CELL};
use crate::surface::{PixelRect, Surface};

/// Counters describing what a render call drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Live cells painted in the neutral colour.
    pub live_cells: u64,
    /// Lineage groups painted.
    pub groups: u64,
    /// Group cells painted (a cell shared by two groups counts twice).
    pub group_cells: u64,
    /// Group cells skipped because they lie outside the grid.
    pub skipped_cells: u64,
}

/// Pixel dimensions of a grid drawn at `cell_size`.
pub const fn canvas_size(grid_width: u32, grid_height: u32, cell_size: u32) -> (u32, u32) {
    (
        grid_width.saturating_mul(cell_size),
        grid_height.saturating_mul(cell_size),
    )
}

/// The rectangle a cell is painted into.
///
/// One pixel is left free on the right and bottom so the separator line
/// between neighbouring cells stays visible.
pub const fn cell_rect(cell: Cell, cell_size: u32) -> PixelRect {
    let side = cell_size.saturating_sub(1);
    PixelRect::new(
        cell.col.saturating_mul(cell_size),
        cell.row.saturating_mul(cell_size),
        side,
        side,
    )
}

/// The cell under pixel `(x, y)`, or `None` outside a `width x height` grid.
pub fn cell_at_pixel(x: u32, y: u32, cell_size: u32, width: u32, height: u32) -> Option<Cell> {
    let row = y.checked_div(cell_size)?;
    let col = x.checked_div(cell_size)?;
    (row < height && col < width).then_some(Cell::new(row, col))
}

/// Redraw `surface` from one grid snapshot and one species snapshot.
///
/// The surface is resized to the grid's pixel dimensions first when they
/// differ. Lineage colours are keyed by the grid snapshot's generation.
pub fn render_frame<S>(
    surface: &mut S,
    grid: &GridSnapshot,
    species: &SpeciesSnapshot,
    cell_size: u32,
) -> RenderStats
where
    S: Surface + ?Sized,
{
    let cell_size = cell_size.max(1);
    let (px_width, px_height) = canvas_size(grid.width(), grid.height(), cell_size);
    if surface.dimensions() != (px_width, px_height) {
        surface.resize(px_width, px_height);
    }

    surface.clear(BACKGROUND);
    draw_separators(surface, grid, cell_size);

    let mut stats = RenderStats::default();

    for cell in grid.live_cells() {
        surface.fill_rect(cell_rect(cell, cell_size), LIVE_CELL);
        stats.live_cells = stats.live_cells.saturating_add(1);
    }

    let mut ordered: Vec<&LineageGroup> = species.groups().iter().collect();
    ordered.sort_by_key(|group| group.stage);

    let generation = grid.generation();
    for group in ordered {
        let fill = color::color_for(group.stage, generation);
        let border = color::border_for(group.stage, generation);
        for cell in &group.cells {
            if !grid.contains(*cell) {
                stats.skipped_cells = stats.skipped_cells.saturating_add(1);
                continue;
            }
            let rect = cell_rect(*cell, cell_size);
            surface.fill_rect(rect, fill);
            if let Some(border) = border {
                surface.stroke_rect(rect, border);
            }
            stats.group_cells = stats.group_cells.saturating_add(1);
        }
        stats.groups = stats.groups.saturating_add(1);
    }

    trace!(
        generation,
        live_cells = stats.live_cells,
        groups = stats.groups,
        skipped_cells = stats.skipped_cells,
        "frame rendered"
    );
    stats
}

fn draw_separators<S>(surface: &mut S, grid: &GridSnapshot, cell_size: u32)
where
    S: Surface + ?Sized,
{
    for col in 0..=grid.width() {
        surface.vertical_line(col.saturating_mul(cell_size), GRID_LINE);
    }
    for row in 0..=grid.height() {
        surface.horizontal_line(row.saturating_mul(cell_size), GRID_LINE);
    }
}
