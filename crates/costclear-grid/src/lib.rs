//! `costclear-grid` – in-process layered costmap engine.
//!
//! Provides the storage and the primitives the clearing core drives. Cost
//! fusion from sensors is not modelled; callers write cells directly.
//!
//! # Modules
//!
//! - [`transform`] – [`GridGeometry`][transform::GridGeometry]: world ↔ grid
//!   coordinate mapping, strict and clamped.
//! - [`raster`] – Bresenham outlines and convex-polygon cell filling.
//! - [`costmap`] – [`CostGrid`][costmap::CostGrid]: cells, reset value, the
//!   `clear_area` / `set_convex_polygon_cost` primitives and dirty bounds.
//! - [`layer`] – the [`Layer`][layer::Layer] trait and
//!   [`CostmapLayer`][layer::CostmapLayer], each grid behind its own mutex.
//! - [`layered`] – [`LayeredCostmap`][layered::LayeredCostmap]: the ordered
//!   stack plus the stack-wide lock.

use thiserror::Error;

pub mod costmap;
pub mod layer;
pub mod layered;
pub mod raster;
pub mod transform;

pub use costmap::CostGrid;
pub use layer::{CostmapLayer, Layer, SharedGrid};
pub use layered::{LayeredCostmap, StackGuard};
pub use transform::{GridGeometry, MapCoord};

/// Failures of the grid primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid grid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("World point ({x}, {y}) lies outside the grid")]
    PointOutOfBounds { x: f64, y: f64 },

    #[error("Cell ({mx}, {my}) lies outside the grid")]
    CellOutOfBounds { mx: u32, my: u32 },
}
