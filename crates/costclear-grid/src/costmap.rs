//! [`CostGrid`] – a single layer's cost cells plus its dirty bounds.

use costclear_types::{DirtyBounds, Point2};
use tracing::debug;

use crate::GridError;
use crate::raster::convex_fill_cells;
use crate::transform::{GridGeometry, MapCoord};

/// Row-major `u8` cost cells laid over a [`GridGeometry`].
///
/// Every cell starts at, and is reset to, the grid's default value.
#[derive(Debug, Clone)]
pub struct CostGrid {
    geometry: GridGeometry,
    default_value: u8,
    cells: Vec<u8>,
    dirty: DirtyBounds,
}

impl CostGrid {
    pub fn new(geometry: GridGeometry, default_value: u8) -> Self {
        let len = geometry.size_x() as usize * geometry.size_y() as usize;
        Self {
            geometry,
            default_value,
            cells: vec![default_value; len],
            dirty: DirtyBounds::empty(),
        }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn default_value(&self) -> u8 {
        self.default_value
    }

    pub fn origin(&self) -> Point2 {
        self.geometry.origin()
    }

    pub fn size_in_meters(&self) -> (f64, f64) {
        self.geometry.size_in_meters()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn world_to_map(&self, wx: f64, wy: f64) -> Option<MapCoord> {
        self.geometry.world_to_map(wx, wy)
    }

    pub fn world_to_map_clamped(&self, wx: f64, wy: f64) -> MapCoord {
        self.geometry.world_to_map_clamped(wx, wy)
    }

    fn index(&self, mx: u32, my: u32) -> Option<usize> {
        (mx < self.geometry.size_x() && my < self.geometry.size_y())
            .then(|| my as usize * self.geometry.size_x() as usize + mx as usize)
    }

    pub fn cost(&self, mx: u32, my: u32) -> Option<u8> {
        self.index(mx, my).map(|i| self.cells[i])
    }

    pub fn set_cost(&mut self, mx: u32, my: u32, value: u8) -> Result<(), GridError> {
        let i = self
            .index(mx, my)
            .ok_or(GridError::CellOutOfBounds { mx, my })?;
        self.cells[i] = value;
        Ok(())
    }

    /// Write `value` into every cell, e.g. to simulate a sensor sweep.
    pub fn fill(&mut self, value: u8) {
        self.cells.fill(value);
    }

    /// Number of cells currently holding something other than the default.
    pub fn count_non_default(&self) -> usize {
        self.cells.iter().filter(|&&c| c != self.default_value).count()
    }

    /// Reset every cell to the default value and mark the whole grid dirty.
    pub fn reset(&mut self) {
        self.cells.fill(self.default_value);
        self.dirty.expand(self.geometry.extent());
    }

    /// Reset every cell *outside* the convex polygon `polygon` (grid
    /// coordinates) to the default value. Cells on the outline and inside
    /// are preserved. Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// [`GridError::DegeneratePolygon`] for fewer than three vertices and
    /// [`GridError::CellOutOfBounds`] when a vertex lies outside the grid.
    pub fn clear_area(&mut self, polygon: &[MapCoord]) -> Result<usize, GridError> {
        self.check_polygon(polygon)?;

        let size_x = self.geometry.size_x() as usize;
        let mut keep = vec![false; self.cells.len()];
        for (mx, my) in convex_fill_cells(polygon) {
            keep[my as usize * size_x + mx as usize] = true;
        }

        let mut written = 0;
        for (cell, keep) in self.cells.iter_mut().zip(keep) {
            if !keep {
                *cell = self.default_value;
                written += 1;
            }
        }
        debug!(written, "cleared area outside polygon");
        Ok(written)
    }

    /// Write `value` into every cell covered by the convex polygon `polygon`
    /// (world coordinates). Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// [`GridError::PointOutOfBounds`] if any vertex falls outside the grid;
    /// nothing is written in that case.
    pub fn set_convex_polygon_cost(
        &mut self,
        polygon: &[Point2],
        value: u8,
    ) -> Result<usize, GridError> {
        if polygon.len() < 3 {
            return Err(GridError::DegeneratePolygon(polygon.len()));
        }
        let map_polygon = polygon
            .iter()
            .map(|p| {
                self.world_to_map(p.x, p.y)
                    .ok_or(GridError::PointOutOfBounds { x: p.x, y: p.y })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cells = convex_fill_cells(&map_polygon);
        for &(mx, my) in &cells {
            self.set_cost(mx, my, value)?;
        }
        Ok(cells.len())
    }

    fn check_polygon(&self, polygon: &[MapCoord]) -> Result<(), GridError> {
        if polygon.len() < 3 {
            return Err(GridError::DegeneratePolygon(polygon.len()));
        }
        if let Some(&(mx, my)) = polygon.iter().find(|&&(x, y)| self.index(x, y).is_none()) {
            return Err(GridError::CellOutOfBounds { mx, my });
        }
        Ok(())
    }

    /// Grow the dirty bounds to include the given world-frame rectangle.
    pub fn add_extra_bounds(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.dirty
            .expand(DirtyBounds::new(min_x, min_y, max_x, max_y));
    }

    pub fn dirty_bounds(&self) -> DirtyBounds {
        self.dirty
    }

    /// Hand the accumulated dirty bounds to a consumer and start afresh.
    pub fn take_dirty_bounds(&mut self) -> DirtyBounds {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 × 10 cells at 0.1 m, origin (0, 0).
    fn grid() -> CostGrid {
        CostGrid::new(GridGeometry::new(10, 10, 0.1, 0.0, 0.0).unwrap(), 0)
    }

    #[test]
    fn new_grid_holds_default_everywhere() {
        let g = CostGrid::new(GridGeometry::new(4, 3, 1.0, 0.0, 0.0).unwrap(), 255);
        assert_eq!(g.cells().len(), 12);
        assert!(g.cells().iter().all(|&c| c == 255));
        assert!(g.dirty_bounds().is_empty());
    }

    #[test]
    fn set_cost_out_of_range_fails() {
        let mut g = grid();
        assert!(g.set_cost(9, 9, 100).is_ok());
        assert_eq!(g.cost(9, 9), Some(100));
        assert!(matches!(
            g.set_cost(10, 0, 100),
            Err(GridError::CellOutOfBounds { mx: 10, my: 0 })
        ));
        assert_eq!(g.cost(0, 10), None);
    }

    #[test]
    fn reset_restores_default_and_marks_extent() {
        let mut g = grid();
        g.fill(254);
        g.reset();
        assert_eq!(g.count_non_default(), 0);
        let b = g.dirty_bounds();
        assert_eq!((b.min_x, b.min_y), (0.0, 0.0));
        assert!((b.max_x - 1.0).abs() < 1e-12 && (b.max_y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clear_area_preserves_inside_and_outline() {
        let mut g = grid();
        g.fill(254);
        let written = g.clear_area(&[(2, 2), (5, 2), (5, 5), (2, 5)]).unwrap();

        assert_eq!(written, 100 - 16);
        assert_eq!(g.count_non_default(), 16);
        assert_eq!(g.cost(2, 2), Some(254));
        assert_eq!(g.cost(4, 3), Some(254));
        assert_eq!(g.cost(1, 1), Some(0));
        assert_eq!(g.cost(6, 3), Some(0));
        // The primitive itself leaves the bounds alone.
        assert!(g.dirty_bounds().is_empty());
    }

    #[test]
    fn clear_area_rejects_degenerate_and_out_of_range() {
        let mut g = grid();
        g.fill(7);
        assert!(matches!(
            g.clear_area(&[(1, 1), (2, 2)]),
            Err(GridError::DegeneratePolygon(2))
        ));
        assert!(matches!(
            g.clear_area(&[(0, 0), (10, 0), (0, 5)]),
            Err(GridError::CellOutOfBounds { mx: 10, my: 0 })
        ));
        assert!(g.cells().iter().all(|&c| c == 7));
    }

    #[test]
    fn set_convex_polygon_cost_fills_window() {
        let mut g = grid();
        g.fill(254);
        let poly = [
            Point2::new(0.25, 0.25),
            Point2::new(0.55, 0.25),
            Point2::new(0.55, 0.55),
            Point2::new(0.25, 0.55),
        ];
        let written = g.set_convex_polygon_cost(&poly, 0).unwrap();
        assert_eq!(written, 16);
        assert_eq!(g.cost(2, 2), Some(0));
        assert_eq!(g.cost(5, 5), Some(0));
        assert_eq!(g.cost(6, 5), Some(254));
        assert_eq!(g.cost(1, 2), Some(254));
    }

    #[test]
    fn set_convex_polygon_cost_outside_grid_writes_nothing() {
        let mut g = grid();
        g.fill(254);
        let poly = [
            Point2::new(0.5, 0.5),
            Point2::new(1.5, 0.5),
            Point2::new(1.5, 0.9),
            Point2::new(0.5, 0.9),
        ];
        assert!(matches!(
            g.set_convex_polygon_cost(&poly, 0),
            Err(GridError::PointOutOfBounds { .. })
        ));
        assert_eq!(g.count_non_default(), 100);
    }

    #[test]
    fn extra_bounds_union_and_take() {
        let mut g = grid();
        g.add_extra_bounds(0.1, 0.1, 0.2, 0.2);
        g.add_extra_bounds(0.5, 0.0, 0.6, 0.15);
        assert_eq!(g.dirty_bounds(), DirtyBounds::new(0.1, 0.0, 0.6, 0.2));

        let taken = g.take_dirty_bounds();
        assert_eq!(taken, DirtyBounds::new(0.1, 0.0, 0.6, 0.2));
        assert!(g.dirty_bounds().is_empty());
    }
}
