//! World ↔ grid coordinate mapping.
//!
//! A [`GridGeometry`] fixes where a grid sits in the world: the world
//! coordinates of the lower-left corner of cell `(0, 0)`, the edge length of a
//! cell, and the number of cells along each axis.
//!
//! # Example
//!
//! ```rust
//! use costclear_grid::transform::GridGeometry;
//!
//! // 10 m × 10 m at 0.5 m/cell, centred on the world origin.
//! let geo = GridGeometry::new(20, 20, 0.5, -5.0, -5.0).unwrap();
//!
//! assert_eq!(geo.world_to_map(0.1, 0.1), Some((10, 10)));
//! assert_eq!(geo.world_to_map(99.0, 0.0), None);
//! // Points beyond the edge snap to the nearest boundary cell.
//! assert_eq!(geo.world_to_map_clamped(99.0, -99.0), (19, 0));
//! ```

use costclear_types::{DirtyBounds, Point2};

use crate::GridError;

/// A cell index pair `(mx, my)`.
pub type MapCoord = (u32, u32);

/// Placement and resolution of a 2-D grid in the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    size_x: u32,
    size_y: u32,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
}

impl GridGeometry {
    /// Describe a `size_x × size_y` grid with `resolution` metres per cell
    /// whose cell `(0, 0)` starts at `(origin_x, origin_y)`.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidGeometry`] when either dimension is zero or the
    /// resolution is not a positive finite number.
    pub fn new(
        size_x: u32,
        size_y: u32,
        resolution: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<Self, GridError> {
        if size_x == 0 || size_y == 0 {
            return Err(GridError::InvalidGeometry(format!(
                "grid must have at least one cell, got {size_x}x{size_y}"
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridError::InvalidGeometry(format!(
                "resolution must be positive, got {resolution}"
            )));
        }
        if !(origin_x.is_finite() && origin_y.is_finite()) {
            return Err(GridError::InvalidGeometry("origin must be finite".into()));
        }
        Ok(Self {
            size_x,
            size_y,
            resolution,
            origin_x,
            origin_y,
        })
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn size_y(&self) -> u32 {
        self.size_y
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Point2 {
        Point2::new(self.origin_x, self.origin_y)
    }

    /// Width and height of the grid in metres.
    pub fn size_in_meters(&self) -> (f64, f64) {
        (
            self.size_x as f64 * self.resolution,
            self.size_y as f64 * self.resolution,
        )
    }

    /// The whole grid as a world-frame rectangle.
    pub fn extent(&self) -> DirtyBounds {
        let (w, h) = self.size_in_meters();
        DirtyBounds::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + w,
            self.origin_y + h,
        )
    }

    /// Strict conversion: `None` when `(wx, wy)` lies outside
    /// `[origin, origin + size)`.
    pub fn world_to_map(&self, wx: f64, wy: f64) -> Option<MapCoord> {
        if !(wx >= self.origin_x && wy >= self.origin_y) {
            return None;
        }
        let mx = ((wx - self.origin_x) / self.resolution) as u64;
        let my = ((wy - self.origin_y) / self.resolution) as u64;
        if mx < self.size_x as u64 && my < self.size_y as u64 {
            Some((mx as u32, my as u32))
        } else {
            None
        }
    }

    /// Conversion that never fails: coordinates outside the grid snap to the
    /// nearest boundary cell on each axis. `NaN` maps to index 0.
    pub fn world_to_map_clamped(&self, wx: f64, wy: f64) -> MapCoord {
        (
            clamp_axis(wx, self.origin_x, self.resolution, self.size_x),
            clamp_axis(wy, self.origin_y, self.resolution, self.size_y),
        )
    }
}

fn clamp_axis(w: f64, origin: f64, resolution: f64, size: u32) -> u32 {
    let last = size - 1;
    if w < origin {
        return 0;
    }
    if w >= origin + size as f64 * resolution {
        return last;
    }
    // `as` saturates, and NaN becomes 0.
    (((w - origin) / resolution) as u32).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> GridGeometry {
        GridGeometry::new(40, 20, 0.25, -5.0, -2.5).unwrap()
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(matches!(
            GridGeometry::new(0, 10, 0.1, 0.0, 0.0),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_non_positive_resolution() {
        assert!(GridGeometry::new(10, 10, 0.0, 0.0, 0.0).is_err());
        assert!(GridGeometry::new(10, 10, -0.1, 0.0, 0.0).is_err());
        assert!(GridGeometry::new(10, 10, f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn size_in_meters_and_extent() {
        let g = geo();
        assert_eq!(g.size_in_meters(), (10.0, 5.0));
        assert_eq!(g.extent(), DirtyBounds::new(-5.0, -2.5, 5.0, 2.5));
    }

    #[test]
    fn world_to_map_inside() {
        let g = geo();
        assert_eq!(g.world_to_map(-5.0, -2.5), Some((0, 0)));
        assert_eq!(g.world_to_map(0.0, 0.0), Some((20, 10)));
        assert_eq!(g.world_to_map(4.99, 2.49), Some((39, 19)));
    }

    #[test]
    fn world_to_map_outside_is_none() {
        let g = geo();
        assert_eq!(g.world_to_map(5.0, 0.0), None);
        assert_eq!(g.world_to_map(0.0, -2.6), None);
        assert_eq!(g.world_to_map(f64::NAN, 0.0), None);
    }

    #[test]
    fn clamped_matches_strict_inside() {
        let g = geo();
        for &(x, y) in &[(-5.0, -2.5), (0.3, -1.1), (4.9, 2.4)] {
            assert_eq!(Some(g.world_to_map_clamped(x, y)), g.world_to_map(x, y));
        }
    }

    #[test]
    fn clamped_snaps_to_boundary() {
        let g = geo();
        assert_eq!(g.world_to_map_clamped(-100.0, 0.0), (0, 10));
        assert_eq!(g.world_to_map_clamped(100.0, 0.0), (39, 10));
        assert_eq!(g.world_to_map_clamped(0.0, 100.0), (20, 19));
        assert_eq!(g.world_to_map_clamped(5.0, 2.5), (39, 19));
    }

    #[test]
    fn clamped_never_leaves_grid() {
        let g = geo();
        let samples = [
            -1e12, -1e9, -5.0001, -5.0, 0.0, 2.5, 4.999_999, 5.0, 1e9, 1e12,
            f64::MAX, f64::MIN, f64::INFINITY, f64::NEG_INFINITY, f64::NAN,
        ];
        for &x in &samples {
            for &y in &samples {
                let (mx, my) = g.world_to_map_clamped(x, y);
                assert!(mx < g.size_x(), "mx={mx} for x={x}");
                assert!(my < g.size_y(), "my={my} for y={y}");
            }
        }
    }
}
