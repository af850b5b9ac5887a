//! Dirty-bounds bookkeeping after a partial clear.

use costclear_grid::CostGrid;

/// Grow `grid`'s dirty bounds to cover its whole extent.
///
/// An except-region clear resets cells anywhere outside a small polygon, so
/// downstream consumers are told to recompute the entire layer.
pub fn touch_full_extent(grid: &mut CostGrid) {
    let origin = grid.origin();
    let (width, height) = grid.size_in_meters();
    grid.add_extra_bounds(origin.x, origin.y, origin.x + width, origin.y + height);
}
