//! Cell rasterisation of lines and convex polygons.
//!
//! [`convex_fill_cells`] traces the outline of a polygon with
//! [`BresenhamLine`] and then fills every column between the lowest and the
//! highest outline cell. For a convex polygon this covers exactly the
//! boundary and the interior; cells on the outline always count as inside.

use std::collections::BTreeMap;

use crate::transform::MapCoord;

/// Bresenham iterator over the cells of a segment, both endpoints included.
pub struct BresenhamLine {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    end: (i64, i64),
    done: bool,
}

impl BresenhamLine {
    pub fn new(start: MapCoord, end: MapCoord) -> Self {
        let (x0, y0) = (start.0 as i64, start.1 as i64);
        let (x1, y1) = (end.0 as i64, end.1 as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            end: (x1, y1),
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = MapCoord;

    fn next(&mut self) -> Option<MapCoord> {
        if self.done {
            return None;
        }
        // Every cell lies between two valid endpoints, so the casts are lossless.
        let cell = (self.x as u32, self.y as u32);
        if (self.x, self.y) == self.end {
            self.done = true;
            return Some(cell);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(cell)
    }
}

/// Cells on the closed outline of `polygon` (last vertex joins the first).
pub fn polygon_outline_cells(polygon: &[MapCoord]) -> Vec<MapCoord> {
    let mut cells = Vec::new();
    for (i, &start) in polygon.iter().enumerate() {
        let end = polygon[(i + 1) % polygon.len()];
        cells.extend(BresenhamLine::new(start, end));
    }
    cells
}

/// Every cell covered by a convex polygon given in grid coordinates.
///
/// Returns an empty list for fewer than three vertices. Cells are produced
/// column by column, ascending in `x` then `y`, without duplicates.
pub fn convex_fill_cells(polygon: &[MapCoord]) -> Vec<MapCoord> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    // x -> (lowest y, highest y) seen on the outline
    let mut columns: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for (x, y) in polygon_outline_cells(polygon) {
        columns
            .entry(x)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(y);
                *hi = (*hi).max(y);
            })
            .or_insert((y, y));
    }

    columns
        .into_iter()
        .flat_map(|(x, (lo, hi))| (lo..=hi).map(move |y| (x, y)))
        .collect()
}
