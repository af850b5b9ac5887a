//! World-frame geometry of the regions a clear preserves or resets.
//!
//! * [`preserved_region`] – the heading-aligned quadrilateral kept by an
//!   except-region clear.
//! * [`around_robot_window`] – the axis-aligned window reset by an
//!   around-robot clear.
//!
//! # Example
//!
//! ```
//! use costclear_kernel::region::{except_region_corners, FORWARD_CORNER_OFFSET};
//! use costclear_types::Point2;
//!
//! let c = except_region_corners(Point2::new(0.0, 0.0), 2.0);
//! assert_eq!(c[0], Point2::new(-1.0, -1.0));
//! assert_eq!(c[1], Point2::new(FORWARD_CORNER_OFFSET, -1.0));
//! ```

use costclear_types::{Point2, Polygon};

/// Fixed forward reach of the preserved region, in metres.
///
/// The two forward corners use this instead of half the reset distance, so
/// the region is not symmetric about the robot.
pub const FORWARD_CORNER_OFFSET: f64 = 0.259;

/// Rotate `point` about `pivot` by `yaw` radians, counter-clockwise positive.
pub fn rotate_about(pivot: Point2, yaw: f64, point: Point2) -> Point2 {
    let (sin, cos) = yaw.sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point2::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
    )
}

/// Corners of the preserved region before rotation.
///
/// Rear corners sit `reset_distance / 2` behind the robot, forward corners
/// [`FORWARD_CORNER_OFFSET`] ahead; both pairs are `reset_distance / 2` to
/// either side.
pub fn except_region_corners(center: Point2, reset_distance: f64) -> [Point2; 4] {
    let half = reset_distance / 2.0;
    [
        Point2::new(center.x - half, center.y - half),
        Point2::new(center.x + FORWARD_CORNER_OFFSET, center.y - half),
        Point2::new(center.x + FORWARD_CORNER_OFFSET, center.y + half),
        Point2::new(center.x - half, center.y + half),
    ]
}

/// The preserved region, rotated rigidly about `center` by `yaw`.
pub fn preserved_region(center: Point2, yaw: f64, reset_distance: f64) -> Polygon {
    except_region_corners(center, reset_distance)
        .into_iter()
        .map(|corner| rotate_about(center, yaw, corner))
        .collect()
}

/// Axis-aligned `window_x × window_y` rectangle centred on `center`.
/// Heading is ignored.
pub fn around_robot_window(center: Point2, window_x: f64, window_y: f64) -> Polygon {
    let hx = window_x / 2.0;
    let hy = window_y / 2.0;
    vec![
        Point2::new(center.x - hx, center.y - hy),
        Point2::new(center.x + hx, center.y - hy),
        Point2::new(center.x + hx, center.y + hy),
        Point2::new(center.x - hx, center.y + hy),
    ]
}
