use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A point in the world frame, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Planar robot pose: position plus heading (radians, counter-clockwise positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2 {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Ordered vertices of a clearing or preservation boundary.
pub type Polygon = Vec<Point2>;

/// World-frame rectangle a consumer must refresh after a layer changed.
///
/// Bounds only ever grow: [`DirtyBounds::expand`] takes the union with the
/// current value. [`DirtyBounds::empty`] is the identity of that union.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirtyBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl DirtyBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds that contain nothing.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow `self` to the union of itself and `other`.
    pub fn expand(&mut self, other: DirtyBounds) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }
}

impl Default for DirtyBounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// A clear command as received from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ClearRequest {
    /// Keep a small heading-aligned square around the robot, clear the rest.
    ExceptRegion { reset_distance: f64 },
    /// Clear an axis-aligned window centred on the robot.
    AroundRobot {
        window_size_x: f64,
        window_size_y: f64,
    },
    /// Reset every layer of the stack.
    Entire,
}

impl ClearRequest {
    /// The operation that will actually run: a window with a zero side is a
    /// full clear.
    pub fn operation(&self) -> ClearOperation {
        match *self {
            ClearRequest::ExceptRegion { .. } => ClearOperation::ExceptRegion,
            ClearRequest::AroundRobot {
                window_size_x,
                window_size_y,
            } if window_size_x == 0.0 || window_size_y == 0.0 => ClearOperation::Entire,
            ClearRequest::AroundRobot { .. } => ClearOperation::AroundRobot,
            ClearRequest::Entire => ClearOperation::Entire,
        }
    }
}

/// Which clearing path ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearOperation {
    ExceptRegion,
    AroundRobot,
    Entire,
}

impl std::fmt::Display for ClearOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClearOperation::ExceptRegion => write!(f, "except_region"),
            ClearOperation::AroundRobot => write!(f, "around_robot"),
            ClearOperation::Entire => write!(f, "entire"),
        }
    }
}

/// Why an eligible layer was left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "details", rename_all = "snake_case")]
pub enum SkipReason {
    /// The robot pose could not be fetched while the layer was locked.
    PoseUnavailable,
    /// The grid primitive rejected the geometry.
    PrimitiveFailed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSkip {
    pub layer: String,
    pub reason: SkipReason,
}

/// Outcome of one clear operation. The transport only acknowledges; the
/// report feeds logging and the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearReport {
    pub operation: ClearOperation,
    /// Full names of the layers that were mutated, in stack order.
    pub cleared: Vec<String>,
    pub skipped: Vec<LayerSkip>,
}

impl ClearReport {
    pub fn new(operation: ClearOperation) -> Self {
        Self {
            operation,
            cleared: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Notification broadcast to downstream consumers after a clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostmapEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"local_costmap"`
    pub costmap: String,
    pub report: ClearReport,
}

impl CostmapEvent {
    pub fn new(costmap: impl Into<String>, report: ClearReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            costmap: costmap.into(),
            report,
        }
    }
}

/// Errors that abort a whole clear operation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClearError {
    #[error("Cannot clear map because robot pose cannot be retrieved")]
    PoseUnavailable,

    #[error("Invalid clear request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirty_bounds_union_grows() {
        let mut b = DirtyBounds::new(0.0, 0.0, 1.0, 1.0);
        b.expand(DirtyBounds::new(-2.0, 0.5, 0.5, 3.0));
        assert_eq!(b, DirtyBounds::new(-2.0, 0.0, 1.0, 3.0));
    }

    #[test]
    fn dirty_bounds_empty_is_identity() {
        let mut b = DirtyBounds::empty();
        assert!(b.is_empty());
        b.expand(DirtyBounds::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(b, DirtyBounds::new(1.0, 2.0, 3.0, 4.0));

        b.expand(DirtyBounds::empty());
        assert_eq!(b, DirtyBounds::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn zero_window_is_an_entire_clear() {
        let narrow = ClearRequest::AroundRobot {
            window_size_x: 0.0,
            window_size_y: 3.0,
        };
        let flat = ClearRequest::AroundRobot {
            window_size_x: 3.0,
            window_size_y: 0.0,
        };
        let window = ClearRequest::AroundRobot {
            window_size_x: 3.0,
            window_size_y: 3.0,
        };
        assert_eq!(narrow.operation(), ClearOperation::Entire);
        assert_eq!(flat.operation(), ClearOperation::Entire);
        assert_eq!(window.operation(), ClearOperation::AroundRobot);
    }

    #[test]
    fn clear_request_wire_format() {
        let json = r#"{"operation":"except_region","reset_distance":1.5}"#;
        let req: ClearRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req, ClearRequest::ExceptRegion { reset_distance: 1.5 });

        let entire = serde_json::to_string(&ClearRequest::Entire).unwrap();
        assert_eq!(entire, r#"{"operation":"entire"}"#);
    }

    #[test]
    fn event_carries_report() {
        let mut report = ClearReport::new(ClearOperation::ExceptRegion);
        report.cleared.push("local_costmap/obstacle_layer".into());
        report.skipped.push(LayerSkip {
            layer: "local_costmap/voxel_layer".into(),
            reason: SkipReason::PoseUnavailable,
        });
        let event = CostmapEvent::new("local_costmap", report.clone());
        let json = serde_json::to_string(&event).unwrap();
        let back: CostmapEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, event.id);
        assert_eq!(back.report, report);
    }

    #[test]
    fn clear_error_display() {
        assert!(ClearError::PoseUnavailable.to_string().contains("robot pose"));
        let err = ClearError::InvalidRequest("reset_distance is negative".into());
        assert!(err.to_string().contains("negative"));
    }
}
