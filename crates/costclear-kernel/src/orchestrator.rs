//! [`ClearOrchestrator`] – entry point for the three clear operations.
//!
//! Every operation first asks the [`PoseSource`] for the robot pose and
//! aborts with [`ClearError::PoseUnavailable`] before touching any layer if
//! there is none. After that:
//!
//! 1. **Except region** – for each clearable layer, lock it, look the pose
//!    up again (skipping only this layer if it is gone), reset every cell
//!    outside the heading-aligned [`preserved_region`], and mark the whole
//!    layer dirty.
//! 2. **Around robot** – for each clearable layer, lock it and write the
//!    reset value into the axis-aligned [`around_robot_window`]. A window
//!    with a zero side is a full clear.
//! 3. **Entirely** – take the stack-wide lock and reset every layer, clearable
//!    or not.
//!
//! Partial clears hold at most one layer lock at a time and never the stack
//! lock, so they cannot deadlock with sensor threads or with each other.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use costclear_grid::{CostGrid, CostmapLayer, GridGeometry, LayeredCostmap};
//! use costclear_kernel::{ClearOrchestrator, LayerFilter, SharedPose};
//! use costclear_types::Pose2;
//!
//! let geo = GridGeometry::new(40, 40, 0.1, -2.0, -2.0).unwrap();
//! let obstacles = Arc::new(CostmapLayer::new("local_costmap/obstacle_layer", CostGrid::new(geo, 0)));
//! obstacles.grid().lock().fill(254);
//!
//! let mut stack = LayeredCostmap::new("local_costmap", geo, 0);
//! stack.add_layer(obstacles.clone());
//!
//! let clearer = ClearOrchestrator::new(
//!     Arc::new(stack),
//!     Arc::new(SharedPose::new(Pose2::new(0.0, 0.0, 0.0))),
//!     LayerFilter::new(["obstacle_layer"]),
//! );
//!
//! let report = clearer.clear_around_robot(1.0, 1.0).unwrap();
//! assert_eq!(report.cleared, ["local_costmap/obstacle_layer"]);
//! assert_eq!(obstacles.grid().lock().cost(20, 20), Some(0));
//! assert_eq!(obstacles.grid().lock().cost(0, 0), Some(254));
//! ```

use std::sync::Arc;

use costclear_grid::{LayeredCostmap, MapCoord};
use costclear_types::{
    ClearError, ClearOperation, ClearReport, ClearRequest, LayerSkip, Pose2, SkipReason,
};
use tracing::{error, info, instrument, warn};

use crate::bounds::touch_full_extent;
use crate::layer_filter::LayerFilter;
use crate::pose::PoseSource;
use crate::region::{around_robot_window, preserved_region};

pub struct ClearOrchestrator {
    costmap: Arc<LayeredCostmap>,
    pose_source: Arc<dyn PoseSource>,
    filter: LayerFilter,
    reset_value: u8,
}

impl ClearOrchestrator {
    /// Build an orchestrator over `costmap`. The value written by
    /// around-robot clears is the stack's default, read once here.
    pub fn new(
        costmap: Arc<LayeredCostmap>,
        pose_source: Arc<dyn PoseSource>,
        filter: LayerFilter,
    ) -> Self {
        let reset_value = costmap.default_value();
        Self {
            costmap,
            pose_source,
            filter,
            reset_value,
        }
    }

    pub fn costmap(&self) -> &Arc<LayeredCostmap> {
        &self.costmap
    }

    pub fn filter(&self) -> &LayerFilter {
        &self.filter
    }

    pub fn reset_value(&self) -> u8 {
        self.reset_value
    }

    /// Run whichever operation `request` names.
    pub fn execute(&self, request: ClearRequest) -> Result<ClearReport, ClearError> {
        match request {
            ClearRequest::ExceptRegion { reset_distance } => {
                self.clear_except_region(reset_distance)
            }
            ClearRequest::AroundRobot {
                window_size_x,
                window_size_y,
            } => self.clear_around_robot(window_size_x, window_size_y),
            ClearRequest::Entire => self.clear_entirely(),
        }
    }

    /// Keep the region around the robot and reset everything else in the
    /// clearable layers.
    ///
    /// # Errors
    ///
    /// - [`ClearError::InvalidRequest`] – `reset_distance` is negative or not finite.
    /// - [`ClearError::PoseUnavailable`] – no pose at the start; nothing was changed.
    #[instrument(skip(self), fields(costmap = %self.costmap.name()))]
    pub fn clear_except_region(&self, reset_distance: f64) -> Result<ClearReport, ClearError> {
        check_length("reset_distance", reset_distance)?;
        let position = self.current_pose()?.position();

        let mut report = ClearReport::new(ClearOperation::ExceptRegion);
        for layer in self.filter.select(self.costmap.layers()) {
            let Some(shared) = layer.costmap() else {
                continue;
            };
            let mut grid = shared.lock();

            let Some(pose) = self.pose_source.robot_pose() else {
                warn!(layer = layer.name(), "robot pose lost, layer left untouched");
                report.skipped.push(LayerSkip {
                    layer: layer.name().to_string(),
                    reason: SkipReason::PoseUnavailable,
                });
                continue;
            };

            let corners: Vec<MapCoord> = preserved_region(position, pose.yaw, reset_distance)
                .iter()
                .map(|p| grid.world_to_map_clamped(p.x, p.y))
                .collect();

            match grid.clear_area(&corners) {
                Ok(_) => {
                    touch_full_extent(&mut grid);
                    report.cleared.push(layer.name().to_string());
                }
                Err(e) => {
                    warn!(layer = layer.name(), error = %e, "area clear failed");
                    report.skipped.push(LayerSkip {
                        layer: layer.name().to_string(),
                        reason: SkipReason::PrimitiveFailed(e.to_string()),
                    });
                }
            }
        }

        log_report(&report);
        Ok(report)
    }

    /// Reset an axis-aligned `window_x × window_y` window centred on the
    /// robot in the clearable layers. A zero side means [`Self::clear_entirely`].
    ///
    /// # Errors
    ///
    /// - [`ClearError::InvalidRequest`] – a window side is negative or not finite.
    /// - [`ClearError::PoseUnavailable`] – no pose; nothing was changed.
    #[instrument(skip(self), fields(costmap = %self.costmap.name()))]
    pub fn clear_around_robot(
        &self,
        window_x: f64,
        window_y: f64,
    ) -> Result<ClearReport, ClearError> {
        check_length("window_size_x", window_x)?;
        check_length("window_size_y", window_y)?;
        let request = ClearRequest::AroundRobot {
            window_size_x: window_x,
            window_size_y: window_y,
        };
        if request.operation() == ClearOperation::Entire {
            return self.clear_entirely();
        }
        let pose = self.current_pose()?;
        let window = around_robot_window(pose.position(), window_x, window_y);

        let mut report = ClearReport::new(ClearOperation::AroundRobot);
        for layer in self.filter.select(self.costmap.layers()) {
            let Some(shared) = layer.costmap() else {
                continue;
            };
            let result = shared
                .lock()
                .set_convex_polygon_cost(&window, self.reset_value);

            match result {
                Ok(_) => report.cleared.push(layer.name().to_string()),
                Err(e) => {
                    warn!(layer = layer.name(), error = %e, "window clear failed");
                    report.skipped.push(LayerSkip {
                        layer: layer.name().to_string(),
                        reason: SkipReason::PrimitiveFailed(e.to_string()),
                    });
                }
            }
        }

        log_report(&report);
        Ok(report)
    }

    /// Reset every layer of the stack to its own default value under the
    /// stack-wide lock.
    ///
    /// # Errors
    ///
    /// [`ClearError::PoseUnavailable`] – no pose; nothing was changed.
    #[instrument(skip(self), fields(costmap = %self.costmap.name()))]
    pub fn clear_entirely(&self) -> Result<ClearReport, ClearError> {
        self.current_pose()?;

        let mut report = ClearReport::new(ClearOperation::Entire);
        {
            let mut stack = self.costmap.lock();
            stack.reset_layers();
        }
        report.cleared = self
            .costmap
            .layers()
            .iter()
            .map(|l| l.name().to_string())
            .collect();

        log_report(&report);
        Ok(report)
    }

    fn current_pose(&self) -> Result<Pose2, ClearError> {
        self.pose_source.robot_pose().ok_or_else(|| {
            error!(
                costmap = self.costmap.name(),
                "Cannot clear map because robot pose cannot be retrieved."
            );
            ClearError::PoseUnavailable
        })
    }
}

fn check_length(field: &str, value: f64) -> Result<(), ClearError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ClearError::InvalidRequest(format!(
            "{field} must be a non-negative distance, got {value}"
        )))
    }
}

fn log_report(report: &ClearReport) {
    info!(
        operation = %report.operation,
        cleared = report.cleared.len(),
        skipped = report.skipped.len(),
        "costmap cleared"
    );
}
