//! JSON-line command session driving a [`ClearCostmapService`].
//!
//! One command per input line, one JSON reply per output line:
//!
//! | Command | Reply |
//! |---|---|
//! | `{"call": {"service": "clear_except_local_costmap", "request": {"reset_distance": 1.0}}}` | `{}` |
//! | `{"set_pose": {"x": 0.5, "y": 0.0, "yaw": 1.57}}` | `{}` |
//! | `{"lose_pose": null}` | `{}` |
//! | `{"inspect": {"layer": "obstacle_layer"}}` | layer summary; drains its dirty bounds |
//! | `{"mark": {"layer": "obstacle_layer", "polygon": [...], "cost": 254}}` | `{"marked": n}` |
//!
//! Failures answer `{"error": "..."}` and are echoed in colour on stderr.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use colored::Colorize;
use costclear_grid::{GridError, Layer};
use costclear_kernel::{LayerFilter, SharedPose};
use costclear_runtime::{ClearCostmapService, ServiceError};
use costclear_types::{Point2, Pose2};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Unreadable command: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("No such layer: {0}")]
    UnknownLayer(String),
    #[error("Layer {0} has no grid")]
    NoGrid(String),
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Call {
        service: String,
        #[serde(default)]
        request: Value,
    },
    SetPose(Pose2),
    LosePose,
    Inspect {
        layer: String,
    },
    /// Stand-in for a sensor update: write `cost` into a convex polygon.
    Mark {
        layer: String,
        polygon: Vec<Point2>,
        cost: u8,
    },
}

pub struct Session {
    service: ClearCostmapService,
    pose: Arc<SharedPose>,
}

impl Session {
    pub fn new(service: ClearCostmapService, pose: Arc<SharedPose>) -> Self {
        Self { service, pose }
    }

    pub fn execute(&self, command: Command) -> Result<Value, SessionError> {
        match command {
            Command::Call { service, request } => Ok(self.service.call(&service, request)?),
            Command::SetPose(pose) => {
                self.pose.set(pose);
                Ok(json!({}))
            }
            Command::LosePose => {
                self.pose.invalidate();
                Ok(json!({}))
            }
            Command::Inspect { layer } => {
                let layer = self.find_layer(&layer)?;
                let mut grid = layer
                    .costmap()
                    .ok_or_else(|| SessionError::NoGrid(layer.name().to_string()))?
                    .lock();
                // The caller is the consumer: hand over the dirty area.
                let dirty = grid.take_dirty_bounds();
                Ok(json!({
                    "layer": layer.name(),
                    "default_value": grid.default_value(),
                    "non_default": grid.count_non_default(),
                    "dirty": (!dirty.is_empty()).then_some(dirty),
                }))
            }
            Command::Mark {
                layer,
                polygon,
                cost,
            } => {
                let layer = self.find_layer(&layer)?;
                let marked = layer
                    .costmap()
                    .ok_or_else(|| SessionError::NoGrid(layer.name().to_string()))?
                    .lock()
                    .set_convex_polygon_cost(&polygon, cost)?;
                Ok(json!({ "marked": marked }))
            }
        }
    }

    /// Parse and run one input line. Errors become `{"error": ...}`.
    pub fn handle_line(&self, line: &str) -> Value {
        let result = serde_json::from_str::<Command>(line)
            .map_err(SessionError::from)
            .and_then(|command| {
                debug!(?command, "command received");
                self.execute(command)
            });
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "command failed");
                eprintln!("{}: {}", "Error".red().bold(), e);
                json!({ "error": e.to_string() })
            }
        }
    }

    /// Serve commands from `input` until EOF.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let reply = self.handle_line(line);
            writeln!(output, "{reply}")?;
            output.flush()?;
        }
        Ok(())
    }

    /// Accepts a full layer name or just its trailing segment.
    fn find_layer(&self, name: &str) -> Result<&Arc<dyn Layer>, SessionError> {
        self.service
            .orchestrator()
            .costmap()
            .layers()
            .iter()
            .find(|l| l.name() == name || LayerFilter::trailing_name(l.name()) == name)
            .ok_or_else(|| SessionError::UnknownLayer(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::stack;
    use costclear_kernel::ClearOrchestrator;
    use costclear_runtime::CostmapEventBus;
    use std::io::Cursor;

    fn session() -> Session {
        let cfg = Config::default();
        let costmap = stack::build(&cfg).unwrap();
        let pose = Arc::new(SharedPose::new(cfg.pose));
        let orchestrator = ClearOrchestrator::new(
            costmap,
            pose.clone(),
            LayerFilter::new(cfg.clearable_layers.clone()),
        );
        Session::new(
            ClearCostmapService::new(orchestrator, CostmapEventBus::default()),
            pose,
        )
    }

    fn mark_square(s: &Session, layer: &str, cx: f64, cy: f64) -> u64 {
        let reply = s.handle_line(
            &json!({ "mark": {
                "layer": layer,
                "polygon": [
                    { "x": cx - 0.2, "y": cy - 0.2 },
                    { "x": cx + 0.2, "y": cy - 0.2 },
                    { "x": cx + 0.2, "y": cy + 0.2 },
                    { "x": cx - 0.2, "y": cy + 0.2 },
                ],
                "cost": 254,
            }})
            .to_string(),
        );
        reply["marked"].as_u64().unwrap()
    }

    fn non_default(s: &Session, layer: &str) -> u64 {
        s.handle_line(&json!({ "inspect": { "layer": layer } }).to_string())["non_default"]
            .as_u64()
            .unwrap()
    }

    #[test]
    fn command_shapes_parse() {
        let c: Command = serde_json::from_str(r#"{"lose_pose": null}"#).unwrap();
        assert_eq!(c, Command::LosePose);
        let c: Command =
            serde_json::from_str(r#"{"set_pose": {"x": 1.0, "y": 2.0, "yaw": 0.5}}"#).unwrap();
        assert_eq!(c, Command::SetPose(Pose2::new(1.0, 2.0, 0.5)));
        let c: Command =
            serde_json::from_str(r#"{"call": {"service": "clear_entirely_local_costmap"}}"#)
                .unwrap();
        assert_eq!(
            c,
            Command::Call {
                service: "clear_entirely_local_costmap".into(),
                request: Value::Null
            }
        );
    }

    #[test]
    fn except_region_clears_distant_obstacles_on_clearable_layers_only() {
        let s = session();
        assert!(mark_square(&s, "obstacle_layer", 1.5, 1.5) > 0);
        let static_marked = mark_square(&s, "static_layer", 1.5, 1.5);

        let ack = s.handle_line(
            r#"{"call": {"service": "clear_except_local_costmap", "request": {"reset_distance": 1.0}}}"#,
        );
        assert_eq!(ack, json!({}));
        assert_eq!(non_default(&s, "obstacle_layer"), 0);
        assert_eq!(non_default(&s, "local_costmap/static_layer"), static_marked);
    }

    #[test]
    fn inspect_reports_dirty_bounds_after_clear() {
        let s = session();
        let before = s.handle_line(r#"{"inspect": {"layer": "voxel_layer"}}"#);
        assert_eq!(before["dirty"], Value::Null);

        s.handle_line(
            r#"{"call": {"service": "clear_except_local_costmap", "request": {"reset_distance": 1.0}}}"#,
        );
        let after = s.handle_line(r#"{"inspect": {"layer": "voxel_layer"}}"#);
        assert_eq!(after["layer"], "local_costmap/voxel_layer");
        assert_eq!(after["dirty"]["min_x"], -2.5);
        assert_eq!(after["dirty"]["max_y"], 2.5);

        let again = s.handle_line(r#"{"inspect": {"layer": "voxel_layer"}}"#);
        assert_eq!(again["dirty"], Value::Null);
    }

    #[test]
    fn lost_pose_refuses_clears_until_restored() {
        let s = session();
        mark_square(&s, "obstacle_layer", 1.5, 1.5);

        assert_eq!(s.handle_line(r#"{"lose_pose": null}"#), json!({}));
        let reply = s.handle_line(r#"{"call": {"service": "clear_entirely_local_costmap"}}"#);
        assert!(reply["error"].as_str().unwrap().contains("robot pose"));
        assert!(non_default(&s, "obstacle_layer") > 0);

        s.handle_line(r#"{"set_pose": {"x": 0.0, "y": 0.0, "yaw": 0.0}}"#);
        let reply = s.handle_line(r#"{"call": {"service": "clear_entirely_local_costmap"}}"#);
        assert_eq!(reply, json!({}));
        assert_eq!(non_default(&s, "obstacle_layer"), 0);
    }

    #[test]
    fn bad_input_is_answered_not_fatal() {
        let s = session();
        assert!(s.handle_line("not json").get("error").is_some());
        assert!(
            s.handle_line(r#"{"inspect": {"layer": "sonar_layer"}}"#)["error"]
                .as_str()
                .unwrap()
                .contains("sonar_layer")
        );
        let off_map = s.handle_line(
            r#"{"mark": {"layer": "obstacle_layer", "polygon": [{"x": 0, "y": 0}, {"x": 9, "y": 0}, {"x": 0, "y": 1}], "cost": 254}}"#,
        );
        assert!(off_map.get("error").is_some());
        assert_eq!(non_default(&s, "obstacle_layer"), 0);
    }

    #[test]
    fn run_answers_each_non_blank_line() {
        let s = session();
        let input = Cursor::new(
            "{\"lose_pose\": null}\n\n{\"call\": {\"service\": \"nope\"}}\n",
        );
        let mut out = Vec::new();
        s.run(input, &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({}));
        assert!(lines[1]["error"].as_str().unwrap().contains("nope"));
    }
}
