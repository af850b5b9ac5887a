//! [`ClearCostmapService`] – named request/acknowledge endpoints.
//!
//! Each costmap exposes three services whose names embed the costmap name:
//!
//! | Service | Request fields |
//! |---|---|
//! | `clear_except_<costmap>` | `reset_distance` |
//! | `clear_around_<costmap>` | `window_size_x`, `window_size_y` |
//! | `clear_entirely_<costmap>` | – |
//!
//! Requests and acknowledgements are JSON; a successful call answers `{}`.
//! Every successful clear is also broadcast on the [`CostmapEventBus`].

use std::collections::HashMap;

use costclear_kernel::ClearOrchestrator;
use costclear_types::{ClearError, ClearReport, ClearRequest, CostmapEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::bus::CostmapEventBus;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No such service: {0}")]
    UnknownService(String),

    #[error("Malformed request for {service}: {source}")]
    BadRequest {
        service: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Clear(#[from] ClearError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearExceptRegionRequest {
    pub reset_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearAroundRobotRequest {
    pub window_size_x: f64,
    pub window_size_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ServiceKind {
    ClearExceptRegion,
    ClearAroundRobot,
    ClearEntirely,
}

pub struct ClearCostmapService {
    orchestrator: ClearOrchestrator,
    bus: CostmapEventBus,
    services: HashMap<String, ServiceKind>,
}

impl ClearCostmapService {
    /// Register the three services for the orchestrator's costmap.
    pub fn new(orchestrator: ClearOrchestrator, bus: CostmapEventBus) -> Self {
        let name = orchestrator.costmap().name().to_string();
        let services = HashMap::from([
            (format!("clear_except_{name}"), ServiceKind::ClearExceptRegion),
            (format!("clear_around_{name}"), ServiceKind::ClearAroundRobot),
            (format!("clear_entirely_{name}"), ServiceKind::ClearEntirely),
        ]);
        info!(costmap = %name, "clear services ready");
        Self {
            orchestrator,
            bus,
            services,
        }
    }

    pub fn orchestrator(&self) -> &ClearOrchestrator {
        &self.orchestrator
    }

    /// Registered service names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decode `payload` for `service`, run the clear, and acknowledge.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::UnknownService`] – `service` is not registered.
    /// - [`ServiceError::BadRequest`] – `payload` does not match the request type.
    /// - [`ServiceError::Clear`] – the clear itself was refused.
    pub fn call(&self, service: &str, payload: Value) -> Result<Value, ServiceError> {
        let kind = *self
            .services
            .get(service)
            .ok_or_else(|| ServiceError::UnknownService(service.to_string()))?;
        debug!(service, "clear request received");

        let bad_request = |source| ServiceError::BadRequest {
            service: service.to_string(),
            source,
        };
        let request = match kind {
            ServiceKind::ClearExceptRegion => {
                let req: ClearExceptRegionRequest =
                    serde_json::from_value(payload).map_err(bad_request)?;
                ClearRequest::ExceptRegion {
                    reset_distance: req.reset_distance,
                }
            }
            ServiceKind::ClearAroundRobot => {
                let req: ClearAroundRobotRequest =
                    serde_json::from_value(payload).map_err(bad_request)?;
                // A zero side becomes a full clear once the orchestrator has
                // validated both sides.
                ClearRequest::AroundRobot {
                    window_size_x: req.window_size_x,
                    window_size_y: req.window_size_y,
                }
            }
            // The request carries no fields.
            ServiceKind::ClearEntirely => ClearRequest::Entire,
        };

        self.handle(request)?;
        Ok(Value::Object(Default::default()))
    }

    /// Typed entry point: run `request` and broadcast the outcome.
    pub fn handle(&self, request: ClearRequest) -> Result<ClearReport, ClearError> {
        let report = self.orchestrator.execute(request)?;
        self.bus.publish(CostmapEvent::new(
            self.orchestrator.costmap().name(),
            report.clone(),
        ));
        Ok(report)
    }
}
