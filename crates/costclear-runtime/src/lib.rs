//! `costclear-runtime` – serving clear requests.
//!
//! # Modules
//!
//! - [`service`] – [`ClearCostmapService`][service::ClearCostmapService]:
//!   the three named clear services for one costmap, dispatching JSON
//!   requests to a [`ClearOrchestrator`][costclear_kernel::ClearOrchestrator].
//! - [`bus`] – [`CostmapEventBus`][bus::CostmapEventBus]: broadcasts a
//!   [`CostmapEvent`][costclear_types::CostmapEvent] after every clear.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console
//!   logging plus optional OTLP span export.

pub mod bus;
pub mod service;
pub mod telemetry;

pub use bus::CostmapEventBus;
pub use service::{ClearCostmapService, ServiceError};
pub use telemetry::{LogFormat, TelemetryGuard, init_tracing};
