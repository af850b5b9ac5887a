//! `costclear-kernel` – selective costmap clearing.
//!
//! Decides which cells of which layers a clear command resets, and does the
//! reset under the right locks.
//!
//! # Modules
//!
//! - [`orchestrator`] – [`ClearOrchestrator`][orchestrator::ClearOrchestrator]:
//!   the three clear operations (except region, around robot, entirely).
//! - [`layer_filter`] – [`LayerFilter`][layer_filter::LayerFilter]: the
//!   allow-list of clearable layer names.
//! - [`region`] – world-frame polygons for the preserved region and the
//!   clearing window.
//! - [`bounds`] – dirty-bounds update after an except-region clear.
//! - [`pose`] – the [`PoseSource`][pose::PoseSource] seam and a shared,
//!   settable implementation.

pub mod bounds;
pub mod layer_filter;
pub mod orchestrator;
pub mod pose;
pub mod region;

pub use layer_filter::LayerFilter;
pub use orchestrator::ClearOrchestrator;
pub use pose::{PoseSource, SharedPose};
