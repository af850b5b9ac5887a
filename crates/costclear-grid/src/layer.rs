//! Layers of a [`LayeredCostmap`][crate::layered::LayeredCostmap].
//!
//! A [`Layer`] is anything that can sit in the stack and be reset. Layers
//! that own a [`CostGrid`] advertise it through [`Layer::costmap`]; only
//! those take part in partial clears.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::costmap::CostGrid;

/// A [`CostGrid`] behind the layer's own mutex.
///
/// Sensor-update threads and clear operations coordinate solely through
/// [`SharedGrid::lock`]. A poisoned lock is recovered rather than
/// propagated: the grid holds plain cells and stays usable.
#[derive(Debug)]
pub struct SharedGrid(Mutex<CostGrid>);

impl SharedGrid {
    pub fn new(grid: CostGrid) -> Self {
        Self(Mutex::new(grid))
    }

    pub fn lock(&self) -> MutexGuard<'_, CostGrid> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One named member of the layer stack.
pub trait Layer: Send + Sync {
    /// Hierarchical name, e.g. `"local_costmap/obstacle_layer"`.
    fn name(&self) -> &str;

    /// Return the layer to its initial state.
    fn reset(&self);

    /// The grid this layer writes to, if it has one.
    fn costmap(&self) -> Option<&SharedGrid> {
        None
    }
}

/// A layer backed by its own [`CostGrid`].
#[derive(Debug)]
pub struct CostmapLayer {
    name: String,
    grid: SharedGrid,
}

impl CostmapLayer {
    pub fn new(name: impl Into<String>, grid: CostGrid) -> Self {
        Self {
            name: name.into(),
            grid: SharedGrid::new(grid),
        }
    }

    pub fn grid(&self) -> &SharedGrid {
        &self.grid
    }
}

impl Layer for CostmapLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&self) {
        self.grid.lock().reset();
    }

    fn costmap(&self) -> Option<&SharedGrid> {
        Some(&self.grid)
    }
}
