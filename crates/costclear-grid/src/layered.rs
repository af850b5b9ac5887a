//! [`LayeredCostmap`] – the ordered layer stack and its stack-wide lock.
//!
//! The master grid's mutex doubles as the coarse lock over the whole stack.
//! Holding a [`StackGuard`] is the only way to call
//! [`StackGuard::reset_layers`]. Lock order is always stack first, then one
//! layer at a time.

use std::sync::{Arc, MutexGuard};

use crate::costmap::CostGrid;
use crate::layer::{Layer, SharedGrid};
use crate::transform::GridGeometry;

pub struct LayeredCostmap {
    name: String,
    default_value: u8,
    master: SharedGrid,
    layers: Vec<Arc<dyn Layer>>,
}

impl LayeredCostmap {
    /// Create an empty stack whose master grid uses `geometry` and
    /// `default_value`.
    pub fn new(name: impl Into<String>, geometry: GridGeometry, default_value: u8) -> Self {
        Self {
            name: name.into(),
            default_value,
            master: SharedGrid::new(CostGrid::new(geometry, default_value)),
            layers: Vec::new(),
        }
    }

    /// Append a layer on top of the stack.
    pub fn add_layer(&mut self, layer: Arc<dyn Layer>) {
        self.layers.push(layer);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reset value of the master grid.
    pub fn default_value(&self) -> u8 {
        self.default_value
    }

    /// Layers in stack order, bottom first.
    pub fn layers(&self) -> &[Arc<dyn Layer>] {
        &self.layers
    }

    /// Look a layer up by its full name.
    pub fn layer(&self, name: &str) -> Option<&Arc<dyn Layer>> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// Take the stack-wide lock.
    ///
    /// Must not be called while the same thread holds any layer lock.
    pub fn lock(&self) -> StackGuard<'_> {
        StackGuard {
            master: self.master.lock(),
            layers: &self.layers,
        }
    }
}

/// Proof that the stack-wide lock is held.
pub struct StackGuard<'a> {
    master: MutexGuard<'a, CostGrid>,
    layers: &'a [Arc<dyn Layer>],
}

impl StackGuard<'_> {
    /// Reset the master grid and every layer, taking each layer lock in turn.
    pub fn reset_layers(&mut self) {
        self.master.reset();
        for layer in self.layers {
            layer.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::CostmapLayer;

    struct FootprintLayer {
        resets: std::sync::atomic::AtomicUsize,
    }

    impl Layer for FootprintLayer {
        fn name(&self) -> &str {
            "local_costmap/footprint_layer"
        }
        fn reset(&self) {
            self.resets
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn geometry() -> GridGeometry {
        GridGeometry::new(8, 8, 0.5, -2.0, -2.0).unwrap()
    }

    #[test]
    fn layers_keep_insertion_order() {
        let mut stack = LayeredCostmap::new("local_costmap", geometry(), 0);
        for n in ["static_layer", "obstacle_layer", "inflation_layer"] {
            stack.add_layer(Arc::new(CostmapLayer::new(
                format!("local_costmap/{n}"),
                CostGrid::new(geometry(), 0),
            )));
        }
        let names: Vec<_> = stack.layers().iter().map(|l| l.name()).collect();
        assert_eq!(
            names,
            [
                "local_costmap/static_layer",
                "local_costmap/obstacle_layer",
                "local_costmap/inflation_layer"
            ]
        );
        assert!(stack.layer("local_costmap/obstacle_layer").is_some());
        assert!(stack.layer("obstacle_layer").is_none());
    }

    #[test]
    fn reset_layers_resets_each_to_its_own_default() {
        let mut stack = LayeredCostmap::new("local_costmap", geometry(), 0);
        let free = Arc::new(CostmapLayer::new("a", CostGrid::new(geometry(), 0)));
        let unknown = Arc::new(CostmapLayer::new("b", CostGrid::new(geometry(), 255)));
        let footprint = Arc::new(FootprintLayer {
            resets: Default::default(),
        });
        stack.add_layer(free.clone());
        stack.add_layer(unknown.clone());
        stack.add_layer(footprint.clone());

        free.grid().lock().fill(100);
        unknown.grid().lock().fill(100);

        stack.lock().reset_layers();

        assert!(free.grid().lock().cells().iter().all(|&c| c == 0));
        assert!(unknown.grid().lock().cells().iter().all(|&c| c == 255));
        assert_eq!(
            footprint.resets.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }
}
