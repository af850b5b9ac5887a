//! Builds the in-process layer stack described by [`Config`].

use std::sync::Arc;

use costclear_grid::{CostGrid, CostmapLayer, GridError, GridGeometry, LayeredCostmap};

use crate::config::Config;

/// One [`CostmapLayer`] per entry of `cfg.layers`, named
/// `"<costmap_name>/<layer>"`, all sharing the configured geometry and
/// default value.
pub fn build(cfg: &Config) -> Result<Arc<LayeredCostmap>, GridError> {
    let g = &cfg.grid;
    let geometry = GridGeometry::new(g.size_x, g.size_y, g.resolution, g.origin_x, g.origin_y)?;

    let mut stack = LayeredCostmap::new(cfg.costmap_name.clone(), geometry, g.default_value);
    for layer in &cfg.layers {
        let name = format!("{}/{}", cfg.costmap_name, layer);
        stack.add_layer(Arc::new(CostmapLayer::new(
            name,
            CostGrid::new(geometry, g.default_value),
        )));
    }
    tracing::debug!(
        costmap = %cfg.costmap_name,
        layers = cfg.layers.len(),
        "layer stack built"
    );
    Ok(Arc::new(stack))
}
