//! [`LayerFilter`] – decides which layers a partial clear may touch.
//!
//! Layer names are hierarchical (`"local_costmap/obstacle_layer"`); only the
//! segment after the last `/` is compared with the configured allow-list.
//! Layers that do not match are skipped silently.

use std::collections::HashSet;
use std::sync::Arc;

use costclear_grid::Layer;

/// Allow-list of clearable layer names.
///
/// # Example
///
/// ```
/// use costclear_kernel::layer_filter::LayerFilter;
///
/// let filter = LayerFilter::new(["obstacle_layer", "voxel_layer"]);
///
/// assert!(filter.is_clearable("local_costmap/obstacle_layer"));
/// assert!(filter.is_clearable("voxel_layer"));
/// assert!(!filter.is_clearable("local_costmap/static_layer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayerFilter {
    clearable: HashSet<String>,
}

impl LayerFilter {
    pub fn new<I, S>(clearable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            clearable: clearable.into_iter().map(Into::into).collect(),
        }
    }

    /// The segment of `name` after its last `/`, or `name` itself.
    pub fn trailing_name(name: &str) -> &str {
        name.rsplit_once('/').map_or(name, |(_, tail)| tail)
    }

    pub fn is_clearable(&self, layer_name: &str) -> bool {
        self.clearable.contains(Self::trailing_name(layer_name))
    }

    /// The clearable subset of `layers`, in stack order.
    pub fn select<'a>(&self, layers: &'a [Arc<dyn Layer>]) -> Vec<&'a Arc<dyn Layer>> {
        layers
            .iter()
            .filter(|layer| self.is_clearable(layer.name()))
            .collect()
    }
}
