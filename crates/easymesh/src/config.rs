//! Configuration for the mesh builder and its CSG operations.
//!
//! # Example
//!
//! ```
//! use easymesh::MeshConfig;
//!
//! let config = MeshConfig::default()
//!     .with_epsilon(1e-4)
//!     .with_vertex_cleanup(false);
//! assert!(!config.vertex_cleanup);
//! ```

use serde::{Deserialize, Serialize};

use crate::DEFAULT_EPSILON;

/// Tunables for a mesh builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Tolerance for plane side tests and for treating two vertices as coincident.
    pub epsilon: f32,

    /// Merge duplicated vertices and drop orphaned ones after each CSG operation.
    pub vertex_cleanup: bool,

    /// Flip triangle winding when a scale has a negative determinant.
    pub scale_winding: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            vertex_cleanup: true,
            scale_winding: true,
        }
    }
}

impl MeshConfig {
    /// Set the side-test / coincidence tolerance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enable or disable post-CSG vertex cleanup.
    #[must_use]
    pub const fn with_vertex_cleanup(mut self, enabled: bool) -> Self {
        self.vertex_cleanup = enabled;
        self
    }

    /// Enable or disable winding fix-up on negative scale.
    #[must_use]
    pub const fn with_scale_winding(mut self, enabled: bool) -> Self {
        self.scale_winding = enabled;
        self
    }
}
