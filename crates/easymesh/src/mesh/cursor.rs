//! Braces, build colors and build toggles.

use nalgebra::Vector4;
use tracing::warn;

use super::{Cursor, EasyMesh};

impl EasyMesh {
    /// Starts a new scope: later operations ignore everything built so far.
    pub fn open_brace(&mut self) {
        self.cursors.push(Cursor {
            vertex_count: self.vertices.len(),
            index_count: self.indices.len(),
        });
    }

    /// Merges the current scope back into the enclosing one.
    pub fn close_brace(&mut self) {
        if self.cursors.pop().is_none() {
            warn!("close_brace without a matching open_brace");
        }
    }

    /// Sets both build colors.
    pub fn set_color(&mut self, color: Vector4<f32>) {
        self.set_color_a(color);
        self.set_color_b(color);
    }

    /// Sets the color given to new vertices.
    pub fn set_color_a(&mut self, color: Vector4<f32>) {
        self.color_a = color;
    }

    /// Sets the secondary color used by fading primitives.
    pub fn set_color_b(&mut self, color: Vector4<f32>) {
        self.color_b = color;
    }

    /// Recolors every vertex of the current scope.
    pub fn set_vertex_color(&mut self, color: Vector4<f32>) {
        let start = self.scope().vertex_count;
        for vertex in &mut self.vertices[start..] {
            vertex.color = color;
        }
    }

    /// Toggles winding correction on negative scales.
    pub fn toggle_scale_winding(&mut self) {
        self.config.scale_winding = !self.config.scale_winding;
    }

    /// Toggles vertex cleanup after CSG operations.
    pub fn toggle_vertex_cleanup(&mut self) {
        self.config.vertex_cleanup = !self.config.vertex_cleanup;
    }
}
