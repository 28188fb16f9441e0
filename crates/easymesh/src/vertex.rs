//! Mesh vertex attributes.

use nalgebra::{Point3, Vector3, Vector4};

/// A mesh vertex: position, normal and RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub color: Vector4<f32>,
}

impl Vertex {
    /// Creates a vertex with a zero normal.
    pub fn new(position: Point3<f32>, color: Vector4<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            color,
        }
    }

    /// Builds the vertex sitting at `position` on the edge `a → b`, `alpha`
    /// being the fraction travelled from `a`.
    ///
    /// The normal is the renormalized linear blend of both normals; it falls
    /// back to zero when the blend cancels out.
    pub fn interpolated(a: &Vertex, b: &Vertex, position: Point3<f32>, alpha: f32) -> Self {
        let blend = a.normal + (b.normal - a.normal) * alpha;
        Self {
            position,
            normal: blend.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros),
            color: a.color + (b.color - a.color) * alpha,
        }
    }

    /// True when normal and color both match `other` within `epsilon`.
    pub fn same_attributes(&self, other: &Vertex, epsilon: f32) -> bool {
        (self.normal - other.normal).norm() <= epsilon && (self.color - other.color).norm() <= epsilon
    }
}
