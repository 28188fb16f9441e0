//! Triangle geometry helpers shared by the tree and the mesh builder.

use nalgebra::{Point3, Vector3};

use crate::Plane3D;

/// A triangle in 3D space, defined by three positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Point3<f32>; 3],
}

impl Triangle {
    /// Creates a new triangle from three points.
    ///
    /// The winding order determines the normal direction via the right-hand rule:
    /// normal = (b - a) × (c - a)
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Returns the three vertices of the triangle.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>; 3] {
        &self.vertices
    }

    /// Computes the (unnormalized) normal vector of the triangle.
    pub fn normal(&self) -> Vector3<f32> {
        let [a, b, c] = &self.vertices;
        (b - a).cross(&(c - a))
    }

    /// Computes the unit normal vector of the triangle.
    ///
    /// Returns `None` if the triangle is degenerate (zero area).
    pub fn unit_normal(&self) -> Option<Vector3<f32>> {
        let n = self.normal();
        let len = n.norm();
        if len > f32::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Area of the triangle.
    pub fn area(&self) -> f32 {
        self.normal().norm() * 0.5
    }

    /// Returns the plane that this triangle lies on, `None` when degenerate.
    pub fn plane(&self) -> Option<Plane3D> {
        let [a, b, c] = self.vertices;
        Plane3D::from_three_points(a, b, c)
    }

    /// Computes the centroid (center of mass) of the triangle.
    pub fn centroid(&self) -> Point3<f32> {
        let [a, b, c] = &self.vertices;
        Point3::from((a.coords + b.coords + c.coords) / 3.0)
    }

    /// First vertex holding a NaN or infinite coordinate, if any.
    pub fn non_finite_vertex(&self) -> Option<Point3<f32>> {
        self.vertices
            .iter()
            .copied()
            .find(|v| !v.iter().all(|c| c.is_finite()))
    }
}

impl From<[Point3<f32>; 3]> for Triangle {
    fn from(vertices: [Point3<f32>; 3]) -> Self {
        Self { vertices }
    }
}
