//! Transforms applied to the current scope.

use nalgebra::{Rotation3, Unit, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{MasterRef, VertexAdjacency};

use super::{Cursor, EasyMesh};

/// A principal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along the axis.
    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Component index of this axis followed by the two others.
    fn components(self) -> (usize, usize, usize) {
        match self {
            Axis::X => (0, 1, 2),
            Axis::Y => (1, 0, 2),
            Axis::Z => (2, 0, 1),
        }
    }
}

impl EasyMesh {
    pub fn translate(&mut self, offset: Vector3<f32>) {
        let start = self.scope().vertex_count;
        for vertex in &mut self.vertices[start..] {
            vertex.position += offset;
        }
    }

    /// Rotates by `angle` degrees around `axis`, through the origin.
    ///
    /// A zero-length axis leaves the mesh untouched.
    pub fn rotate(&mut self, angle: f32, axis: Vector3<f32>) {
        let Some(axis) = Unit::try_new(axis, f32::EPSILON) else {
            trace!(?axis, "ignoring rotation around a degenerate axis");
            return;
        };
        let rotation = Rotation3::from_axis_angle(&axis, angle.to_radians());
        let start = self.scope().vertex_count;
        for vertex in &mut self.vertices[start..] {
            vertex.position = rotation * vertex.position;
            vertex.normal = rotation * vertex.normal;
        }
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.rotate(angle, Axis::X.unit());
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotate(angle, Axis::Y.unit());
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.rotate(angle, Axis::Z.unit());
    }

    /// Scales positions component-wise.
    ///
    /// Normals are scaled by the inverse factors and renormalized. When the
    /// factors flip handedness the scope's triangles are rewound, unless
    /// scale winding is disabled in the config.
    pub fn scale(&mut self, factors: Vector3<f32>) {
        let inverse = factors.map(|f| if f == 0.0 { 0.0 } else { 1.0 / f });
        let scope = self.scope();
        for vertex in &mut self.vertices[scope.vertex_count..] {
            vertex.position.coords.component_mul_assign(&factors);
            vertex.normal = vertex
                .normal
                .component_mul(&inverse)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
        }

        if self.config.scale_winding && factors.x * factors.y * factors.z < 0.0 {
            for triangle in self.indices[scope.index_count..].chunks_exact_mut(3) {
                triangle.swap(1, 2);
            }
        }
    }

    /// Multiplies y and z by `1 + (n * x + offset)`, `n` being `y` and `z`
    /// respectively.
    pub fn taper_x(&mut self, y: f32, z: f32, offset: f32) {
        self.taper(Axis::X, y, z, offset);
    }

    /// Multiplies x and z by `1 + (n * y + offset)`.
    pub fn taper_y(&mut self, x: f32, z: f32, offset: f32) {
        self.taper(Axis::Y, x, z, offset);
    }

    /// Multiplies x and y by `1 + (n * z + offset)`.
    pub fn taper_z(&mut self, x: f32, y: f32, offset: f32) {
        self.taper(Axis::Z, x, y, offset);
    }

    /// Mirrors a copy of the scope through the X = 0 plane. See
    /// [`dup_and_scale`](Self::dup_and_scale).
    pub fn mirror_x(&mut self) {
        self.dup_and_scale(Vector3::new(-1.0, 1.0, 1.0));
    }

    pub fn mirror_y(&mut self) {
        self.dup_and_scale(Vector3::new(1.0, -1.0, 1.0));
    }

    pub fn mirror_z(&mut self) {
        self.dup_and_scale(Vector3::new(1.0, 1.0, -1.0));
    }

    /// Appends a copy of the current scope and scales only the copy.
    ///
    /// Acts as a brace: afterwards the scope is the copy alone. The top cursor
    /// is moved onto the copy, or a cursor is opened when none is.
    pub fn dup_and_scale(&mut self, factors: Vector3<f32>) {
        let scope = self.scope();
        let vertex_count = self.vertices.len();
        let index_count = self.indices.len();
        let shift = super::index(vertex_count - scope.vertex_count);

        self.vertices.extend_from_within(scope.vertex_count..);
        self.indices.extend_from_within(scope.index_count..);
        for i in &mut self.indices[index_count..] {
            *i += shift;
        }

        let copy = Cursor {
            vertex_count,
            index_count,
        };
        match self.cursors.last_mut() {
            Some(top) => *top = copy,
            None => self.cursors.push(copy),
        }

        self.scale(factors);
    }

    /// Pushes each vertex of the scope away from the origin by a random
    /// factor in `[1, 1 + max)`, drawn from a generator seeded with `seed`.
    ///
    /// Coincident vertices move together. Normals are recomputed.
    pub fn radial_jitter(&mut self, max: f32, seed: u64) {
        if max.is_nan() || max <= 0.0 {
            trace!(max, "ignoring empty jitter range");
            return;
        }
        let scope = self.scope();
        let mut dictionary = VertexAdjacency::with_epsilon(self.config.epsilon);
        for (id, vertex) in self.vertices.iter().enumerate().skip(scope.vertex_count) {
            dictionary.register_vertex(id, vertex.position);
        }

        // Masters register before their followers, so their factor is known.
        let mut rng = StdRng::seed_from_u64(seed);
        let mut factors: Vec<f32> = Vec::with_capacity(self.vertices.len() - scope.vertex_count);
        for id in scope.vertex_count..self.vertices.len() {
            let factor = match dictionary.find_vertex_master(id) {
                MasterRef::Follower(master) => factors[master - scope.vertex_count],
                _ => 1.0 + rng.gen_range(0.0..max),
            };
            factors.push(factor);
        }

        for (vertex, factor) in self.vertices[scope.vertex_count..].iter_mut().zip(factors) {
            vertex.position.coords *= factor;
        }
        self.compute_normals(scope.index_count, self.indices.len() - scope.index_count);
    }

    fn taper(&mut self, axis: Axis, first: f32, second: f32, offset: f32) {
        let (along, a, b) = axis.components();
        let scope = self.scope();
        for vertex in &mut self.vertices[scope.vertex_count..] {
            let t = vertex.position[along];
            vertex.position[a] *= 1.0 + (first * t + offset);
            vertex.position[b] *= 1.0 + (second * t + offset);
        }
        self.compute_normals(scope.index_count, self.indices.len() - scope.index_count);
    }
}
