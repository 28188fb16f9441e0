//! The mesh builder.
//!
//! Geometry is kept as a flat vertex list and a `u32` index list with stride
//! three. Braces push [`Cursor`]s; transforms and color setters only touch
//! what was appended since the last cursor, and CSG combines the last two
//! brace regions.

mod build;
mod csg;
mod cursor;
mod transform;

use nalgebra::{Point3, Vector4};

use crate::{MeshConfig, Vertex};

pub use csg::CsgOperation;
pub use transform::Axis;

/// Mesh sizes recorded when a brace was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub vertex_count: usize,
    pub index_count: usize,
}

/// Procedural mesh accumulating triangles from primitives, transforms and
/// boolean operations.
///
/// ```
/// use easymesh::EasyMesh;
/// use nalgebra::Vector3;
///
/// let mut mesh = EasyMesh::new();
/// mesh.open_brace();
/// mesh.append_box(Vector3::new(2.0, 2.0, 2.0));
/// mesh.open_brace();
/// mesh.append_box(Vector3::new(1.0, 1.0, 1.0));
/// mesh.translate(Vector3::new(1.0, 0.0, 0.0));
/// mesh.csg_substract()?;
/// mesh.close_brace();
/// mesh.close_brace();
///
/// assert!(mesh.triangle_count() > 12);
/// # Ok::<(), easymesh::CsgError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EasyMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    cursors: Vec<Cursor>,
    color_a: Vector4<f32>,
    color_b: Vector4<f32>,
    config: MeshConfig,
}

impl Default for EasyMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl EasyMesh {
    pub fn new() -> Self {
        Self::with_config(MeshConfig::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            cursors: Vec::new(),
            color_a: Vector4::repeat(1.0),
            color_b: Vector4::repeat(1.0),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Open braces, outermost first.
    #[inline]
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn color_a(&self) -> Vector4<f32> {
        self.color_a
    }

    #[inline]
    pub fn color_b(&self) -> Vector4<f32> {
        self.color_b
    }

    /// Interleaved vertex data: position (3), normal (3), color (4) per vertex.
    pub fn vertex_buffer(&self) -> Vec<f32> {
        let mut buffer = Vec::with_capacity(self.vertices.len() * 10);
        for vertex in &self.vertices {
            buffer.extend_from_slice(vertex.position.coords.as_slice());
            buffer.extend_from_slice(vertex.normal.as_slice());
            buffer.extend_from_slice(vertex.color.as_slice());
        }
        buffer
    }

    /// Corner positions of the triangle starting at index `offset`.
    pub(crate) fn triangle_positions(&self, offset: usize) -> [Point3<f32>; 3] {
        [0, 1, 2].map(|k| self.vertices[self.indices[offset + k] as usize].position)
    }

    /// Where the current scope starts: the last cursor, or the mesh start.
    fn scope(&self) -> Cursor {
        self.cursors.last().copied().unwrap_or_default()
    }
}

/// Narrows a vertex position to the index buffer's width.
///
/// # Panics
///
/// Panics if `vertex` does not fit in a `u32`.
#[inline]
fn index(vertex: usize) -> u32 {
    u32::try_from(vertex).expect("vertex index exceeds the u32 index buffer")
}
