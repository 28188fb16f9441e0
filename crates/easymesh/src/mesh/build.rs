//! Vertex and triangle primitives, shape producers and vertex cleanup.

use nalgebra::{Point3, Vector3, Vector4};
use tracing::debug;

use crate::{Triangle, Vertex, VertexAdjacency};

use super::{index, EasyMesh};

/// Box faces as (outward normal, u, v) with `u × v = normal`, so the corners
/// `-u-v, +u-v, +u+v, -u+v` wind counter-clockwise seen from outside.
const BOX_FACES: [[[f32; 3]; 3]; 6] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
    [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
];

const QUAD_CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

impl EasyMesh {
    /// Appends a vertex with color A and a zero normal, returning its index.
    pub fn add_vertex(&mut self, position: Point3<f32>) -> usize {
        self.vertices.push(Vertex::new(position, self.color_a));
        self.vertices.len() - 1
    }

    /// Appends a copy of vertex `source`, returning the copy's index.
    ///
    /// # Panics
    ///
    /// Panics if `source` is out of bounds.
    pub fn add_duplicate_vertex(&mut self, source: usize) -> usize {
        self.vertices.push(self.vertices[source]);
        self.vertices.len() - 1
    }

    /// Sets the normal of the last added vertex.
    pub fn set_current_vertex_normal(&mut self, normal: Vector3<f32>) {
        if let Some(vertex) = self.vertices.last_mut() {
            vertex.normal = normal;
        }
    }

    /// Sets the color of the last added vertex.
    pub fn set_current_vertex_color(&mut self, color: Vector4<f32>) {
        if let Some(vertex) = self.vertices.last_mut() {
            vertex.color = color;
        }
    }

    /// Appends the triangle `(base + i1, base + i2, base + i3)`.
    pub fn append_triangle(&mut self, i1: usize, i2: usize, i3: usize, base: usize) {
        self.indices
            .extend([i1, i2, i3].map(|i| index(base + i)));
    }

    /// Appends the quad `i1 i2 i3 i4` as two triangles sharing the `i1 → i3`
    /// diagonal.
    pub fn append_quad(&mut self, i1: usize, i2: usize, i3: usize, i4: usize, base: usize) {
        self.append_triangle(i1, i2, i3, base);
        self.append_triangle(i1, i3, i4, base);
    }

    /// Like [`append_triangle`](Self::append_triangle), on fresh copies of the
    /// corners so the triangle shares no vertex with its neighbours.
    pub fn append_triangle_duplicate_vertices(&mut self, i1: usize, i2: usize, i3: usize, base: usize) {
        let copies = [i1, i2, i3].map(|i| self.add_duplicate_vertex(base + i));
        self.append_triangle(copies[0], copies[1], copies[2], 0);
    }

    /// Like [`append_quad`](Self::append_quad), on fresh copies of the corners.
    pub fn append_quad_duplicate_vertices(
        &mut self,
        i1: usize,
        i2: usize,
        i3: usize,
        i4: usize,
        base: usize,
    ) {
        let copies = [i1, i2, i3, i4].map(|i| self.add_duplicate_vertex(base + i));
        self.append_quad(copies[0], copies[1], copies[2], copies[3], 0);
    }

    /// Gives the vertices of every triangle in `indices[start..start + count]`
    /// that triangle's face normal.
    ///
    /// Vertices shared by several triangles keep the last one's normal.
    pub fn compute_normals(&mut self, start: usize, count: usize) {
        let end = (start + count).min(self.indices.len());
        for offset in (start..end.saturating_sub(2)).step_by(3) {
            let [a, b, c] = self.triangle_positions(offset);
            let normal = Triangle::new(a, b, c)
                .unit_normal()
                .unwrap_or_else(Vector3::zeros);
            for k in 0..3 {
                self.vertices[self.indices[offset + k] as usize].normal = normal;
            }
        }
    }

    /// Axis-aligned box centered on the origin with extents `size`.
    ///
    /// Every face has its own four vertices so normals stay flat.
    pub fn append_box(&mut self, size: Vector3<f32>) {
        let half = size * 0.5;
        for [normal, u, v] in BOX_FACES {
            let (normal, u, v) = (Vector3::from(normal), Vector3::from(u), Vector3::from(v));
            let base = self.vertices.len();
            for (su, sv) in QUAD_CORNERS {
                self.add_vertex(Point3::from((normal + u * su + v * sv).component_mul(&half)));
                self.set_current_vertex_normal(normal);
            }
            self.append_quad(0, 1, 2, 3, base);
        }
    }

    /// Triangle in the XZ plane facing +Y, inscribed in a circle of radius
    /// `size`. With `fade`, the second and third corners take color B.
    pub fn append_simple_triangle(&mut self, size: f32, fade: bool) {
        let base = self.vertices.len();
        for k in 0..3 {
            let angle = (k as f32 * 120.0).to_radians();
            self.add_vertex(Point3::new(size * angle.sin(), 0.0, size * angle.cos()));
            if fade && k > 0 {
                self.set_current_vertex_color(self.color_b);
            }
        }
        self.append_triangle(0, 1, 2, base);
        self.compute_normals(self.indices.len() - 3, 3);
    }

    /// Square in the XZ plane facing +Y, spanning `[-size, size]` on both
    /// axes. With `fade`, the third and fourth corners take color B.
    pub fn append_simple_quad(&mut self, size: f32, fade: bool) {
        let base = self.vertices.len();
        for (k, (sx, sz)) in QUAD_CORNERS.iter().enumerate() {
            // x and z swapped keeps the quad facing +Y.
            self.add_vertex(Point3::new(size * sz, 0.0, size * sx));
            if fade && k > 1 {
                self.set_current_vertex_color(self.color_b);
            }
        }
        self.append_quad(0, 1, 2, 3, base);
        self.compute_normals(self.indices.len() - 6, 6);
    }

    /// Merges coincident vertices and drops vertices no triangle uses.
    ///
    /// Two vertices merge only when they share a location, normal and color,
    /// and belong to the same brace scope. Survivors keep their relative
    /// order, and cursors are remapped to the compacted vertex list.
    pub fn vertices_cleanup(&mut self) {
        let count = self.vertices.len();
        let epsilon = self.config.epsilon;

        let mut dictionary = VertexAdjacency::with_epsilon(epsilon);
        for (id, vertex) in self.vertices.iter().enumerate() {
            dictionary.register_vertex(id, vertex.position);
        }

        let scope_of = |id: usize| self.cursors.partition_point(|c| c.vertex_count <= id);
        let mut canonical: Vec<usize> = (0..count).collect();
        for id in 0..count {
            let Some(matching) = dictionary.find_matching_vertices(id) else {
                continue;
            };
            let twin = matching.into_iter().filter(|m| *m < id).find(|m| {
                scope_of(*m) == scope_of(id)
                    && self.vertices[*m].same_attributes(&self.vertices[id], epsilon)
            });
            if let Some(twin) = twin {
                canonical[id] = canonical[twin];
            }
        }

        let mut used = vec![false; count];
        for i in &self.indices {
            used[canonical[*i as usize]] = true;
        }

        // remap[id] is the compacted slot of id's canonical vertex.
        let mut remap = vec![0u32; count];
        let mut kept_before = Vec::with_capacity(count + 1);
        let mut kept = Vec::with_capacity(count);
        for id in 0..count {
            kept_before.push(kept.len());
            if canonical[id] == id && used[id] {
                remap[id] = index(kept.len());
                kept.push(self.vertices[id]);
            } else {
                remap[id] = remap[canonical[id]];
            }
        }
        kept_before.push(kept.len());

        for i in &mut self.indices {
            *i = remap[*i as usize];
        }
        for cursor in &mut self.cursors {
            cursor.vertex_count = kept_before[cursor.vertex_count.min(count)];
        }

        debug!(
            before = count,
            after = kept.len(),
            "vertex cleanup"
        );
        self.vertices = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cursor;

    fn unit_box() -> EasyMesh {
        let mut mesh = EasyMesh::new();
        mesh.append_box(Vector3::new(1.0, 1.0, 1.0));
        mesh
    }

    #[test]
    fn box_winds_outward() {
        let mesh = unit_box();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        for offset in (0..mesh.indices().len()).step_by(3) {
            let [a, b, c] = mesh.triangle_positions(offset);
            let tri = Triangle::new(a, b, c);
            let normal = tri.unit_normal().unwrap();
            // Outward: the normal points away from the center.
            assert!(normal.dot(&tri.centroid().coords) > 0.0);
            for k in 0..3 {
                let vertex = mesh.vertices()[mesh.indices()[offset + k] as usize];
                assert!((vertex.normal - normal).norm() < 1e-6);
                assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
            }
        }
    }

    #[test]
    fn simple_shapes_face_up() {
        let mut mesh = EasyMesh::new();
        mesh.set_color_b(Vector4::new(0.0, 0.0, 0.0, 1.0));
        mesh.append_simple_triangle(2.0, true);
        mesh.append_simple_quad(1.0, false);

        assert_eq!(mesh.triangle_count(), 3);
        for vertex in mesh.vertices() {
            assert!((vertex.normal - Vector3::y()).norm() < 1e-6);
            assert_eq!(vertex.position.y, 0.0);
        }
        for vertex in &mesh.vertices()[..3] {
            assert!((vertex.position.coords.norm() - 2.0).abs() < 1e-5);
        }
        assert_eq!(mesh.vertices()[0].color, Vector4::repeat(1.0));
        assert_eq!(mesh.vertices()[2].color, Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn duplicate_vertex_variants() {
        let mut mesh = EasyMesh::new();
        for x in 0..4 {
            mesh.add_vertex(Point3::new(x as f32, 0.0, 0.0));
        }
        mesh.append_triangle_duplicate_vertices(0, 1, 2, 0);
        mesh.append_quad_duplicate_vertices(0, 1, 2, 3, 0);

        assert_eq!(mesh.vertex_count(), 4 + 3 + 4);
        assert_eq!(mesh.indices(), &[4, 5, 6, 7, 8, 9, 7, 9, 10]);
        assert_eq!(mesh.vertices()[10].position, Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn cleanup_merges_matching_vertices() {
        let mut mesh = EasyMesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            mesh.add_vertex(Point3::from(p));
        }
        mesh.append_triangle(0, 1, 2, 0);
        mesh.append_triangle_duplicate_vertices(1, 2, 0, 0);
        mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));

        mesh.vertices_cleanup();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices(), &[0, 1, 2, 1, 2, 0]);
    }

    #[test]
    fn cleanup_keeps_distinct_attributes() {
        let mut mesh = unit_box();
        mesh.vertices_cleanup();
        // Corners are shared by three faces with three different normals.
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn cleanup_respects_scopes() {
        let mut mesh = EasyMesh::new();
        mesh.append_simple_triangle(1.0, false);
        mesh.open_brace();
        mesh.append_simple_triangle(1.0, false);
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));

        mesh.vertices_cleanup();

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(
            mesh.cursors(),
            &[Cursor {
                vertex_count: 3,
                index_count: 3
            }]
        );
    }
}
