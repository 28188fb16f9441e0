//! Boolean operations between the last two brace regions.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CoplanarPolicy, CsgBsp, CsgResult, LeafSide, TriangleSplit, Vertex};

use super::{index, Cursor, EasyMesh};

/// Boolean operation combining two mesh regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsgOperation {
    /// Outside of both regions.
    Union,
    /// First region's outside plus the second's inside, turned inward.
    Substract,
    /// First region's outside only; the hole is left open.
    SubstractLoss,
    /// Inside of both regions.
    And,
    /// Outside of both plus both insides turned inward.
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Keep,
    Discard,
    Invert,
}

impl CsgOperation {
    /// What happens to a triangle of `operand` classified on `side` of the
    /// other region.
    fn fate(self, operand: Operand, side: LeafSide) -> Fate {
        use CsgOperation::*;
        use LeafSide::{Back, Front};
        use Operand::{First, Second};

        match (self, operand, side) {
            (Union, _, Back) => Fate::Discard,
            (Substract, First, Back) => Fate::Discard,
            (Substract, Second, Front) => Fate::Discard,
            (Substract, Second, Back) => Fate::Invert,
            (SubstractLoss, First, Back) | (SubstractLoss, Second, _) => Fate::Discard,
            (And, _, Front) => Fate::Discard,
            (Xor, _, Back) => Fate::Invert,
            _ => Fate::Keep,
        }
    }

    /// Routing of `operand`'s triangles lying on a face of the other region,
    /// chosen so a shared face survives at most once.
    fn coplanar_policy(self, operand: Operand) -> CoplanarPolicy {
        use LeafSide::{Back, Front};

        match (self, operand) {
            (CsgOperation::Union | CsgOperation::Xor, Operand::First) => CoplanarPolicy::new(Front, Back),
            (CsgOperation::Union | CsgOperation::Xor, Operand::Second) => CoplanarPolicy::new(Back, Back),
            (_, Operand::First) => CoplanarPolicy::new(Back, Front),
            (_, Operand::Second) => CoplanarPolicy::new(Front, Front),
        }
    }
}

/// Per-operation counters reported once the operation is committed.
#[derive(Debug, Default)]
struct CsgStats {
    split: usize,
    inverted: usize,
}

impl EasyMesh {
    /// Keeps the outside of both regions.
    pub fn csg_union(&mut self) -> CsgResult<()> {
        self.mesh_csg(CsgOperation::Union)
    }

    /// Carves the last region out of the one before it.
    pub fn csg_substract(&mut self) -> CsgResult<()> {
        self.mesh_csg(CsgOperation::Substract)
    }

    /// Like [`csg_substract`](Self::csg_substract) without closing the hole.
    pub fn csg_substract_loss(&mut self) -> CsgResult<()> {
        self.mesh_csg(CsgOperation::SubstractLoss)
    }

    /// Keeps the volume common to both regions.
    pub fn csg_and(&mut self) -> CsgResult<()> {
        self.mesh_csg(CsgOperation::And)
    }

    /// Keeps both outsides and turns both insides inward.
    pub fn csg_xor(&mut self) -> CsgResult<()> {
        self.mesh_csg(CsgOperation::Xor)
    }

    /// Combines the last two brace regions.
    ///
    /// The first region spans the indices from the second-to-last cursor (or
    /// the mesh start) to the last cursor; the second region runs from the
    /// last cursor to the end. Each region is classified against a tree of the
    /// other, straddling triangles are cut, and the pieces are kept, dropped
    /// or turned inward depending on `operation`. The last cursor is then
    /// moved to the end of the mesh.
    ///
    /// Without an open brace or with an empty second region nothing happens.
    ///
    /// # Errors
    ///
    /// Fails on non-finite vertex positions. Every triangle is classified
    /// before the mesh is modified, so an error leaves the mesh untouched.
    pub fn mesh_csg(&mut self, operation: CsgOperation) -> CsgResult<()> {
        let Some(last) = self.cursors.last().copied() else {
            warn!(?operation, "csg needs an open brace, nothing to combine");
            return Ok(());
        };
        let start = match self.cursors.len() {
            n if n >= 2 => self.cursors[n - 2].index_count,
            _ => 0,
        };
        let first = start..last.index_count;
        let second = last.index_count..self.indices.len();
        if second.is_empty() {
            debug!(?operation, "second csg region is empty");
            return Ok(());
        }

        let tree_first = self
            .build_tree(first.clone())?
            .with_coplanar_policy(operation.coplanar_policy(Operand::Second));
        let tree_second = self
            .build_tree(second.clone())?
            .with_coplanar_policy(operation.coplanar_policy(Operand::First));

        let classified = [
            (Operand::First, self.classify_region(first.clone(), &tree_second)?),
            (Operand::Second, self.classify_region(second.clone(), &tree_first)?),
        ];

        let mut doomed = Vec::new();
        let mut stats = CsgStats::default();
        for (operand, results) in classified {
            for (offset, split) in results {
                self.commit(operation, operand, offset, &split, &mut doomed, &mut stats);
            }
        }

        let removed = self.remove_triangles(doomed);
        if let Some(top) = self.cursors.last_mut() {
            *top = Cursor {
                vertex_count: self.vertices.len(),
                index_count: self.indices.len(),
            };
        }

        debug!(
            ?operation,
            first = first.len() / 3,
            second = second.len() / 3,
            split = stats.split,
            inverted = stats.inverted,
            removed,
            remaining = self.triangle_count(),
            "csg applied"
        );

        if self.config.vertex_cleanup {
            self.vertices_cleanup();
        }
        Ok(())
    }

    fn build_tree(&self, region: Range<usize>) -> CsgResult<CsgBsp> {
        let mut tree = CsgBsp::with_epsilon(self.config.epsilon);
        for offset in region.step_by(3) {
            let [p0, p1, p2] = self.triangle_positions(offset);
            tree.add_triangle(offset, p0, p1, p2)?;
        }
        Ok(tree)
    }

    fn classify_region(
        &self,
        region: Range<usize>,
        tree: &CsgBsp,
    ) -> CsgResult<Vec<(usize, TriangleSplit)>> {
        region
            .step_by(3)
            .map(|offset| {
                let [p0, p1, p2] = self.triangle_positions(offset);
                Ok((offset, tree.test_triangle(p0, p1, p2)?))
            })
            .collect()
    }

    /// Applies one classification: appends split geometry, then keeps, marks
    /// or inverts every resulting triangle.
    fn commit(
        &mut self,
        operation: CsgOperation,
        operand: Operand,
        offset: usize,
        split: &TriangleSplit,
        doomed: &mut Vec<usize>,
        stats: &mut CsgStats,
    ) {
        let mut results = Vec::with_capacity(split.triangles().len());
        if split.is_split() {
            stats.split += 1;
            doomed.push(offset);

            let corners = [0, 1, 2].map(|k| self.indices[offset + k]);
            let base = self.vertices.len();
            let resolve = |local: usize| {
                if local < 3 {
                    corners[local]
                } else {
                    index(base + local - 3)
                }
            };

            for point in split.new_vertices() {
                let a = self.vertices[resolve(point.sources[0]) as usize];
                let b = self.vertices[resolve(point.sources[1]) as usize];
                self.vertices
                    .push(Vertex::interpolated(&a, &b, point.position, point.alpha));
            }
            for piece in split.triangles() {
                results.push((self.indices.len(), piece.side));
                self.indices.extend(piece.vertices.map(resolve));
            }
        } else if let Some(whole) = split.triangles().first() {
            results.push((offset, whole.side));
        }

        for (triangle, side) in results {
            match operation.fate(operand, side) {
                Fate::Keep => {}
                Fate::Discard => doomed.push(triangle),
                Fate::Invert => {
                    stats.inverted += 1;
                    self.invert_triangle(triangle, operation == CsgOperation::Xor);
                }
            }
        }
    }

    /// Reverses a triangle's winding and refreshes its normals, optionally on
    /// fresh copies of its vertices.
    fn invert_triangle(&mut self, offset: usize, duplicate: bool) {
        if duplicate {
            for k in 0..3 {
                let copy = self.add_duplicate_vertex(self.indices[offset + k] as usize);
                self.indices[offset + k] = index(copy);
            }
        }
        self.indices.swap(offset + 1, offset + 2);
        self.compute_normals(offset, 3);
    }

    /// Removes the triangles starting at the given index offsets.
    fn remove_triangles(&mut self, mut doomed: Vec<usize>) -> usize {
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return 0;
        }

        let mut pending = doomed.iter().peekable();
        let mut kept = Vec::with_capacity(self.indices.len().saturating_sub(doomed.len() * 3));
        for (t, triangle) in self.indices.chunks_exact(3).enumerate() {
            if pending.next_if_eq(&&(t * 3)).is_some() {
                continue;
            }
            kept.extend_from_slice(triangle);
        }
        self.indices = kept;
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Triangle;
    use nalgebra::{Point3, Vector3};

    fn two_triangles() -> EasyMesh {
        let mut mesh = EasyMesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            mesh.add_vertex(Point3::from(p));
        }
        mesh.append_triangle(0, 1, 2, 0);
        mesh.append_triangle(0, 1, 3, 0);
        mesh
    }

    #[test]
    fn truth_table() {
        use CsgOperation::*;
        use LeafSide::{Back, Front};
        use Operand::{First, Second};

        assert_eq!(Union.fate(First, Front), Fate::Keep);
        assert_eq!(Union.fate(Second, Back), Fate::Discard);
        assert_eq!(Substract.fate(First, Front), Fate::Keep);
        assert_eq!(Substract.fate(Second, Front), Fate::Discard);
        assert_eq!(Substract.fate(Second, Back), Fate::Invert);
        assert_eq!(SubstractLoss.fate(Second, Back), Fate::Discard);
        assert_eq!(SubstractLoss.fate(First, Front), Fate::Keep);
        assert_eq!(And.fate(First, Back), Fate::Keep);
        assert_eq!(And.fate(Second, Front), Fate::Discard);
        assert_eq!(Xor.fate(First, Back), Fate::Invert);
        assert_eq!(Xor.fate(Second, Front), Fate::Keep);
    }

    #[test]
    fn remove_triangles_keeps_stride() {
        let mut mesh = two_triangles();
        mesh.append_triangle(1, 2, 3, 0);

        assert_eq!(mesh.remove_triangles(vec![3, 0, 3]), 2);
        assert_eq!(mesh.indices(), &[1, 2, 3]);
        assert_eq!(mesh.remove_triangles(Vec::new()), 0);
    }

    #[test]
    fn invert_swaps_and_recomputes() {
        let mut mesh = two_triangles();
        mesh.compute_normals(0, 3);
        mesh.invert_triangle(0, false);

        assert_eq!(&mesh.indices()[..3], &[0, 2, 1]);
        assert!((mesh.vertices()[2].normal + Vector3::z()).norm() < 1e-6);

        mesh.invert_triangle(3, true);
        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(&mesh.indices()[3..], &[4, 6, 5]);
    }

    #[test]
    fn no_brace_is_a_no_op() {
        let mut mesh = two_triangles();
        mesh.csg_union().unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.cursors().is_empty());
    }

    #[test]
    fn empty_second_region_is_a_no_op() {
        let mut mesh = two_triangles();
        mesh.open_brace();
        mesh.csg_and().unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn failure_leaves_mesh_untouched() {
        let mut mesh = EasyMesh::new();
        mesh.open_brace();
        mesh.append_box(Vector3::new(1.0, 1.0, 1.0));
        mesh.open_brace();
        mesh.append_simple_triangle(1.0, false);
        mesh.translate(Vector3::new(f32::NAN, 0.0, 0.0));

        let before = mesh.indices().to_vec();
        assert!(mesh.csg_union().is_err());
        assert_eq!(mesh.indices(), before.as_slice());
        assert_eq!(mesh.cursors().len(), 2);
    }

    #[test]
    fn union_cuts_crossing_triangle() {
        // A floor quad on z = 0, crossed by a vertical triangle.
        let mut mesh = EasyMesh::new();
        mesh.open_brace();
        mesh.append_simple_quad(2.0, false);
        mesh.rotate_x(90.0);
        mesh.open_brace();
        mesh.append_simple_triangle(1.0, false);

        mesh.csg_union().unwrap();

        // The floor faces +z and the triangle +y: each keeps only what lies in
        // front of the other.
        let cursors = mesh.cursors();
        assert_eq!(cursors.len(), 2);
        assert_eq!(cursors[1].index_count, mesh.indices().len());
        assert_eq!(cursors[1].vertex_count, mesh.vertex_count());

        let centroids: Vec<_> = (0..mesh.indices().len())
            .step_by(3)
            .map(|offset| {
                let [a, b, c] = mesh.triangle_positions(offset);
                Triangle::new(a, b, c).centroid()
            })
            .collect();
        assert!(centroids.iter().all(|c| c.y > -1e-5 && c.z > -1e-5));
        assert!(centroids.iter().any(|c| c.z > 0.1));
        assert!(centroids.iter().any(|c| c.y > 0.1));
    }
}
