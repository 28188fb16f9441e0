//! Tree construction and triangle classification.

use nalgebra::Point3;
use tracing::trace;

use crate::{side_of_distance, Classification, CsgError, CsgResult, Plane3D, Triangle, DEFAULT_EPSILON};

use super::leaf::{CsgBspLeaf, LeafSlot};
use super::split::{split_triangle, SplitVertex};

/// Side of the tree a classified triangle ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafSide {
    /// Outside the volume bounded by the tree's triangles.
    Front,
    /// Inside the volume bounded by the tree's triangles.
    Back,
}

impl LeafSide {
    fn slot(self) -> LeafSlot {
        match self {
            LeafSide::Front => LeafSlot::Front,
            LeafSide::Back => LeafSlot::Back,
        }
    }
}

/// Where a fragment lying exactly on a splitting plane is sent.
///
/// `same_facing` applies when the fragment's normal points the way the plane
/// does, `opposite_facing` otherwise. The fragment keeps descending through the
/// chosen child, so it is classified by the rest of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoplanarPolicy {
    pub same_facing: LeafSide,
    pub opposite_facing: LeafSide,
}

impl Default for CoplanarPolicy {
    fn default() -> Self {
        Self {
            same_facing: LeafSide::Front,
            opposite_facing: LeafSide::Back,
        }
    }
}

impl CoplanarPolicy {
    pub const fn new(same_facing: LeafSide, opposite_facing: LeafSide) -> Self {
        Self {
            same_facing,
            opposite_facing,
        }
    }

    fn side(&self, same_facing: bool) -> LeafSide {
        if same_facing {
            self.same_facing
        } else {
            self.opposite_facing
        }
    }
}

/// A classified output triangle; vertex indices point into
/// [`TriangleSplit::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedTriangle {
    pub side: LeafSide,
    pub vertices: [usize; 3],
}

/// Whether a tested triangle had to be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    /// The triangle lies on one side of the tree as a whole.
    Whole,
    /// The triangle was cut into pieces landing on both sides.
    Split,
}

/// Result of [`CsgBsp::test_triangle`].
#[derive(Debug, Clone)]
pub struct TriangleSplit {
    outcome: TestOutcome,
    vertices: Vec<SplitVertex>,
    triangles: Vec<ClassifiedTriangle>,
}

impl TriangleSplit {
    fn whole(mut vertices: Vec<SplitVertex>, side: LeafSide) -> Self {
        vertices.truncate(3);
        Self {
            outcome: TestOutcome::Whole,
            vertices,
            triangles: vec![ClassifiedTriangle {
                side,
                vertices: [0, 1, 2],
            }],
        }
    }

    #[inline]
    pub fn outcome(&self) -> TestOutcome {
        self.outcome
    }

    #[inline]
    pub fn is_split(&self) -> bool {
        self.outcome == TestOutcome::Split
    }

    /// All points, the three input corners first.
    #[inline]
    pub fn vertices(&self) -> &[SplitVertex] {
        &self.vertices
    }

    /// Points created by the split.
    #[inline]
    pub fn new_vertices(&self) -> &[SplitVertex] {
        &self.vertices[3..]
    }

    #[inline]
    pub fn triangles(&self) -> &[ClassifiedTriangle] {
        &self.triangles
    }
}

/// Binary space partition over the triangles of one mesh region.
///
/// Leaves live in a flat arena and reference their children by index. The
/// tree only grows: it is built once per CSG operation and dropped after it.
///
/// ```
/// use easymesh::{CsgBsp, LeafSide};
/// use nalgebra::Point3;
///
/// let mut tree = CsgBsp::new();
/// tree.add_triangle(
///     0,
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// )?;
///
/// let below = tree.test_triangle(
///     Point3::new(0.0, 0.0, -1.0),
///     Point3::new(1.0, 0.0, -1.0),
///     Point3::new(0.0, 1.0, -1.0),
/// )?;
/// assert!(!below.is_split());
/// assert_eq!(below.triangles()[0].side, LeafSide::Back);
/// # Ok::<(), easymesh::CsgError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CsgBsp {
    leaves: Vec<CsgBspLeaf>,
    epsilon: f32,
    coplanar: CoplanarPolicy,
}

impl Default for CsgBsp {
    fn default() -> Self {
        Self::new()
    }
}

/// Work item: a leaf to test against and a triangle of indexed points.
type Pending = Vec<(usize, [usize; 3])>;

impl CsgBsp {
    /// Creates an empty tree using [`DEFAULT_EPSILON`].
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Creates an empty tree with a custom side-test tolerance.
    pub fn with_epsilon(epsilon: f32) -> Self {
        Self {
            leaves: Vec::new(),
            epsilon,
            coplanar: CoplanarPolicy::default(),
        }
    }

    /// Sets how coplanar fragments are routed during [`test_triangle`](Self::test_triangle).
    #[must_use]
    pub fn with_coplanar_policy(mut self, policy: CoplanarPolicy) -> Self {
        self.coplanar = policy;
        self
    }

    #[inline]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[inline]
    pub fn coplanar_policy(&self) -> CoplanarPolicy {
        self.coplanar
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of leaves, including the ones chained on a shared plane.
    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Longest front/back path from the root (0 for an empty tree).
    pub fn depth(&self) -> usize {
        if self.leaves.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((leaf, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for slot in [LeafSlot::Front, LeafSlot::Back] {
                if let Some(child) = self.leaves[leaf].child(slot) {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Inserts triangle `triangle` with corners `p0`, `p1`, `p2`.
    ///
    /// A triangle straddling a plane is cut and each piece keeps descending
    /// on its own side. A triangle lying on a plane joins that leaf's chain of
    /// coplanar leaves. Degenerate triangles are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CsgError::NonFiniteVertex`] for NaN or infinite coordinates.
    pub fn add_triangle(
        &mut self,
        triangle: usize,
        p0: Point3<f32>,
        p1: Point3<f32>,
        p2: Point3<f32>,
    ) -> CsgResult<()> {
        let shape = Triangle::new(p0, p1, p2);
        ensure_finite(&shape)?;
        let Some(plane) = shape.plane() else {
            trace!(triangle, "skipping degenerate triangle");
            return Ok(());
        };

        if self.leaves.is_empty() {
            self.leaves.push(CsgBspLeaf::new(plane, triangle));
            return Ok(());
        }

        let mut points = corners(p0, p1, p2);
        let mut pending: Pending = vec![(0, [0, 1, 2])];

        while let Some((leaf, fragment)) = pending.pop() {
            let distances = {
                let leaf_plane = self.leaves[leaf].plane();
                fragment.map(|v| leaf_plane.signed_distance(points[v].position))
            };
            let sides = distances.map(|d| side_of_distance(d, self.epsilon));

            match Classification::from_sides(&sides) {
                Classification::Front => {
                    self.descend(leaf, LeafSlot::Front, fragment, &plane, triangle, &mut pending)
                }
                Classification::Back => {
                    self.descend(leaf, LeafSlot::Back, fragment, &plane, triangle, &mut pending)
                }
                Classification::Coplanar => {
                    if !self.leaves[leaf].generated_by(triangle) {
                        self.chain_above(leaf, &plane, triangle);
                    }
                }
                Classification::Spanning => {
                    let parts = split_triangle(&mut points, fragment, distances, self.epsilon);
                    for piece in parts.front {
                        self.descend(leaf, LeafSlot::Front, piece, &plane, triangle, &mut pending);
                    }
                    for piece in parts.back {
                        self.descend(leaf, LeafSlot::Back, piece, &plane, triangle, &mut pending);
                    }
                }
            }
        }

        Ok(())
    }

    /// Classifies a triangle against the whole tree.
    ///
    /// Each piece walks down the tree and is tagged with the side of the
    /// missing child it falls out through. If pieces end on different sides
    /// the result is [`TestOutcome::Split`] and carries every created point;
    /// otherwise the triangle is reported whole with its single side.
    ///
    /// # Errors
    ///
    /// Returns [`CsgError::NonFiniteVertex`] for NaN or infinite coordinates
    /// and [`CsgError::Classification`] if the tree is inconsistent.
    pub fn test_triangle(
        &self,
        p0: Point3<f32>,
        p1: Point3<f32>,
        p2: Point3<f32>,
    ) -> CsgResult<TriangleSplit> {
        let shape = Triangle::new(p0, p1, p2);
        ensure_finite(&shape)?;

        let mut vertices = corners(p0, p1, p2);
        if self.leaves.is_empty() {
            return Ok(TriangleSplit::whole(vertices, LeafSide::Front));
        }

        let normal = shape.normal();
        let mut pending: Pending = vec![(0, [0, 1, 2])];
        let mut triangles = Vec::new();
        let mut was_cut = false;

        while let Some((index, fragment)) = pending.pop() {
            let leaf = self.leaves.get(index).ok_or_else(|| CsgError::Classification {
                details: format!("leaf {index} missing from a tree of {}", self.leaves.len()),
            })?;
            let distances = fragment.map(|v| leaf.plane().signed_distance(vertices[v].position));
            let sides = distances.map(|d| side_of_distance(d, self.epsilon));

            match Classification::from_sides(&sides) {
                Classification::Front => {
                    route(leaf, LeafSide::Front, fragment, &mut pending, &mut triangles)
                }
                Classification::Back => {
                    route(leaf, LeafSide::Back, fragment, &mut pending, &mut triangles)
                }
                Classification::Coplanar => {
                    let side = self.coplanar.side(normal.dot(&leaf.plane().normal()) > 0.0);
                    route(leaf, side, fragment, &mut pending, &mut triangles);
                }
                Classification::Spanning => {
                    was_cut = true;
                    let parts = split_triangle(&mut vertices, fragment, distances, self.epsilon);
                    for piece in parts.front {
                        route(leaf, LeafSide::Front, piece, &mut pending, &mut triangles);
                    }
                    for piece in parts.back {
                        route(leaf, LeafSide::Back, piece, &mut pending, &mut triangles);
                    }
                }
            }
        }

        let first = triangles
            .first()
            .map(|t| t.side)
            .ok_or_else(|| CsgError::Classification {
                details: "no fragment left the tree".to_string(),
            })?;

        if !was_cut || triangles.iter().all(|t| t.side == first) {
            return Ok(TriangleSplit::whole(vertices, first));
        }

        Ok(TriangleSplit {
            outcome: TestOutcome::Split,
            vertices,
            triangles,
        })
    }

    /// Moves a fragment into `slot`, growing a leaf there if it is empty.
    fn descend(
        &mut self,
        leaf: usize,
        slot: LeafSlot,
        fragment: [usize; 3],
        plane: &Plane3D,
        triangle: usize,
        pending: &mut Pending,
    ) {
        match self.leaves[leaf].child(slot) {
            Some(child) => pending.push((child, fragment)),
            None => {
                let created = self.push_leaf(plane, triangle);
                self.leaves[leaf].set_child(slot, created);
            }
        }
    }

    /// Appends a leaf at the end of `leaf`'s coplanar chain.
    fn chain_above(&mut self, leaf: usize, plane: &Plane3D, triangle: usize) {
        let mut tail = leaf;
        while let Some(next) = self.leaves[tail].child(LeafSlot::Above) {
            if self.leaves[next].generated_by(triangle) {
                return;
            }
            tail = next;
        }
        let created = self.push_leaf(plane, triangle);
        self.leaves[tail].set_child(LeafSlot::Above, created);
    }

    fn push_leaf(&mut self, plane: &Plane3D, triangle: usize) -> usize {
        self.leaves.push(CsgBspLeaf::new(plane.clone(), triangle));
        self.leaves.len() - 1
    }
}

fn route(
    leaf: &CsgBspLeaf,
    side: LeafSide,
    fragment: [usize; 3],
    pending: &mut Pending,
    out: &mut Vec<ClassifiedTriangle>,
) {
    match leaf.child(side.slot()) {
        Some(child) => pending.push((child, fragment)),
        None => out.push(ClassifiedTriangle {
            side,
            vertices: fragment,
        }),
    }
}

fn corners(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Vec<SplitVertex> {
    let mut points = Vec::with_capacity(8);
    points.extend([p0, p1, p2].iter().enumerate().map(|(i, p)| SplitVertex::corner(i, *p)));
    points
}

fn ensure_finite(triangle: &Triangle) -> CsgResult<()> {
    match triangle.non_finite_vertex() {
        Some(position) => Err(CsgError::NonFiniteVertex { position }),
        None => Ok(()),
    }
}
