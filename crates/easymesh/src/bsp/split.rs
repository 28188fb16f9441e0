//! Splitting of indexed triangles along a plane.

use nalgebra::Point3;

use crate::{side_of_distance, PlaneSide};

/// A point of a classified triangle.
///
/// The first three entries of a vertex list are the input triangle's corners
/// (sources `[i, i]`, alpha 0). Every later entry lies on the edge between
/// two earlier entries: `position = src0 + (src1 - src0) * alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitVertex {
    pub position: Point3<f32>,
    pub sources: [usize; 2],
    pub alpha: f32,
}

impl SplitVertex {
    pub(crate) fn corner(index: usize, position: Point3<f32>) -> Self {
        Self {
            position,
            sources: [index, index],
            alpha: 0.0,
        }
    }
}

/// Triangulated pieces of a split, indices into the shared vertex list.
#[derive(Debug, Default)]
pub(super) struct Fragments {
    pub(super) front: Vec<[usize; 3]>,
    pub(super) back: Vec<[usize; 3]>,
}

/// Splits a spanning triangle into front and back triangles.
///
/// Walks the edges Sutherland-Hodgman style, appending one vertex to
/// `vertices` per edge that crosses from front to back. On-plane corners are
/// shared by both sides. Winding of the input is preserved in every piece.
pub(super) fn split_triangle(
    vertices: &mut Vec<SplitVertex>,
    triangle: [usize; 3],
    distances: [f32; 3],
    epsilon: f32,
) -> Fragments {
    let sides = distances.map(|d| side_of_distance(d, epsilon));

    let mut front = Vec::with_capacity(4);
    let mut back = Vec::with_capacity(4);

    for i in 0..3 {
        let j = (i + 1) % 3;
        let current = triangle[i];
        let next = triangle[j];

        match sides[i] {
            PlaneSide::Front => front.push(current),
            PlaneSide::Back => back.push(current),
            PlaneSide::OnPlane => {
                front.push(current);
                back.push(current);
            }
        }

        let crosses = matches!(
            (sides[i], sides[j]),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            // Opposite signs beyond epsilon, the denominator cannot vanish.
            let alpha = distances[i] / (distances[i] - distances[j]);
            let start = vertices[current].position;
            let end = vertices[next].position;
            vertices.push(SplitVertex {
                position: start + (end - start) * alpha,
                sources: [current, next],
                alpha,
            });
            let created = vertices.len() - 1;
            front.push(created);
            back.push(created);
        }
    }

    Fragments {
        front: fan(&front),
        back: fan(&back),
    }
}

/// Fan triangulation of a convex polygon.
fn fan(polygon: &[usize]) -> Vec<[usize; 3]> {
    (1..polygon.len().saturating_sub(1))
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect()
}
