//! Plane representation and side tests used by the CSG tree.

use nalgebra::{Point3, Vector3};

/// Default tolerance for side tests and vertex matching.
/// Points within this distance of a plane are considered "on" the plane.
pub const DEFAULT_EPSILON: f32 = 1e-5;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a set of points relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No point is behind the plane, at least one is in front
    Front,
    /// No point is in front of the plane, at least one is behind
    Back,
    /// All points are on the plane
    Coplanar,
    /// Points are on both sides
    Spanning,
}

impl Classification {
    /// Folds per-point sides into a single classification.
    pub fn from_sides(sides: &[PlaneSide]) -> Self {
        let front = sides.iter().any(|s| *s == PlaneSide::Front);
        let back = sides.iter().any(|s| *s == PlaneSide::Back);
        match (front, back) {
            (true, true) => Classification::Spanning,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (false, false) => Classification::Coplanar,
        }
    }
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically.
    ///
    /// Returns `None` if the normal has (near) zero length or is not finite.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Option<Self> {
        let norm = normal.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Some(Self {
            normal: unit_normal,
            offset,
        })
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Returns `None` if the points are collinear (or nearly so).
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Option<Self> {
        Self::from_point_and_normal(a, (b - a).cross(&(c - a)))
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    pub fn classify_point(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        side_of_distance(self.signed_distance(point), epsilon)
    }
}

/// Maps a signed distance to a side, treating `|distance| <= epsilon` as on-plane.
#[inline]
pub fn side_of_distance(distance: f32, epsilon: f32) -> PlaneSide {
    if distance > epsilon {
        PlaneSide::Front
    } else if distance < -epsilon {
        PlaneSide::Back
    } else {
        PlaneSide::OnPlane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_and_normal_is_normalized() {
        let plane =
            Plane3D::from_point_and_normal(Point3::new(0.0, 2.0, 0.0), Vector3::new(0.0, 4.0, 0.0))
                .unwrap();
        assert!((plane.normal().norm() - 1.0).abs() < 1e-6);
        assert!((plane.offset() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_normal_is_rejected() {
        assert!(Plane3D::from_point_and_normal(Point3::origin(), Vector3::zeros()).is_none());
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!(Plane3D::from_three_points(a, b, c).is_none());
    }

    #[test]
    fn classify_points_with_epsilon() {
        let plane =
            Plane3D::from_point_and_normal(Point3::origin(), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let eps = DEFAULT_EPSILON;
        assert_eq!(plane.classify_point(Point3::new(0.0, 0.0, 1.0), eps), PlaneSide::Front);
        assert_eq!(plane.classify_point(Point3::new(0.0, 0.0, -1.0), eps), PlaneSide::Back);
        assert_eq!(plane.classify_point(Point3::new(3.0, 1.0, 0.0), eps), PlaneSide::OnPlane);
        assert_eq!(plane.classify_point(Point3::new(0.0, 0.0, eps * 0.5), eps), PlaneSide::OnPlane);
    }

    #[test]
    fn fold_sides() {
        use PlaneSide::*;
        assert_eq!(Classification::from_sides(&[Front, OnPlane, Front]), Classification::Front);
        assert_eq!(Classification::from_sides(&[Back, OnPlane, OnPlane]), Classification::Back);
        assert_eq!(Classification::from_sides(&[OnPlane; 3]), Classification::Coplanar);
        assert_eq!(Classification::from_sides(&[Front, Back, OnPlane]), Classification::Spanning);
    }
}
