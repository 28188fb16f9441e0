//! Binary space partition used to classify triangles for CSG.
//!
//! A [`CsgBsp`] is grown from the triangles of one mesh region, one triangle
//! at a time. Every leaf's plane comes from a single input triangle; a
//! triangle lying on an existing plane is chained next to that leaf instead
//! of splitting it. Once built, any triangle can be tested against the tree:
//! it comes back whole, tagged [`LeafSide::Front`] (outside) or
//! [`LeafSide::Back`] (inside), or cut into tagged pieces along with the
//! interpolation data needed to rebuild the new vertices.
//!
//! # Example
//!
//! ```
//! use easymesh::{CsgBsp, LeafSide};
//! use nalgebra::Point3;
//!
//! let mut tree = CsgBsp::new();
//! tree.add_triangle(
//!     0,
//!     Point3::new(-5.0, -5.0, 0.0),
//!     Point3::new(5.0, -5.0, 0.0),
//!     Point3::new(0.0, 5.0, 0.0),
//! )?;
//!
//! let result = tree.test_triangle(
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 0.0, -1.0),
//!     Point3::new(0.0, 1.0, -1.0),
//! )?;
//! assert!(result.is_split());
//! assert!(result.triangles().iter().any(|t| t.side == LeafSide::Front));
//! # Ok::<(), easymesh::CsgError>(())
//! ```
//!
//! # Architecture
//!
//! - [`CsgBsp`]: the arena of leaves and the two public operations
//! - `CsgBspLeaf`: plane plus front/back/above child indices, private
//! - [`TriangleSplit`]: classification output, [`SplitVertex`] per point

mod leaf;
mod split;
mod tree;

pub use split::SplitVertex;
pub use tree::{ClassifiedTriangle, CoplanarPolicy, CsgBsp, LeafSide, TestOutcome, TriangleSplit};
