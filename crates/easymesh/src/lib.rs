//! Procedural mesh building with BSP-based boolean operations.
//!
//! An [`EasyMesh`] accumulates triangles from primitives and transforms. Braces
//! split the triangle list into regions, and the last two regions can be
//! combined with union, subtraction, intersection or xor. Each operation
//! classifies the triangles of one region against a [`CsgBsp`] built from the
//! other.

pub mod bsp;
mod command;
mod config;
mod dictionary;
mod error;
mod mesh;
mod plane;
mod triangle;
mod vertex;

pub use bsp::{ClassifiedTriangle, CoplanarPolicy, CsgBsp, LeafSide, SplitVertex, TestOutcome, TriangleSplit};
pub use command::{CommandRecorder, MeshBuilder, MeshCommand};
pub use config::MeshConfig;
pub use dictionary::{Coincidence, MasterRef, VertexAdjacency};
pub use error::{CsgError, CsgResult};
pub use mesh::{Axis, CsgOperation, Cursor, EasyMesh};
pub use plane::{side_of_distance, Classification, Plane3D, PlaneSide, DEFAULT_EPSILON};
pub use triangle::Triangle;
pub use vertex::Vertex;
