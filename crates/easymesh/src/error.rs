//! Error types for tree classification and CSG operations.

use nalgebra::Point3;
use thiserror::Error;

/// Errors that can abort a CSG operation or a command replay.
#[derive(Debug, Error)]
pub enum CsgError {
    /// A triangle handed to the tree has a NaN or infinite coordinate.
    #[error("non-finite vertex coordinate near {position}")]
    NonFiniteVertex {
        /// First offending position.
        position: Point3<f32>,
    },

    /// The tree produced a result the driver cannot apply.
    #[error("triangle classification failed: {details}")]
    Classification {
        /// Description of the broken invariant.
        details: String,
    },

    /// A recorded command stream could not be encoded or decoded.
    #[error("command stream error: {0}")]
    Command(#[from] serde_json::Error),
}

/// Result type for CSG operations.
pub type CsgResult<T> = Result<T, CsgError>;
