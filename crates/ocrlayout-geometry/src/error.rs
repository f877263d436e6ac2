//! Error types for polygon operations.
//!
//! Geometric *rejection* (a child that does not overlap its parent) is not an
//! error: [`crate::clip`] returns `Ok(None)` for it. The variants here are
//! invariant violations that abort processing of the current page.

use thiserror::Error;

/// Geometry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// No vertices (or no input polygons) were supplied
    #[error("Empty geometry: {0}")]
    EmptyGeometry(&'static str),

    /// A coordinate was NaN or infinite
    #[error("Non-finite coordinate in polygon with {vertices} vertices")]
    NonFiniteCoordinate {
        /// Number of input vertices
        vertices: usize,
    },

    /// Rotation, simplification and dilation all failed to produce a valid polygon
    #[error("Polygon repair exhausted all strategies ({vertices} vertices, area {area:.3})")]
    RepairExhausted {
        /// Number of distinct input vertices
        vertices: usize,
        /// Area of the input ring (shoelace, unsigned)
        area: f64,
    },

    /// The union of shapes and bridges did not collapse to exactly one polygon
    #[error("Shape union produced {parts} parts instead of one polygon")]
    UnionNotSingle {
        /// Number of disjoint parts in the union
        parts: usize,
    },
}

impl GeometryError {
    /// Returns true if this error signals a broken geometric invariant
    /// (as opposed to unusable input)
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::RepairExhausted { .. } | Self::UnionNotSingle { .. }
        )
    }
}

/// Type alias for Result with [`GeometryError`]
pub type Result<T> = std::result::Result<T, GeometryError>;
