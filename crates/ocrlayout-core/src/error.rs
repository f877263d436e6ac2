//! Error types for page layout processing.
//!
//! Geometric rejections never show up here: an element that cannot be placed
//! inside its parent is discarded and logged. A [`LayoutError`] aborts the
//! current page only.

use ocrlayout_geometry::GeometryError;
use thiserror::Error;

/// Errors raised while building or rewriting a page layout.
///
/// # Examples
///
/// ```
/// use ocrlayout_core::{LayoutConfigBuilder, LayoutError};
///
/// let err = LayoutConfigBuilder::new().bridge_width(0.0).build().unwrap_err();
/// assert!(matches!(err, LayoutError::ConfigError { .. }));
/// assert!(err.is_config_error());
/// ```
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Polygon repair or shape union broke a geometric invariant.
    ///
    /// Indicates malformed detection geometry; processing of the page stops.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// An element kind was nested where the page model does not allow it.
    #[error("Element '{child}' cannot be nested inside '{parent}'")]
    InvalidChild {
        /// Id of the would-be parent
        parent: String,
        /// Id of the rejected child
        child: String,
    },

    /// Invalid configuration value.
    #[error("Configuration error: {reason}")]
    ConfigError {
        /// What was wrong
        reason: String,
    },

    /// The recognition engine refused an operation.
    #[error("Engine error: {0}")]
    Engine(#[from] anyhow::Error),

    /// Configuration or reading-order JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LayoutError {
    /// Build a [`LayoutError::ConfigError`]
    #[inline]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a geometry error
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_geometry_error(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }

    /// Returns true if this is a configuration error
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. } | Self::Json(_))
    }

    /// Returns true if the recognition engine reported the failure
    #[inline]
    #[must_use = "this method returns a boolean, not modifying the error"]
    pub const fn is_engine_error(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}

/// Type alias for Result with [`LayoutError`]
pub type Result<T> = std::result::Result<T, LayoutError>;
