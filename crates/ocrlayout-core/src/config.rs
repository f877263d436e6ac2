//! Segmentation configuration
//!
//! [`LayoutConfig`] is built with [`LayoutConfigBuilder`] or parsed from JSON;
//! both paths run the same validation.

use crate::error::{LayoutError, Result};
use crate::model::TextLevel;
use ocrlayout_geometry::DEFAULT_BRIDGE_WIDTH;
use serde::{Deserialize, Serialize};

/// Default number of ranked alternatives kept per glyph
pub const DEFAULT_MAX_ALTERNATIVES: usize = 1;

/// Validated segmentation settings
///
/// # Examples
///
/// ```
/// use ocrlayout_core::{LayoutConfig, TextLevel};
///
/// let config = LayoutConfig::from_json(r#"{"segmentation_level": "glyph"}"#)?;
/// assert_eq!(config.segmentation_level, TextLevel::Glyph);
/// assert_eq!(config.text_level, TextLevel::Word);
/// # Ok::<(), ocrlayout_core::LayoutError>(())
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Finest level inserted into the page (default: word)
    pub segmentation_level: TextLevel,
    /// Level at which recognized text is attached (default: word)
    pub text_level: TextLevel,
    /// Remove existing regions before segmenting (default: false)
    pub overwrite_segments: bool,
    /// Replace existing text during aggregation (default: true)
    pub overwrite_text: bool,
    /// Replace outlines by the join of their children (default: false)
    pub shrink_polygons: bool,
    /// Insert one text sub-region per engine paragraph (default: false)
    pub paragraph_regions: bool,
    /// Keep blocks classified as noise (default: false)
    pub keep_noise: bool,
    /// Bridge width used when joining shapes (default: 20.0)
    pub bridge_width: f64,
    /// Ranked alternatives kept per glyph (default: 1)
    pub max_alternatives: usize,
    /// Prefix for generated region ids (default: empty)
    pub id_prefix: String,
}

impl Default for LayoutConfig {
    #[inline]
    fn default() -> Self {
        Self {
            segmentation_level: TextLevel::Word,
            text_level: TextLevel::Word,
            overwrite_segments: false,
            overwrite_text: true,
            shrink_polygons: false,
            paragraph_regions: false,
            keep_noise: false,
            bridge_width: DEFAULT_BRIDGE_WIDTH,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            id_prefix: String::new(),
        }
    }
}

impl LayoutConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    ///
    /// # Errors
    ///
    /// [`LayoutError::Json`] for malformed JSON, [`LayoutError::ConfigError`]
    /// for invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints
    ///
    /// # Errors
    ///
    /// [`LayoutError::ConfigError`] naming the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.text_level > self.segmentation_level {
            return Err(LayoutError::config(format!(
                "text_level '{}' is finer than segmentation_level '{}'",
                self.text_level, self.segmentation_level
            )));
        }
        if !self.bridge_width.is_finite() || self.bridge_width <= 0.0 {
            return Err(LayoutError::config(format!(
                "bridge_width must be positive and finite, got {}",
                self.bridge_width
            )));
        }
        if self.max_alternatives == 0 {
            return Err(LayoutError::config("max_alternatives must be at least 1"));
        }
        Ok(())
    }
}

/// Builder for [`LayoutConfig`]
///
/// # Examples
///
/// ```
/// use ocrlayout_core::{LayoutConfigBuilder, TextLevel};
///
/// let config = LayoutConfigBuilder::glyphs()
///     .max_alternatives(3)
///     .shrink_polygons(true)
///     .build()?;
/// assert_eq!(config.text_level, TextLevel::Glyph);
/// # Ok::<(), ocrlayout_core::LayoutError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutConfigBuilder {
    config: LayoutConfig,
}

impl LayoutConfigBuilder {
    /// Builder with default settings (segment and recognize words)
    #[inline]
    #[must_use = "returns a new builder with default settings"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions only, text attached to regions
    #[must_use = "returns a new builder with the region preset"]
    pub fn regions_only() -> Self {
        Self::new()
            .segmentation_level(TextLevel::Region)
            .text_level(TextLevel::Region)
    }

    /// Full hierarchy down to glyphs, text attached to glyphs
    #[must_use = "returns a new builder with the glyph preset"]
    pub fn glyphs() -> Self {
        Self::new()
            .segmentation_level(TextLevel::Glyph)
            .text_level(TextLevel::Glyph)
    }

    #[inline]
    #[must_use = "returns the builder with segmentation level configured"]
    pub const fn segmentation_level(mut self, level: TextLevel) -> Self {
        self.config.segmentation_level = level;
        self
    }

    #[inline]
    #[must_use = "returns the builder with text level configured"]
    pub const fn text_level(mut self, level: TextLevel) -> Self {
        self.config.text_level = level;
        self
    }

    #[inline]
    #[must_use = "returns the builder with segment overwriting configured"]
    pub const fn overwrite_segments(mut self, overwrite: bool) -> Self {
        self.config.overwrite_segments = overwrite;
        self
    }

    #[inline]
    #[must_use = "returns the builder with text overwriting configured"]
    pub const fn overwrite_text(mut self, overwrite: bool) -> Self {
        self.config.overwrite_text = overwrite;
        self
    }

    #[inline]
    #[must_use = "returns the builder with polygon shrinking configured"]
    pub const fn shrink_polygons(mut self, shrink: bool) -> Self {
        self.config.shrink_polygons = shrink;
        self
    }

    #[inline]
    #[must_use = "returns the builder with paragraph regions configured"]
    pub const fn paragraph_regions(mut self, enabled: bool) -> Self {
        self.config.paragraph_regions = enabled;
        self
    }

    #[inline]
    #[must_use = "returns the builder with noise handling configured"]
    pub const fn keep_noise(mut self, keep: bool) -> Self {
        self.config.keep_noise = keep;
        self
    }

    /// Bridge width for joins; must be positive
    #[inline]
    #[must_use = "returns the builder with bridge width configured"]
    pub const fn bridge_width(mut self, width: f64) -> Self {
        self.config.bridge_width = width;
        self
    }

    #[inline]
    #[must_use = "returns the builder with alternative count configured"]
    pub const fn max_alternatives(mut self, count: usize) -> Self {
        self.config.max_alternatives = count;
        self
    }

    #[must_use = "returns the builder with id prefix configured"]
    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.id_prefix = prefix.into();
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    ///
    /// [`LayoutError::ConfigError`] if a value is out of range.
    pub fn build(self) -> Result<LayoutConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
