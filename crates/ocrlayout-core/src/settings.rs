//! Engine settings snapshots
//!
//! Engine configuration is an immutable [`EngineSettings`] value. A
//! [`SettingsStack`] applies overrides on push and restores the previous
//! snapshot on pop, so temporary changes (a different language for one
//! region, a page segmentation mode for a table) never leak.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete engine configuration at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Recognition language(s), e.g. `"eng+deu"`
    pub language: Option<String>,
    /// Page segmentation mode
    pub page_seg_mode: Option<u32>,
    /// Free-form engine variables
    pub variables: BTreeMap<String, String>,
}

impl EngineSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub const fn with_page_seg_mode(mut self, mode: u32) -> Self {
        self.page_seg_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// `self` with every value set in `overrides` replaced
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut variables = self.variables.clone();
        variables.extend(
            overrides
                .variables
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        Self {
            language: overrides.language.clone().or_else(|| self.language.clone()),
            page_seg_mode: overrides.page_seg_mode.or(self.page_seg_mode),
            variables,
        }
    }
}

/// An engine that can be (re)configured from a settings snapshot
pub trait ConfigurableEngine {
    /// Load `settings` into the engine
    ///
    /// # Errors
    ///
    /// Engine-specific failure (unknown language, rejected variable).
    fn apply_settings(&mut self, settings: &EngineSettings) -> anyhow::Result<()>;
}

/// Base settings plus a stack of pushed snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsStack {
    base: EngineSettings,
    stack: Vec<EngineSettings>,
}

impl SettingsStack {
    #[must_use]
    pub const fn new(base: EngineSettings) -> Self {
        Self {
            base,
            stack: Vec::new(),
        }
    }

    /// Settings currently applied
    #[must_use]
    pub fn current(&self) -> &EngineSettings {
        self.stack.last().unwrap_or(&self.base)
    }

    /// Number of pushed snapshots
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Apply `current ⊕ overrides` and record it.
    ///
    /// Nothing is recorded when the engine rejects the settings.
    ///
    /// # Errors
    ///
    /// [`crate::LayoutError::Engine`] if the engine rejects the settings.
    pub fn push<E: ConfigurableEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        overrides: &EngineSettings,
    ) -> Result<()> {
        let next = self.current().merged(overrides);
        engine.apply_settings(&next)?;
        log::debug!("Pushed engine settings (depth {})", self.stack.len() + 1);
        self.stack.push(next);
        Ok(())
    }

    /// Drop the latest snapshot and re-apply the one below it.
    ///
    /// Returns the dropped snapshot, `None` if only the base is left.
    ///
    /// # Errors
    ///
    /// [`crate::LayoutError::Engine`] if the engine rejects the restored settings.
    pub fn pop<E: ConfigurableEngine + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> Result<Option<EngineSettings>> {
        let Some(popped) = self.stack.pop() else {
            log::warn!("Settings stack is already at its base");
            return Ok(None);
        };
        engine.apply_settings(self.current())?;
        log::debug!("Restored engine settings (depth {})", self.stack.len());
        Ok(Some(popped))
    }
}
