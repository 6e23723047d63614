// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for the layout tree, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Layout tunables.
///
/// Missing keys take their defaults, so an empty document is a valid configuration.
///
/// ```
/// use prism_layout::LayoutConfig;
///
/// let cfg = LayoutConfig::from_toml_str("layout_interval = 0.1").unwrap();
/// assert_eq!(cfg.layout_interval, 0.1);
/// assert_eq!(cfg.epsilon, 1e-5);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Tolerance in meters below which bounds are considered unchanged.
    pub epsilon: f64,
    /// Seconds between polling layout passes in [`Tree::tick`](crate::Tree::tick).
    pub layout_interval: f64,
    /// Z offset added to the content of scroll views.
    pub scroll_content_z_offset: f64,
    /// Thickness in meters reported for line segments.
    pub line_thickness: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            epsilon: prism_bounds::DEFAULT_EPSILON,
            layout_interval: 0.05,
            scroll_content_z_offset: 0.0,
            line_thickness: 0.002,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a configuration file.
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match Self::try_load_from_path(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("{err}. Using default layout config");
                Self::default()
            }
        }
    }
}
