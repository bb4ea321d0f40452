//! Chart and render configuration.
//!
//! Every recognized option is a field below; unknown keys in a config file are
//! rejected. Defaults give the standard dashboard layout:
//!
//! ```toml
//! [bar]
//! container_width = 1000
//! container_height = 625
//! limit = 20
//! padding = 0.1
//! y_ticks = 10
//! margin = { top = 40, right = 40, bottom = 170, left = 70 }
//!
//! [scatter]
//! container_width = 1000
//! container_height = 625
//! symbol_size = 240.0
//! ticks = 6
//! legend_ticks = 4
//! margin = { top = 25, right = 20, bottom = 110, left = 60 }
//!
//! [render]
//! type = "png"
//! labels = true
//! ```

use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default)]
    pub bar: BarConfig,
    #[serde(default)]
    pub scatter: ScatterConfig,
    #[serde(default)]
    pub render: RenderOptions,
}

/// Space between the container edge and the plot area, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BarConfig {
    #[serde(default = "default_container_width")]
    pub container_width: u32,
    #[serde(default = "default_container_height")]
    pub container_height: u32,
    #[serde(default = "default_bar_margin")]
    pub margin: Margin,
    /// Bars kept after ranking
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Fraction of each band left empty
    #[serde(default = "default_padding")]
    pub padding: f64,
    #[serde(default = "default_bar_y_ticks")]
    pub y_ticks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScatterConfig {
    #[serde(default = "default_container_width")]
    pub container_width: u32,
    #[serde(default = "default_container_height")]
    pub container_height: u32,
    #[serde(default = "default_scatter_margin")]
    pub margin: Margin,
    /// Symbol area in square pixels
    #[serde(default = "default_symbol_size")]
    pub symbol_size: f64,
    #[serde(default = "default_scatter_ticks")]
    pub ticks: usize,
    #[serde(default = "default_legend_ticks")]
    pub legend_ticks: usize,
}

fn default_container_width() -> u32 { 1000 }
fn default_container_height() -> u32 { 625 }
fn default_bar_margin() -> Margin { Margin::new(40.0, 40.0, 170.0, 70.0) }
fn default_scatter_margin() -> Margin { Margin::new(25.0, 20.0, 110.0, 60.0) }
fn default_limit() -> usize { 20 }
fn default_padding() -> f64 { 0.1 }
fn default_bar_y_ticks() -> usize { 10 }
fn default_symbol_size() -> f64 { 240.0 }
fn default_scatter_ticks() -> usize { 6 }
fn default_legend_ticks() -> usize { 4 }

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            container_height: default_container_height(),
            margin: default_bar_margin(),
            limit: default_limit(),
            padding: default_padding(),
            y_ticks: default_bar_y_ticks(),
        }
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            container_height: default_container_height(),
            margin: default_scatter_margin(),
            symbol_size: default_symbol_size(),
            ticks: default_scatter_ticks(),
            legend_ticks: default_legend_ticks(),
        }
    }
}

/// Inner plot size for a container and margin
pub fn plot_size(width: u32, height: u32, margin: &Margin) -> (f64, f64) {
    let w = (width as f64 - margin.left - margin.right).max(0.0);
    let h = (height as f64 - margin.top - margin.bottom).max(0.0);
    (w, h)
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse dashboard configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// The default configuration as a TOML document
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.bar.limit, 20);
        assert_eq!(config.bar.margin.bottom, 170.0);
        assert_eq!(config.scatter.margin.left, 60.0);
        assert_eq!(plot_size(1000, 625, &config.bar.margin), (890.0, 415.0));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml_str(
            "[bar]\nlimit = 5\n\n[render]\ntype = \"svg\"\n",
        )
        .unwrap();
        assert_eq!(config.bar.limit, 5);
        assert_eq!(config.bar.container_width, 1000);
        assert_eq!(config.scatter, ScatterConfig::default());
        assert!(matches!(config.render.format, OutputFormat::Svg));
        assert!(config.render.labels);
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(DashboardConfig::from_toml_str("[bar]\nbar_colour = \"red\"\n").is_err());
        assert!(DashboardConfig::from_toml_str("[tutorial]\nsteps = 3\n").is_err());
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = DashboardConfig::default_toml().unwrap();
        let parsed = DashboardConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, DashboardConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashviz.toml");
        std::fs::write(&path, "[scatter]\nsymbol_size = 100.0\n").unwrap();
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.scatter.symbol_size, 100.0);
        assert!(DashboardConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
