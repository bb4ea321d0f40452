// Library exports for dashviz

pub mod csv_reader;
pub mod data;
pub mod error;
pub mod profile;
pub mod config;

// Aggregation and chart pipeline
pub mod aggregate;
pub mod resolve;
pub mod scale;
pub mod palette;
pub mod ir;
pub mod compiler;
pub mod graph;
pub mod view;

// Interaction
pub mod dispatch;
pub mod tooltip;
pub mod summary;
pub mod controller;
pub mod parser;
pub mod session;

pub use error::DashError;

use serde::{Deserialize, Serialize};

/// Encoding of the rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderOptions {
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// Draw axis labels, titles and legend text
    #[serde(default = "default_labels")]
    pub labels: bool,
}

fn default_labels() -> bool { true }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            labels: true,
        }
    }
}
