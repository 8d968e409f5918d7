//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.issue-compare.toml` files.

use crate::analysis::aggregator::DEFAULT_TOP_AUTHORS;
use crate::analysis::palette::{
    DEFAULT_SHADE_STEP, PRIORITY_PALETTE, PROJECT_PALETTE, STATUS_PALETTE,
};
use crate::models::Color;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".issue-compare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analytics backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "comparison_report.md".to_string()
}

/// Analytics backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Query parameter carrying the comma-joined project keys.
    #[serde(default = "default_project_param")]
    pub project_param: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            project_param: default_project_param(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_project_param() -> String {
    "key".to_string()
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Authors kept on the time-spent axis.
    #[serde(default = "default_top_authors")]
    pub top_authors: usize,

    /// Shade segment colors per project.
    #[serde(default = "default_true")]
    pub shading: bool,

    /// Lightness added per project, in percentage points.
    #[serde(default = "default_shade_step")]
    pub shade_step: f64,

    /// Project base colors for bar charts.
    #[serde(default = "default_project_colors")]
    pub project_colors: Vec<String>,

    /// Status colors for the status distribution.
    #[serde(default = "default_status_colors")]
    pub status_colors: Vec<String>,

    /// Priority colors, most severe first.
    #[serde(default = "default_priority_colors")]
    pub priority_colors: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_authors: default_top_authors(),
            shading: true,
            shade_step: default_shade_step(),
            project_colors: default_project_colors(),
            status_colors: default_status_colors(),
            priority_colors: default_priority_colors(),
        }
    }
}

fn default_top_authors() -> usize {
    DEFAULT_TOP_AUTHORS
}

fn default_true() -> bool {
    true
}

fn default_shade_step() -> f64 {
    DEFAULT_SHADE_STEP
}

fn hex_list(colors: &[Color]) -> Vec<String> {
    colors.iter().map(Color::to_hex).collect()
}

fn default_project_colors() -> Vec<String> {
    hex_list(&PROJECT_PALETTE)
}

fn default_status_colors() -> Vec<String> {
    hex_list(&STATUS_PALETTE)
}

fn default_priority_colors() -> Vec<String> {
    hex_list(&PRIORITY_PALETTE)
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.backend.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }
        if let Some(top_authors) = args.top_authors {
            self.chart.top_authors = top_authors;
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.no_shading {
            self.chart.shading = false;
        }
    }

    /// Check the merged settings before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.backend.timeout_seconds == 0 {
            bail!("backend.timeout_seconds must be at least 1");
        }
        if self.chart.top_authors == 0 {
            bail!("chart.top_authors must be at least 1");
        }
        if !self.chart.shade_step.is_finite() || self.chart.shade_step < 0.0 {
            bail!("chart.shade_step must be a non-negative number");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
