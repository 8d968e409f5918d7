//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::MetricKind;
use crate::session::{MAX_PROJECTS, MIN_PROJECTS};
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use std::path::PathBuf;

/// issue-compare - side-by-side issue tracker project comparison
///
/// Fetches comparison analytics for 2 to 3 projects from the analytics
/// backend and renders aligned chart datasets as Markdown or JSON.
///
/// Examples:
///   issue-compare --projects ALPHA,BETA
///   issue-compare --projects ALPHA,BETA,GAMMA --metric status --format json
///   issue-compare --projects ALPHA,BETA --base-url http://localhost:8000
///   issue-compare --serve-mock 127.0.0.1:8000 --seed 7
///   issue-compare --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Project keys to compare (comma-separated, 2 to 3)
    ///
    /// Example: --projects ALPHA,BETA
    #[arg(
        short,
        long,
        value_name = "KEYS",
        value_delimiter = ',',
        required_unless_present_any = ["init_config", "serve_mock"]
    )]
    pub projects: Vec<String>,

    /// Metric to compare
    #[arg(short, long, default_value = "all", value_name = "METRIC")]
    pub metric: MetricArg,

    /// Analytics backend base URL
    ///
    /// Can also be set via ISSUE_COMPARE_API_URL or .issue-compare.toml.
    #[arg(long, value_name = "URL", env = "ISSUE_COMPARE_API_URL")]
    pub base_url: Option<String>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .issue-compare.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of authors kept on the time-spent chart
    #[arg(long, value_name = "COUNT")]
    pub top_authors: Option<usize>,

    /// Use the same category colors for every project in pie charts
    #[arg(long)]
    pub no_shading: bool,

    /// Serve randomized comparison data on ADDR instead of fetching
    ///
    /// Local stand-in for the analytics backend during development.
    #[arg(long, value_name = "ADDR")]
    pub serve_mock: Option<SocketAddr>,

    /// Seed for the mock backend's random data
    #[arg(long, value_name = "SEED", requires = "serve_mock")]
    pub seed: Option<u64>,

    /// Generate a default .issue-compare.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Metric selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MetricArg {
    /// Time issues have been open
    TimeOpen,
    /// Issues per status
    Status,
    /// Time spent per author
    TimeSpent,
    /// Issues per priority
    Priority,
    /// All four metrics
    All,
}

impl MetricArg {
    /// Metric kinds to fetch.
    pub fn kinds(&self) -> Vec<MetricKind> {
        match self {
            MetricArg::TimeOpen => vec![MetricKind::TimeOpen],
            MetricArg::Status => vec![MetricKind::StatusDistribution],
            MetricArg::TimeSpent => vec![MetricKind::TimeSpent],
            MetricArg::Priority => vec![MetricKind::Priority],
            MetricArg::All => MetricKind::ALL.to_vec(),
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.serve_mock.is_some() {
            return Ok(());
        }

        if self.projects.len() < MIN_PROJECTS || self.projects.len() > MAX_PROJECTS {
            return Err(format!(
                "Select between {} and {} projects to compare",
                MIN_PROJECTS, MAX_PROJECTS
            ));
        }

        // Validate backend URL format
        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(top_authors) = self.top_authors {
            if top_authors == 0 {
                return Err("Top authors must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Log filter: `--verbose`/`--quiet` win, then `RUST_LOG`, then info.
    pub fn log_filter(&self) -> EnvFilter {
        let explicit = || EnvFilter::new(self.log_level().as_str().to_ascii_lowercase());
        if self.verbose || self.quiet {
            return explicit();
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| explicit())
    }
}
