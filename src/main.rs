//! issue-compare - side-by-side issue tracker project comparison
//!
//! A CLI tool that fetches comparison analytics for 2 to 3 projects
//! and renders aligned chart datasets as a Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid selection, config, unwritable output, etc.)
//!   2 - Every requested chart ended in the no-data state

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use issue_compare::analysis::{AggregateOptions, Palette};
use issue_compare::cli::{Args, OutputFormat};
use issue_compare::client::{BackendClient, ClientConfig};
use issue_compare::config::{Config, CONFIG_FILE};
use issue_compare::models::{ChartEntry, ComparisonOutcome, ComparisonReport, ReportMetadata};
use issue_compare::session::{ComparisonSession, Selection};
use issue_compare::{mock, report};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("issue-compare v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Some(addr) = args.serve_mock {
        return mock::serve(addr, args.seed).await;
    }

    match run_comparison(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Comparison failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .issue-compare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the backend URL, colors, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(args.log_filter())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete comparison workflow. Returns exit code (0 or 2).
async fn run_comparison(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let selection = Selection::new(args.projects.as_slice()).context("Invalid project selection")?;
    let kinds = args.metric.kinds();

    let client = BackendClient::new(ClientConfig::from(&config.backend))
        .context("Failed to create backend client")?;
    let options = AggregateOptions {
        top_authors: config.chart.top_authors,
        palette: Palette::from(&config.chart),
    };
    let session = ComparisonSession::new(client, options);

    let project_list: Vec<&str> = selection.projects().iter().map(|p| p.as_str()).collect();
    println!("🔎 Comparing projects: {}", project_list.join(", "));
    println!("   Backend: {}", session.client().base_url());
    println!("   Timeout: {}s", config.backend.timeout_seconds);

    // Fetch every chart as one request generation
    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Fetching {} chart(s)...", kinds.len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let outcomes = session.load_all(&selection, &kinds).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let outcomes = outcomes.ok_or_else(|| anyhow!("Comparison was superseded by a newer request"))?;

    // Build the report
    let charts: Vec<ChartEntry> = outcomes
        .into_iter()
        .map(|(kind, outcome)| ChartEntry { kind, outcome })
        .collect();

    let duration = start_time.elapsed().as_secs_f64();

    let report = ComparisonReport {
        metadata: ReportMetadata {
            backend_url: session.client().base_url().to_string(),
            projects: selection.projects().to_vec(),
            generated_at: Utc::now(),
            duration_seconds: duration,
        },
        charts,
    };

    // Generate and save the report
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = &config.general.output;
    std::fs::write(output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path))?;

    // Print summary
    println!("\n📊 Comparison Summary:");
    for chart in &report.charts {
        match &chart.outcome {
            ComparisonOutcome::Ready(dataset) => println!(
                "   ✅ {}: {} categories",
                chart.kind.title(),
                dataset.labels.len()
            ),
            ComparisonOutcome::NoData(reason) => {
                println!("   ⚠️  {}: {}", chart.kind.title(), reason)
            }
        }
    }
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Report saved to: {}", output_path);

    if !report.charts.is_empty() && report.no_data_count() == report.charts.len() {
        eprintln!("\n⛔ No chart had data to compare (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
