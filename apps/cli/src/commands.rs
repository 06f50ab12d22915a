//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use trendlens_core::pipeline::{ProgressReporter, RunConfig, RunSummary};
use trendlens_core::snapshot::read_snapshot;
use trendlens_providers::{SearchClient, SynthesisClient, TrendClient};
use trendlens_report::{RenderOptions, render, write_report};
use trendlens_shared::{
    PipelineConfig, ProviderConfig, Snapshot, init_config, load_config, validate_api_keys,
};

/// Report document title.
const REPORT_TITLE: &str = "热搜趋势分析报告";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// TrendLens — turn trending topics into an analysis report.
#[derive(Parser)]
#[command(
    name = "trendlens",
    version,
    about = "Enrich trending topics with search context and LLM analysis, then render an HTML report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline: fetch, enrich, and render the report.
    Run {
        /// Maximum number of topics to enrich.
        #[arg(long)]
        max_topics: Option<usize>,

        /// Delay in milliseconds after each processed topic.
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Snapshot file path (defaults to config).
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output directory for the report (defaults to config).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render a report from an existing snapshot, without calling providers.
    Render {
        /// Snapshot file path (defaults to config).
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output directory for the report (defaults to config).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "trendlens=info",
        1 => "trendlens=debug",
        _ => "trendlens=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            max_topics,
            pacing_ms,
            snapshot,
            out,
        } => cmd_run(max_topics, pacing_ms, snapshot, out).await,
        Command::Render { snapshot, out } => cmd_render(snapshot, out).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    max_topics: Option<usize>,
    pacing_ms: Option<u64>,
    snapshot: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    // Validate API keys before doing anything
    let config = load_config()?;
    validate_api_keys(&config)?;

    let mut pipeline = PipelineConfig::from(&config);
    if let Some(n) = max_topics {
        pipeline.max_topics = n;
    }
    if let Some(ms) = pacing_ms {
        pipeline.pacing_ms = ms;
    }

    let snapshot_path = snapshot.unwrap_or_else(|| PathBuf::from(&pipeline.snapshot_file));
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&pipeline.output_dir));

    let trends = TrendClient::new(provider_endpoint(&config.trends)?, provider_key(&config.trends)?)?;
    let search = SearchClient::new(provider_endpoint(&config.search)?, provider_key(&config.search)?)?;
    let synthesis = SynthesisClient::new(
        provider_endpoint(&config.synthesis)?,
        provider_key(&config.synthesis)?,
    )?;

    let run_config = RunConfig {
        max_topics: pipeline.max_topics,
        pacing: Duration::from_millis(pipeline.pacing_ms),
        snapshot_path: snapshot_path.clone(),
    };

    info!(
        max_topics = run_config.max_topics,
        pacing_ms = pipeline.pacing_ms,
        snapshot = %snapshot_path.display(),
        "starting pipeline run"
    );

    let reporter = CliProgress::new();
    let snapshot =
        trendlens_core::pipeline::run(&trends, &search, &synthesis, &run_config, &reporter)
            .await?;

    let report_path = render_and_write(&snapshot, &pipeline.report_prefix, &out_dir)?;

    let search_hits = snapshot.iter().filter(|r| r.search_result.is_some()).count();
    let analyses = snapshot.iter().filter(|r| r.analysis.is_some()).count();

    // Print summary
    println!();
    println!("  Run complete!");
    println!("  Topics:    {}", snapshot.len());
    println!("  Searches:  {search_hits}");
    println!("  Analyses:  {analyses}");
    println!("  Snapshot:  {}", snapshot_path.display());
    println!("  Report:    {}", report_path.display());
    println!();

    Ok(())
}

async fn cmd_render(snapshot: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let pipeline = PipelineConfig::from(&config);

    let snapshot_path = snapshot.unwrap_or_else(|| PathBuf::from(&pipeline.snapshot_file));
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&pipeline.output_dir));

    info!(snapshot = %snapshot_path.display(), "rendering from existing snapshot");

    let snapshot = read_snapshot(&snapshot_path)?;
    let report_path = render_and_write(&snapshot, &pipeline.report_prefix, &out_dir)?;

    println!();
    println!("  Report rendered!");
    println!("  Topics:  {}", snapshot.len());
    println!("  Report:  {}", report_path.display());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn provider_endpoint(provider: &ProviderConfig) -> Result<Url> {
    Url::parse(&provider.endpoint)
        .map_err(|e| eyre!("invalid endpoint '{}': {e}", provider.endpoint))
}

fn provider_key(provider: &ProviderConfig) -> Result<String> {
    std::env::var(&provider.api_key_env)
        .map_err(|_| eyre!("environment variable {} is not set", provider.api_key_env))
}

fn render_and_write(snapshot: &Snapshot, report_prefix: &str, out_dir: &Path) -> Result<PathBuf> {
    let options = RenderOptions {
        title: REPORT_TITLE.to_string(),
        file_prefix: report_prefix.to_string(),
        run_date: Local::now().date_naive(),
        generated_at: Utc::now(),
    };

    let report = render(snapshot, &options);
    let path = write_report(&report, out_dir)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    fn topic_processed(&self, topic: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriched [{current}/{total}] {topic}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
