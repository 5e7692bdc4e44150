//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use docsearch_core::pipeline::{
    self, BuildMode, BuildOptions, BuildResult, Pipeline, ProgressReporter,
};
use docsearch_core::publisher::IndexArtifact;
use docsearch_shared::{
    AppConfig, CloudCredentials, SiteContent, VersionName, config_file_path, init_config,
    load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Staging directory for local artifacts, relative to the site root.
const DEFAULT_STAGING_DIR: &str = ".docusaurus/docsearch";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsearch: full-text search indexes for documentation sites.
#[derive(Parser)]
#[command(
    name = "docsearch",
    version,
    about = "Build per-version search indexes for a documentation site.",
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
    /// Index the site's content and emit the search widget's global data.
    Build(BuildArgs),

    /// Query a local index artifact.
    Search {
        /// Path to an `orama-search-index-<version>.json.gz` artifact.
        #[arg(long)]
        index: PathBuf,

        /// Search terms.
        query: String,

        /// Maximum number of hits to print.
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Configuration management.
    Config {
        /// Site root holding `docsearch.toml`.
        #[arg(long, default_value = ".")]
        site_dir: PathBuf,

        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
pub(crate) struct BuildArgs {
    /// Content manifest (JSON) describing the loaded docs, blog posts and pages.
    #[arg(long)]
    content: PathBuf,

    /// Site root; `@site` in source paths resolves here.
    #[arg(long, default_value = ".")]
    site_dir: PathBuf,

    /// Where local artifacts are staged (defaults to <site-dir>/.docusaurus/docsearch).
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Built site directory; staged artifacts are copied here when given.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write the global data JSON to this file instead of stdout.
    #[arg(long)]
    global_data: Option<PathBuf>,

    /// Build mode; `development` embeds local indexes in the global data.
    #[arg(long, env = "NODE_ENV")]
    mode: Option<String>,

    /// Remote service base URL.
    #[arg(long, env = "ORAMA_CLOUD_BASE_URL")]
    base_url: Option<String>,

    /// Remote index id.
    #[arg(long, env = "ORAMA_CLOUD_INDEX_ID")]
    index_id: Option<String>,

    /// Private API key for the remote service.
    #[arg(long, env = "ORAMA_CLOUD_PRIVATE_API_KEY", hide_env_values = true)]
    private_api_key: Option<String>,
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
        0 => "docsearch=info",
        1 => "docsearch=debug",
        _ => "docsearch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
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
        Command::Build(args) => cmd_build(args).await,
        Command::Search {
            index,
            query,
            limit,
        } => cmd_search(&index, &query, limit),
        Command::Config { site_dir, action } => match action {
            ConfigAction::Init => cmd_config_init(&site_dir),
            ConfigAction::Show => cmd_config_show(&site_dir),
        },
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

async fn cmd_build(args: BuildArgs) -> Result<()> {
    let config: AppConfig = load_config(&args.site_dir)?;
    let content = SiteContent::load(&args.content)?;

    let mut credentials = CloudCredentials::new(args.base_url, args.private_api_key);
    credentials.index_id = args.index_id;

    let staging_dir = args
        .staging_dir
        .unwrap_or_else(|| args.site_dir.join(DEFAULT_STAGING_DIR));
    let mode = BuildMode::from_node_env(args.mode.as_deref());

    info!(
        site_dir = %args.site_dir.display(),
        staging_dir = %staging_dir.display(),
        ?mode,
        cloud = config.cloud.is_enabled(),
        "building search index"
    );

    let options = BuildOptions {
        site_dir: args.site_dir,
        staging_dir,
        mode,
        config,
    };
    let reporter = CliProgress::new();
    let result = Pipeline::new(options, credentials)
        .prepare(&content, &reporter)
        .await?;

    let json = serde_json::to_string_pretty(&result.global_data)?;
    match &args.global_data {
        Some(path) => {
            std::fs::write(path, json)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    if let Some(out_dir) = &args.out_dir {
        let copied = pipeline::finalize(out_dir, &result).await?;
        info!(copied = copied.len(), out_dir = %out_dir.display(), "artifacts copied");
    }

    print_summary(&result);
    Ok(())
}

fn print_summary(result: &BuildResult) {
    eprintln!();
    eprintln!("  Search index built!");
    for artifact in &result.artifacts {
        match artifact {
            IndexArtifact::Local(local) => eprintln!(
                "  {:<12} local   {} ({} bytes)",
                local.version.as_str(),
                local.meta.path.display(),
                local.meta.size_bytes
            ),
            IndexArtifact::Remote(endpoint) => eprintln!(
                "  {:<12} remote  {}",
                endpoint.v.as_str(),
                endpoint.endpoint
            ),
        }
    }
    eprintln!("  Time:        {:.1}s", result.elapsed.as_secs_f64());
    eprintln!();
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn version_assembled(&self, version: &VersionName, sections: usize) {
        self.spinner
            .set_message(format!("Assembled {version}: {sections} sections"));
    }

    fn version_published(&self, artifact: &IndexArtifact) {
        let target = match artifact {
            IndexArtifact::Local(_) => "local",
            IndexArtifact::Remote(_) => "remote",
        };
        self.spinner
            .set_message(format!("Published {} ({target})", artifact.version()));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

// A build that fails before `done` must not leave the spinner ticking.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn cmd_search(index_path: &Path, query: &str, limit: usize) -> Result<()> {
    let index = docsearch_index::read_artifact(index_path)?;
    let hits = index.search(query, limit)?;

    info!(query, hits = hits.len(), documents = index.len(), "search complete");

    if hits.is_empty() {
        println!("No results for '{query}'.");
        return Ok(());
    }

    for hit in hits {
        let doc = &hit.document;
        println!("[{:.2}] {} › {}", hit.score, doc.section, doc.title);
        println!("    {}", doc.path);
        if let Some(line) = doc.content.lines().find(|l| !l.trim().is_empty()) {
            println!("    {}", line.trim());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init(site_dir: &Path) -> Result<()> {
    let path = config_file_path(site_dir);
    if path.exists() {
        return Err(eyre!("config already exists at {}", path.display()));
    }
    let path = init_config(site_dir)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(site_dir: &Path) -> Result<()> {
    let config: AppConfig = load_config(site_dir)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
