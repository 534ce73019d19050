use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use starcount_acquire::fetch::DEFAULT_STAR_SELECTOR;
use starcount_acquire::pipeline::{
    DEFAULT_INPUT, DEFAULT_ORIGIN, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_SECS,
};
use starcount_acquire::resolve::UrlResolver;
use starcount_acquire::PipelineConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "starcount")]
#[command(about = "Fill in GitHub star counts for a JSON project dataset")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STARCOUNT_BUILD"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    // Runs `enrich` with the default paths when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve project URLs, scrape star counts and write the updated dataset
    Enrich(EnrichArgs),

    /// Check an enriched dataset for non-canonical URLs and bad star counts
    Validate {
        /// Path to the dataset to validate
        file: String,

        /// Origin the project URLs must live under
        #[arg(long, default_value = DEFAULT_ORIGIN)]
        origin: String,
    },
}

#[derive(Args)]
struct EnrichArgs {
    /// Input dataset (JSON with "results" and "total")
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output path for the updated dataset (overwritten)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Base URL project names are resolved against
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    origin: String,

    /// CSS selector of the star counter element
    #[arg(long, default_value = DEFAULT_STAR_SELECTOR)]
    selector: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl Default for EnrichArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            origin: DEFAULT_ORIGIN.to_string(),
            selector: DEFAULT_STAR_SELECTOR.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl From<EnrichArgs> for PipelineConfig {
    fn from(args: EnrichArgs) -> Self {
        PipelineConfig {
            input: args.input,
            output: args.output,
            origin: args.origin,
            selector: args.selector,
            timeout: Duration::from_secs(args.timeout_secs),
            ..Default::default()
        }
    }
}

impl LogLevel {
    /// Filter directive; HTML-parsing crates stay at warn when debugging.
    fn directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
            LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
        }
    }
}

fn init_tracing(level: &LogLevel, utc: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.directive()));

    // e.g. 2026-10-19 09:12:44.031 +02:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z".to_string();
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    if utc {
        builder
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format))
            .init();
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.utc);

    match cli.command.unwrap_or_else(|| Commands::Enrich(EnrichArgs::default())) {
        Commands::Enrich(args) => {
            let config = PipelineConfig::from(args);
            tracing::info!(
                input = %config.input.display(),
                output = %config.output.display(),
                origin = %config.origin,
                "Enriching dataset"
            );
            let summary = starcount_acquire::run(&config).await?;
            if summary.failed > 0 {
                tracing::warn!(failed = summary.failed, "Some entries could not be fetched");
            }
            println!("Updated star counts written to {}", config.output.display());
        }
        Commands::Validate { file, origin } => {
            tracing::info!(file = %file, "Validating");
            let resolver = UrlResolver::new(&origin)?;
            starcount_validate::validate(&file, resolver.prefix())?;
        }
    }

    Ok(())
}
