//! Thin CLI front end over the library.
//!
//! Simple mode is fully usable from here. Smart and agent modes need an
//! LLM provider, which only the library API can supply; the CLI reports
//! that instead of guessing at vendor wiring.

use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use website_fetch::{
    ConversionStrategy, CrawlMode, FetchConfig, LinkClassification, OutputStructure,
};

#[derive(Parser, Debug)]
#[command(
    name = "website-fetch",
    about = "Crawl a website and mirror it as Markdown",
    version
)]
struct Cli {
    /// Root URL to crawl.
    url: String,

    /// Crawl mode: simple, smart, or agent.
    #[arg(long, default_value = "simple")]
    mode: CrawlModeArg,

    /// Crawl goal; required for smart and agent modes.
    #[arg(long)]
    description: Option<String>,

    #[arg(long, default_value_t = 5)]
    max_depth: usize,

    #[arg(long, default_value_t = 100)]
    max_pages: usize,

    /// Glob over pathnames a link must match (repeatable).
    #[arg(long = "include")]
    include_patterns: Vec<String>,

    /// Glob over pathnames that excludes a link (repeatable).
    #[arg(long = "exclude")]
    exclude_patterns: Vec<String>,

    /// Restrict links to this path prefix (smart/agent modes).
    #[arg(long)]
    path_prefix: Option<String>,

    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// Output layout: mirror or flat.
    #[arg(long, default_value = "mirror")]
    output_structure: OutputStructureArg,

    /// Also write everything into one aggregated.md.
    #[arg(long)]
    single_file: bool,

    /// Skip INDEX.md generation.
    #[arg(long)]
    no_index: bool,

    /// Base conversion strategy: default or readability.
    #[arg(long)]
    strategy: Option<StrategyArg>,

    /// Force the LLM optimization pass (needs a provider).
    #[arg(long)]
    optimize: bool,

    /// Baseline delay between requests, in milliseconds.
    #[arg(long, default_value_t = 200)]
    delay: u64,

    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Ignore robots.txt.
    #[arg(long)]
    no_robots: bool,

    /// Disable 429/backoff delay adaptation.
    #[arg(long)]
    no_adaptive: bool,

    /// Extra request header as `Name: value` (repeatable).
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Netscape-format cookie file.
    #[arg(long)]
    cookie_file: Option<PathBuf>,

    /// Smart-mode link classification: batch or per-link.
    #[arg(long, default_value = "batch")]
    classification: ClassificationArg,

    /// Log filter, e.g. `website_fetch=debug`.
    #[arg(long, default_value = "info")]
    log: String,
}

// Clap needs FromStr-with-Display-error wrappers around the library enums.
type CrawlModeArg = ParsedArg<CrawlMode>;
type OutputStructureArg = ParsedArg<OutputStructure>;
type StrategyArg = ParsedArg<ConversionStrategy>;
type ClassificationArg = ParsedArg<LinkClassification>;

#[derive(Debug, Clone)]
struct ParsedArg<T>(T);

impl<T> std::str::FromStr for ParsedArg<T>
where
    T: std::str::FromStr<Err = String>,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        T::from_str(s).map(ParsedArg)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut headers = HashMap::new();
    for header in &cli.headers {
        match header.split_once(':') {
            Some((name, value)) => {
                headers.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => {
                eprintln!("invalid --header `{header}` (expected `Name: value`)");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut builder = FetchConfig::builder()
        .url(&cli.url)
        .mode(cli.mode.0)
        .max_depth(cli.max_depth)
        .max_pages(cli.max_pages)
        .include_patterns(cli.include_patterns.clone())
        .exclude_patterns(cli.exclude_patterns.clone())
        .output_dir(cli.output_dir.clone())
        .output_structure(cli.output_structure.0)
        .single_file(cli.single_file)
        .generate_index(!cli.no_index)
        .optimize_conversion(cli.optimize)
        .delay_ms(cli.delay)
        .concurrency(cli.concurrency)
        .respect_robots(!cli.no_robots)
        .adaptive_rate_limit(!cli.no_adaptive)
        .headers(headers)
        .link_classification(cli.classification.0);

    if let Some(description) = &cli.description {
        builder = builder.description(description);
    }
    if let Some(prefix) = &cli.path_prefix {
        builder = builder.path_prefix(prefix);
    }
    if let Some(strategy) = &cli.strategy {
        builder = builder.conversion_strategy(strategy.0);
    }
    if let Some(cookie_file) = &cli.cookie_file {
        builder = builder.cookie_file(cookie_file);
    }

    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if matches!(cli.mode.0, CrawlMode::Agent) {
        eprintln!(
            "agent mode requires an LLM provider, which the CLI cannot supply; \
             use the library API and attach one with FetchConfig::with_llm_provider"
        );
        return ExitCode::FAILURE;
    }

    match website_fetch::crawl(config).await {
        Ok(result) => {
            println!(
                "fetched {} pages, skipped {} in {} ms -> {}",
                result.stats.total_pages,
                result.stats.total_skipped,
                result.stats.duration_ms,
                result.output_dir.display()
            );
            if let Some(index) = &result.index_file {
                println!("index: {}", index.display());
            }
            if let Some(single) = &result.single_file {
                println!("aggregate: {}", single.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("crawl failed: {e}");
            ExitCode::FAILURE
        }
    }
}
