//! Console entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use websearch::{Config, Console, ExportFormat, WebSearchEngine};

#[derive(Debug, Parser)]
#[command(name = "websearch", about = "Interactive web search for the console", version)]
struct Args {
    /// Path to a TOML config file (default: the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Disable ANSI colours.
    #[arg(long)]
    no_colors: bool,

    /// Override results per page.
    #[arg(long)]
    results_per_page: Option<usize>,

    /// Override the request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Run a single query and exit.
    #[arg(short, long)]
    query: Option<String>,

    /// Run queries from a file, one per line, and exit.
    #[arg(long)]
    batch: Option<PathBuf>,

    /// With --query or --batch: also export the final results to this
    /// file; the format follows the extension (.json, .csv, .txt).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(args.config.as_deref());

    if let Some(per_page) = args.results_per_page {
        config.search.results_per_page = per_page;
    }
    if let Some(timeout) = args.timeout {
        config.search.default_timeout = timeout;
    }
    if args.no_colors {
        config.display.colors = false;
    }
    config.validate().context("invalid configuration")?;

    let engine = WebSearchEngine::new(config);
    let mut console = Console::new(engine);

    if let Some(query) = &args.query {
        console.run_single(query).await;
        export_if_requested(&console, args.output.as_deref())?;
        return Ok(());
    }

    if let Some(batch_path) = &args.batch {
        let content = std::fs::read_to_string(batch_path)
            .with_context(|| format!("reading batch file {}", batch_path.display()))?;
        let queries: Vec<String> = content.lines().map(str::to_string).collect();
        console.run_batch(&queries).await;
        export_if_requested(&console, args.output.as_deref())?;
        return Ok(());
    }

    console.run().await.context("console session failed")?;
    Ok(())
}

fn export_if_requested(console: &Console, output: Option<&std::path::Path>) -> anyhow::Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    let format: ExportFormat = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json")
        .parse()
        .context("unknown export format for output file")?;
    let rendered = websearch::export::export_results(console.engine(), format, true)
        .context("export failed")?;
    std::fs::write(path, rendered)
        .with_context(|| format!("writing export to {}", path.display()))?;
    Ok(())
}
