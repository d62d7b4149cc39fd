//! Crossref Bibliography - Entry Point

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crossref_bibliography::{config::Config, server::BibliographyServer};

#[derive(Parser, Debug)]
#[command(name = "crossref-bibliography")]
#[command(about = "Free text to BibTeX via Crossref, with Zotero forwarding")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value = "5003", env = "PORT")]
    port: u16,

    /// Maximum number of Crossref records per query (overrides CROSSREF_ROWS)
    #[arg(long)]
    rows: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside development.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = dotenv_loaded,
        "Starting Crossref bibliography server"
    );

    let mut config = Config::from_env()?;
    if let Some(rows) = cli.rows {
        config = config.with_rows(rows);
    }

    let server = BibliographyServer::new(config)?;
    server.run_http(cli.port).await
}
