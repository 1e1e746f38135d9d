use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use pizzamock_common::FixtureKind;
use pizzamock_web::MockConfig;

#[derive(Parser, Debug)]
#[command(name = "pizzamock-web")]
#[command(about = "In-memory mock backend for the pizza storefront", version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "PIZZAMOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides config and PIZZAMOCK_LISTEN)
    #[arg(short, long)]
    listen: Option<String>,

    /// Seed data: storefront or profiles
    #[arg(short, long)]
    fixture: Option<FixtureKind>,

    /// Forward unmocked requests to this base URL
    #[arg(long)]
    upstream: Option<String>,

    /// Disable permissive CORS
    #[arg(long)]
    no_cors: bool,

    /// Write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => MockConfig::load(path)?,
        None => MockConfig::default(),
    }
    .apply_env()?;

    if let Some(listen) = args.listen {
        cfg.listen = listen;
    }
    if let Some(fixture) = args.fixture {
        cfg.fixture = fixture;
    }
    if let Some(upstream) = args.upstream {
        cfg.upstream = Some(upstream);
    }
    if args.no_cors {
        cfg.cors = false;
    }

    if let Some(path) = args.write_config {
        cfg.save(&path)?;
        info!("Wrote config to {}", path.display());
        return Ok(());
    }

    let addr = cfg.listen_addr()?;
    info!("Starting PizzaMock on http://{} ({} fixture)", addr, cfg.fixture);

    pizzamock_web::server::serve(addr, cfg).await
}
