use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use accentcoach::catalog::PhraseCatalog;
use accentcoach::cli::Args;
use accentcoach::config::AppConfig;
use accentcoach::session::{run_session, CaptureSettings, SessionConfig};
use accentcoach::ui;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let catalog = match args
        .runtime_catalog()
        .context("failed to load phrase catalog")?
    {
        Some(runtime) => {
            runtime.validate().context("catalog validation failed")?;
            runtime.to_catalog()
        }
        None => PhraseCatalog::default_french(),
    };

    let assets = AppConfig::from_override(args.assets_path.clone())
        .context("failed to resolve assets directory")?;
    let capture = CaptureSettings::new(
        args.device.clone(),
        args.sample_rate,
        args.latency_range()?,
    );
    let runtime = run_session(SessionConfig::new(capture))?;
    ui::launch_ui(runtime, catalog, assets.assets_root)
}
