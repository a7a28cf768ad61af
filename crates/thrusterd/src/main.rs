//! `thrusterd`: demo binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line and load [`Config`] from the YAML file, if any.
//! 2. Initialise structured JSON logging.
//! 3. Register the `notes` resource and an ungated `/health` probe.
//! 4. Serve until the listener fails.

mod notes;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use axum::{routing::get, Router};
use clap::Parser;
use thruster::{telemetry, Config, Server};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "thrusterd", version, about)]
struct Args {
    /// YAML configuration file; `THRUSTER_*` variables override its values.
    #[arg(short, long, env = "THRUSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `thruster=debug,tower_http=debug`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match &args.config {
        Some(path) => Config::from_file(path).map_err(|e| {
            eprintln!("ERROR: thrusterd configuration invalid: {e}");
            e
        })?,
        None => Config::default(),
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&args.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %cfg.address(),
        tls = cfg.tls,
        "thrusterd starting"
    );

    // -----------------------------------------------------------------------
    // 3. Routes
    // -----------------------------------------------------------------------
    let probes = Router::new().route("/health", get(|| async { "OK" }));
    let mut server = Server::with_router(cfg, probes);
    server.add_json_resource("/notes", notes::Notes::default());

    // -----------------------------------------------------------------------
    // 4. Serve
    // -----------------------------------------------------------------------
    server.run().await.context("server stopped")
}
