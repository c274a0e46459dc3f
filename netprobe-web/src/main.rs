//! netprobe HTTP server entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use actix_web::{App, HttpServer};
use clap::Parser;
use netprobe_web::config::{CliOverrides, Config};
use netprobe_web::logging::init_logging;
use netprobe_web::request_log::RequestLog;
use netprobe_web::routes;
use netprobe_web::state::AppState;

/// Seconds in-flight requests get to finish on SIGINT / SIGTERM.
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

#[derive(Parser)]
#[command(name = "netprobe", version, about = "DNS lookup, custom resolver and port probe API")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "NETPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address (overrides server.bind_address)
    #[arg(short, long)]
    bind: Option<String>,

    /// HTTP port (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(
        cli.config.as_deref(),
        CliOverrides {
            bind_address: cli.bind,
            port: cli.port,
        },
    )
    .and_then(|config| config.validate().map(|()| config))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => {
            tracing::info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Server error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let workers = config.server.worker_count();
    let bind = (config.server.bind_address.clone(), config.server.port);
    let cors_origins = config.server.cors_allowed_origins.clone();

    tracing::info!(
        bind = %config.server.bind_address,
        port = config.server.port,
        workers,
        dns_backend = ?config.dns.backend,
        rate_limit = config.rate_limit.enabled,
        trust_proxy = config.server.trust_proxy,
        "Starting netprobe"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors(&cors_origins))
            .wrap(RequestLog)
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .workers(workers)
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
