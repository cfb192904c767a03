use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use roster_server::config::AppConfig;
use roster_server::logging::init_tracing;
use roster_server::models::EntityKind;
use roster_server::startup::{build_router, setup_backend};

#[derive(Parser, Debug)]
#[command(name = "roster-server")]
#[command(about = "Employee and student roster REST service")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from specified file or use defaults
    let (mut app_config, using_defaults) =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            (AppConfig::default_config(), true)
        } else {
            let config = AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?;
            (config, false)
        };

    init_tracing(&app_config.logging.level);

    if using_defaults {
        tracing::warn!("no config.yaml found, using in-memory SQLite on 127.0.0.1:8080");
    } else {
        tracing::info!(path = %args.config, "configuration loaded");
    }

    // Override with command line arguments if provided
    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    let backend = setup_backend(&app_config).await?;
    let app = build_router(backend.clone(), &app_config);

    let host: std::net::IpAddr = app_config.server.host.parse().unwrap_or_else(|_| {
        tracing::warn!(host = %app_config.server.host, "invalid host address, using 127.0.0.1");
        [127, 0, 0, 1].into()
    });
    let addr = SocketAddr::from((host, app_config.server.port));

    for kind in EntityKind::ALL {
        tracing::info!(resource = %kind, "serving {}", kind.path());
    }
    tracing::info!(%addr, "roster server listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.cleanup().await?;
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
