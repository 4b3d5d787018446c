//! Blog engine service entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blog_engine::api::{create_router, AppState};
use blog_engine::config::Config;
use blog_engine::insight::{InsightClient, Telemetry};
use blog_engine::metrics;
use blog_engine::store::PgStore;
use blog_engine::utils::shutdown_signal;

/// Blog engine liveness service.
#[derive(Parser, Debug)]
#[command(name = "blog-engine")]
#[command(about = "Blog engine liveness service with best-effort Insight telemetry")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default).
    Run {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check Insight sidecar connectivity.
    CheckInsight,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("blog_engine=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::CheckInsight) => cmd_check_insight().await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BLOG ENGINE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Database: {}@{}:{}/{}", config.db_user, config.db_host, config.db_port, config.db_name);
    println!("  Listen Port: {}", config.port);
    println!("  Environment: {}", config.environment);
    println!("  Observability: {}", if config.enable_observability { "enabled" } else { "disabled" });

    if config.enable_observability {
        match config.insight_target() {
            Some((url, _)) => println!("  Insight URL: {}", url),
            None => println!("  WARNING: observability enabled but INSIGHT_URL/INSIGHT_API_KEY missing"),
        }
        println!("  Insight Timeout: {}ms", config.insight_timeout_ms);
    }

    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Check Insight sidecar connectivity.
async fn cmd_check_insight() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BLOG ENGINE - INSIGHT CONNECTIVITY CHECK");
    println!("======================================================================");

    let config = Config::load()?;

    let (url, key) = match config.insight_target() {
        Some(target) => target,
        None => {
            println!("Insight is not configured.");
            println!("Set ENABLE_OBSERVABILITY=true, INSIGHT_URL and INSIGHT_API_KEY.");
            return Err(anyhow::anyhow!("Insight not configured"));
        }
    };

    println!("Sidecar URL: {}", url);
    println!("Timeout: {}ms", config.insight_timeout_ms);

    print!("\nProbing sidecar health... ");
    let client = InsightClient::new(
        url,
        key,
        Duration::from_millis(config.insight_timeout_ms),
        config.environment.clone(),
    );

    match client.health().await {
        Ok(()) => {
            println!("OK");
            println!("======================================================================");
            println!("INSIGHT CONNECTIVITY CHECK PASSED");
            println!("======================================================================");
            Ok(())
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            println!("======================================================================");
            Err(anyhow::anyhow!("Insight sidecar unreachable"))
        }
    }
}

/// Run the HTTP service.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        "Observability: {}",
        if config.enable_observability { "enabled" } else { "disabled" }
    );

    // Local diagnostics recorder
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Connect the content store; unlike the sidecar this is fatal
    let store = PgStore::connect(&config.database_url()).await.map_err(|e| {
        error!("Database connection failed: {}", e);
        e
    })?;
    info!("Database connected");

    // One-time telemetry initialization; sole writer of the state
    let telemetry = Telemetry::init(&config).await;

    let state = AppState::new(Arc::new(store), Arc::new(telemetry));
    let router = create_router(state).route(
        "/metrics",
        axum::routing::get(move || {
            let prometheus = prometheus.clone();
            async move { prometheus.render() }
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
