use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use multiroute_core::create_multimodal_graph;
use multiroute_server::{AppState, ServerConfig, create_router};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Multimodal (walk / bike / car) routing service")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    run_until_stopped(serve(args))?
}

/// Drives `future` to completion on a fresh runtime, then drops the runtime
/// without joining its blocking tasks. The graph build cannot be
/// interrupted, so a shutdown requested while it runs must not wait for it.
fn run_until_stopped<F: Future>(future: F) -> std::io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn serve(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let state = AppState::new(config.cost.clone(), config.server.max_concurrent_requests);
    let app = create_router(state.clone(), &config.server);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    info!("Building multimodal graph...");
    let graph_config = config.graph;
    let build = tokio::task::spawn_blocking(move || create_multimodal_graph(&graph_config));

    tokio::select! {
        built = build => match built? {
            Ok(graph) => {
                info!(
                    "Graph ready: {} nodes, {} edges",
                    graph.node_count(),
                    graph.edge_count()
                );
                if !state.set_graph(graph) {
                    warn!("Graph was already set, keeping the first one");
                }
            }
            Err(e) => {
                error!("Failed to build graph: {e}");
                return Err(e.into());
            }
        },
        served = &mut server => {
            served??;
            warn!("Shut down before the graph was ready, abandoning the build");
            return Ok(());
        }
    }

    server.await??;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
