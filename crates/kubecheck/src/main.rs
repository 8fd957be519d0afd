use clap::Parser;
use color_eyre::eyre::Context;
use tokio::net::TcpListener;

use kubecheck::config::Args;
use kubecheck::constants::KUBECHECK_VERSION;
use kubecheck::tracing::init_tracing;
use kubecheck::web::{AppState, app, shutdown_signal};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Init Tracing
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = init_tracing(args.log_file.as_deref())?;

    let allowed_origin = args
        .allowed_origin()
        .wrap_err_with(|| format!("invalid allowed origin {:?}", args.allowed_origin))?;

    let state = AppState {
        probe_options: args.probe_options(),
        allowed_origin: Some(allowed_origin),
    };

    let listener = TcpListener::bind(args.bind)
        .await
        .wrap_err_with(|| format!("failed to bind to {}", args.bind))?;
    tracing::info!(
        "kubecheck {} listening on {}",
        KUBECHECK_VERSION,
        listener.local_addr()?
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    tracing::info!("Server stopped.");

    Ok(())
}
