use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Wait for SIGINT or SIGTERM and return the name of the one received.
pub async fn shutdown_signal() -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Returns a token that is cancelled on the first SIGINT or SIGTERM.
///
/// The scheduler loop and the input loop both watch it; cancelling stops the
/// loop between slices and kills any stopped job.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(name) => {
                tracing::info!(signal = name, "Received signal, shutting down");
                cancel.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
            }
        }
    });

    token
}
