//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl+C) and, on Unix, SIGTERM
//! - Translate the first one received into cancellation of the service token
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Signals only cancel a token; the service decides what shutdown means

use tokio_util::sync::CancellationToken;

/// Which signal ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

/// Wait for the first shutdown signal.
pub async fn wait_for_signal() -> std::io::Result<Signal> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map(|()| Signal::Interrupt),
            _ = terminate.recv() => Ok(Signal::Terminate),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| Signal::Interrupt)
    }
}

/// Cancel `token` on the first shutdown signal, or return early if it is
/// cancelled by someone else.
pub async fn cancel_on_signal(token: CancellationToken) -> std::io::Result<Option<Signal>> {
    tokio::select! {
        signal = wait_for_signal() => {
            let signal = signal?;
            tracing::info!(signal = ?signal, "Shutdown signal received");
            token.cancel();
            Ok(Some(signal))
        }
        _ = token.cancelled() => {
            tracing::info!("Shutdown requested");
            Ok(None)
        }
    }
}
