//! Termination signals that end a load run
//!
//! Any of them fires the run's [`ShutdownSignal`](crate::ShutdownSignal),
//! after which every publisher unwinds and the final summary is printed.
//! On Unix that is `SIGINT` (Ctrl-C at the terminal), `SIGTERM` (service
//! managers and `kill`) and `SIGQUIT`. Other platforms only get Ctrl-C.

/// Completes when the process receives a termination signal
///
/// Returns `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives a termination signal
///
/// Returns `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
