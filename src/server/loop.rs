// Server loop module
// Accepts connections until shutdown is requested

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `state.shutdown` fires, then
/// drain open connections.
///
/// Draining waits at most `max(read_timeout, write_timeout)`, the same bound
/// each connection already runs under.
#[allow(clippy::ignored_unit_patterns)]
pub async fn run_server_loop(listener: TcpListener, state: Arc<AppState>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = state.shutdown.notified() => {
                break;
            }
        }
    }

    drop(listener);
    let open = state.connection_count();
    logger::log_shutdown(open);

    let performance = &state.config.performance;
    let grace = Duration::from_secs(std::cmp::max(
        performance.read_timeout,
        performance.write_timeout,
    ));
    let remaining = state.drain(grace).await;
    if open > 0 {
        logger::log_drained(open, remaining);
    }
}
