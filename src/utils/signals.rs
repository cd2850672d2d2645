//! Signal handling for graceful shutdown

use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

/// Wait for the first of SIGTERM, SIGINT or SIGQUIT and return its number
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();

    let signal = signals.next().await.unwrap_or(SIGTERM);
    info!("Received signal: {}", signal);

    handle.close();
    Ok(signal)
}
