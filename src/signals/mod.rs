// Process lifecycle: termination signals and the shutdown latch
// The HTTP server drains on the first SIGTERM/SIGINT; background tasks watch the latch

use anyhow::Result;
use futures::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::fmt;
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, info};

/// Why the server is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Terminate,
    Interrupt,
    /// The signal stream closed without delivering a signal
    StreamClosed,
}

impl ShutdownReason {
    fn from_signal(signal: i32) -> Option<Self> {
        match signal {
            SIGTERM => Some(Self::Terminate),
            SIGINT => Some(Self::Interrupt),
            _ => None,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminate => f.write_str("SIGTERM"),
            Self::Interrupt => f.write_str("SIGINT"),
            Self::StreamClosed => f.write_str("signal stream closed"),
        }
    }
}

/// Register for SIGTERM and SIGINT and resolve with the first one received
pub fn listen() -> Result<impl Future<Output = ShutdownReason>> {
    let mut signals = Signals::new([SIGTERM, SIGINT])?;

    Ok(async move {
        while let Some(signal) = signals.next().await {
            match ShutdownReason::from_signal(signal) {
                Some(reason) => return reason,
                None => debug!(signal, "Ignoring signal"),
            }
        }
        ShutdownReason::StreamClosed
    })
}

/// One-way latch telling background tasks to stop
///
/// Receivers created after the latch fired still observe it.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn watcher(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn trigger(&self, reason: ShutdownReason) {
        if self.tx.send_replace(true) {
            return;
        }
        info!(%reason, watchers = self.tx.receiver_count(), "Stopping background tasks");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `watcher` sees the latch set, or its sender is gone
pub async fn triggered(watcher: &mut watch::Receiver<bool>) {
    // An error means the latch was dropped, which also ends the task
    let _ = watcher.wait_for(|stopped| *stopped).await;
}
