use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::ArtifactStore;

/// Background task that sweeps an [`ArtifactStore`] on a fixed cadence.
///
/// The first sweep runs as soon as the task starts. The task stops when
/// [`stop`](Self::stop) is called or the sweeper is dropped.
pub struct ExpirySweeper {
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ExpirySweeper {
    /// Spawn the sweep loop on the current runtime.
    pub fn start(store: Arc<ArtifactStore>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(store, interval, cancel.clone()));

        Self {
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel the loop and wait for it to exit. Safe to call more than once.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Expiry sweeper ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(store: Arc<ArtifactStore>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Expiry sweeper started for {} (every {}s)",
        store.root().display(),
        interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Expiry sweeper stopped");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = store.sweep().await {
                    warn!("Artifact sweep failed: {}", e);
                }
            }
        }
    }
}
