//! Fixed-cadence scheduler and shutdown signalling

use std::future::Future;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

/// Default pause between the end of one cycle and the start of the next
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(90);

/// Receiving side of the shutdown signal, cheap to clone
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Sending side of the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Create a connected trigger/signal pair
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    /// A signal that is never raised
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested. Pends forever if the trigger is
    /// dropped without firing.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Drives discrete cycles with a fixed sleep between them
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run `cycle` until shutdown, sleeping `interval` after each run.
    ///
    /// A cycle in progress is never cancelled; the shutdown only cuts the
    /// sleep short. Returns how many cycles ran.
    pub async fn run<F, Fut>(&self, shutdown: &Shutdown, mut cycle: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut cycles = 0u64;

        while !shutdown.is_requested() {
            cycle().await;
            cycles += 1;

            if shutdown.is_requested() {
                break;
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.wait() => {
                    tracing::info!(cycles, "Shutdown requested during sleep");
                    break;
                }
            }
        }

        cycles
    }
}
