//! Online/offline tracking and reconnect draining.
//!
//! `ConnectivitySignal` plays the role of the platform's online flag. Hosts
//! without one keep it current with a `ReachabilityPoller`. The monitor
//! listens to the signal and drains the offline queue once per
//! offline → online edge. A failed drain is not retried; the entries wait for
//! the next reconnect.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::service::TranslationService;

/// Read-only connectivity flag with change notifications
pub trait ConnectivityProvider: Send + Sync {
    fn is_online(&self) -> bool;

    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Settable connectivity flag backed by a watch channel
#[derive(Debug)]
pub struct ConnectivitySignal {
    sender: watch::Sender<bool>,
}

impl ConnectivitySignal {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self { sender }
    }

    /// Subscribers are only notified when the value actually changes
    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
    }
}

impl ConnectivityProvider for ConnectivitySignal {
    fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
    Unchanged,
}

impl Transition {
    pub fn between(was_online: bool, is_online: bool) -> Self {
        match (was_online, is_online) {
            (false, true) => Self::CameOnline,
            (true, false) => Self::WentOffline,
            _ => Self::Unchanged,
        }
    }
}

/// Background task that drains the service's offline queue on reconnect
pub struct ConnectivityMonitor {
    handle: JoinHandle<()>,
}

impl ConnectivityMonitor {
    /// Start watching `connectivity`. The starting state is read here, so a
    /// change made right after `spawn` returns is still seen as a transition.
    ///
    /// Flaps faster than the task can observe collapse into the latest value.
    pub fn spawn(service: Arc<TranslationService>, connectivity: &dyn ConnectivityProvider) -> Self {
        let mut receiver = connectivity.subscribe();
        let mut is_online = *receiver.borrow_and_update();
        debug!("Connectivity monitor started (online: {})", is_online);

        let handle = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let current = *receiver.borrow_and_update();
                match Transition::between(is_online, current) {
                    Transition::CameOnline => {
                        info!("Connection restored, processing offline queue");
                        let report = service.process_queue().await;
                        info!(
                            "Offline queue processed: {} translated, {} requeued",
                            report.processed, report.requeued
                        );
                    }
                    Transition::WentOffline => {
                        info!("Connection lost, new translations will be queued");
                    }
                    Transition::Unchanged => {}
                }
                is_online = current;
            }
            debug!("Connectivity signal closed, monitor stopping");
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Background task that re-probes an endpoint and feeds the result into a
/// signal. The first probe runs one `interval` after spawn.
pub struct ReachabilityPoller {
    handle: JoinHandle<()>,
}

impl ReachabilityPoller {
    pub fn spawn(
        signal: Arc<ConnectivitySignal>,
        endpoint: String,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                signal.set_online(probe_reachability(&endpoint, timeout).await);
            }
        });
        Self { handle }
    }

    pub fn shutdown(self) {
        self.handle.abort();
    }
}

/// Whether `endpoint` answers at all. Any HTTP status counts as reachable;
/// only transport failures (DNS, connect, timeout) count as offline.
pub async fn probe_reachability(endpoint: &str, timeout: Duration) -> bool {
    let client = match Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            debug!("Failed to build probe client: {}", e);
            return false;
        }
    };

    match client.head(endpoint).send().await {
        Ok(response) => {
            debug!("Reachability probe {} answered {}", endpoint, response.status());
            true
        }
        Err(e) => {
            debug!("Reachability probe {} failed: {}", endpoint, e);
            false
        }
    }
}
