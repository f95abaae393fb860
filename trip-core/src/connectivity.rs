//! Online/offline state with explicit subscription.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;

use crate::api::Api;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online)
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkStatus::Online => f.write_str("online"),
            NetworkStatus::Offline => f.write_str("offline"),
        }
    }
}

/// A change between two network states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

impl Transition {
    pub fn between(previous: NetworkStatus, current: NetworkStatus) -> Option<Transition> {
        match (previous, current) {
            (NetworkStatus::Offline, NetworkStatus::Online) => Some(Transition::WentOnline),
            (NetworkStatus::Online, NetworkStatus::Offline) => Some(Transition::WentOffline),
            _ => None,
        }
    }
}

/// Source of truth for connectivity. Consumers hold a `watch::Receiver`.
pub struct Connectivity {
    tx: watch::Sender<NetworkStatus>,
}

impl Connectivity {
    pub fn new(initial: NetworkStatus) -> Self {
        let (tx, _) = watch::channel(initial);
        Connectivity { tx }
    }

    pub fn status(&self) -> NetworkStatus {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }

    /// Publish a status. Returns the transition, if this was one.
    pub fn set_status(&self, status: NetworkStatus) -> Option<Transition> {
        let mut transition = None;
        self.tx.send_if_modified(|current| {
            transition = Transition::between(*current, status);
            *current = status;
            transition.is_some()
        });

        if let Some(t) = transition {
            tracing::info!(?t, "connectivity changed");
        }
        transition
    }
}

/// Poll the server and publish whether it is reachable. Runs until the
/// future is dropped.
pub async fn run_probe(api: &Api, connectivity: &Connectivity, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let status = match api.ping().await {
            Ok(()) => NetworkStatus::Online,
            Err(e) => {
                tracing::debug!(error = %e, "probe failed");
                NetworkStatus::Offline
            }
        };
        connectivity.set_status(status);
    }
}
