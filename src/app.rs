//! Everything a command needs, built once at startup.

use std::sync::Arc;

use anyhow::Result;
use trip_core::store::{FileStorage, Storage};
use trip_core::{Api, Connectivity, NetworkStatus, Provider, TripConfig};

pub struct App {
    pub config: TripConfig,
    pub connectivity: Connectivity,
    pub provider: Provider<Api>,
    /// Set by `--offline`; the probe never brings us back online
    pub forced_offline: bool,
}

impl App {
    pub async fn load(forced_offline: bool) -> Result<Self> {
        let config = TripConfig::load()?;
        let api = Api::new(&config.end_point, &config.authorization)?;

        let initial = if forced_offline {
            NetworkStatus::Offline
        } else {
            match api.ping().await {
                Ok(()) => NetworkStatus::Online,
                Err(e) => {
                    tracing::info!(error = %e, "server unreachable, starting offline");
                    NetworkStatus::Offline
                }
            }
        };

        let connectivity = Connectivity::new(initial);
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.data_path()));
        let provider = Provider::new(api, storage, &config.store_name, connectivity.subscribe());

        Ok(App {
            config,
            connectivity,
            provider,
            forced_offline,
        })
    }

    pub fn status(&self) -> NetworkStatus {
        self.connectivity.status()
    }
}
