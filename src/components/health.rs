use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use futures_util::future::join_all;
use serde::Serialize;

use super::store::RoomStore;

pub const PASS: &str = "pass";
pub const FAIL: &str = "fail";

/// A ping slower than this counts as a failed check.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
pub struct ComponentHealthStatus {
    pub status: String,
}

impl ComponentHealthStatus {
    fn from_ping(reachable: bool) -> Self {
        Self {
            status: if reachable { PASS } else { FAIL }.to_string(),
        }
    }
}

struct StoreCheck {
    name: String,
    store: Arc<dyn RoomStore>,
}

/// Readiness of the stores the dispatcher reads from.
pub struct HealthComponent {
    stores: Vec<StoreCheck>,
    ping_timeout: Duration,
}

impl Default for HealthComponent {
    fn default() -> Self {
        Self::with_timeout(PING_TIMEOUT)
    }
}

impl fmt::Debug for HealthComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|check| check.name.as_str()).collect();
        f.debug_struct("HealthComponent")
            .field("stores", &names)
            .field("ping_timeout", &self.ping_timeout)
            .finish()
    }
}

impl HealthComponent {
    pub fn with_timeout(ping_timeout: Duration) -> Self {
        Self {
            stores: vec![],
            ping_timeout,
        }
    }

    pub fn register_store(&mut self, name: &str, store: Arc<dyn RoomStore>) {
        self.stores.push(StoreCheck {
            name: name.to_string(),
            store,
        });
    }

    /// Pings every registered store concurrently, keyed by registration name.
    #[tracing::instrument(name = "Calculate components status")]
    pub async fn calculate_status(&self) -> HashMap<String, ComponentHealthStatus> {
        let pings = self.stores.iter().map(|check| async move {
            log::debug!("About to check: {}", check.name);
            let reachable = match tokio::time::timeout(self.ping_timeout, check.store.ping()).await {
                Ok(reachable) => reachable,
                Err(_) => {
                    log::warn!("{} didn't answer the ping within {:?}", check.name, self.ping_timeout);
                    false
                }
            };
            (check.name.clone(), ComponentHealthStatus::from_ping(reachable))
        });

        join_all(pings).await.into_iter().collect()
    }
}
