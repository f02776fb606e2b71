// ── Device store ──
//
// Holds the device list from the last fetch. Refreshing replaces the
// whole collection; nothing here merges, filters, or paginates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;
use wgdash_api::{Device, PageRequest};

use super::collection::Collection;
use crate::error::CoreError;
use crate::session::Session;

/// The last-fetched devices, in server order.
pub struct DeviceStore {
    devices: Collection<Device>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            devices: Collection::new(),
            last_refresh,
        }
    }

    /// Fetch the device list and replace the held collection with it.
    ///
    /// Errors come straight from the session (after its authentication
    /// recovery) and leave the current contents untouched.
    pub async fn get_devices_list(&self, session: &Session) -> Result<usize, CoreError> {
        let page = session.list_devices(PageRequest::default()).await?;
        let count = page.items.len();

        self.devices.replace_all(page.items);
        self.last_refresh.send_replace(Some(Utc::now()));

        debug!(count, "device list refreshed");
        Ok(count)
    }

    /// Re-fetch one device and update it in place.
    pub async fn refresh_device(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Arc<Device>, CoreError> {
        match session.get_device(name).await {
            Ok(device) => {
                self.devices.upsert(device);
                self.devices
                    .get(name)
                    .ok_or_else(|| CoreError::DeviceNotFound {
                        name: name.into(),
                        source: None,
                    })
            }
            Err(err @ CoreError::DeviceNotFound { .. }) => {
                self.devices.remove(name);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Record a device returned by a create or update call.
    pub fn upsert(&self, device: Device) {
        self.devices.upsert(device);
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Device>> {
        self.devices.remove(name)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn devices(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn device(&self, name: &str) -> Option<Arc<Device>> {
        self.devices.get(name)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Mutation counter; bumps on every change, including a refresh that
    /// returns identical data.
    pub fn version(&self) -> u64 {
        self.devices.version()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Device>>>> {
        self.devices.subscribe()
    }

    /// Drop everything, as when navigating away from the device views.
    pub fn clear(&self) {
        self.devices.clear();
        self.last_refresh.send_replace(None);
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last refresh happened, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> Device {
        Device {
            name: name.into(),
            ..Device::default()
        }
    }

    #[test]
    fn upsert_and_remove_track_devices() {
        let store = DeviceStore::new();
        store.upsert(device("wg0"));
        store.upsert(device("wg1"));
        assert_eq!(store.len(), 2);

        assert!(store.remove("wg0").is_some());
        assert!(store.device("wg0").is_none());
        assert_eq!(store.devices()[0].name, "wg1");
    }

    #[test]
    fn clear_resets_refresh_time() {
        let store = DeviceStore::new();
        store.upsert(device("wg0"));
        store.last_refresh.send_replace(Some(Utc::now()));
        assert!(store.data_age().is_some());

        store.clear();
        assert!(store.is_empty());
        assert!(store.last_refresh().is_none());
    }
}
