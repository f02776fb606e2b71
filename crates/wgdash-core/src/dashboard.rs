// ── Dashboard ──
//
// The application struct. Builds the session and the stores once and
// hands them out by reference; `open` drives a navigation end to end:
// resolve the path, load what the view needs, and return it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;
use wgdash_api::{Device, Peer, PeerQuery};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::recovery::CredentialEvent;
use crate::router::{Navigation, Navigator, Router, View};
use crate::session::{Session, SessionHooks};
use crate::store::{DeviceStore, ModalStore};

/// Data loaded for a view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewData {
    DeviceList {
        devices: Arc<Vec<Arc<Device>>>,
    },
    DeviceDetail {
        device: Arc<Device>,
        peers: Vec<Peer>,
    },
    NotFound {
        path: String,
    },
}

/// A rendered navigation: where we are, at which scroll offset, and the
/// data for the view.
#[derive(Debug, Clone)]
pub struct Screen {
    pub navigation: Navigation,
    pub data: ViewData,
}

pub struct Dashboard {
    session: Session,
    devices: Arc<DeviceStore>,
    modal: Arc<ModalStore>,
    navigator: Navigator,
}

impl Dashboard {
    pub fn new(config: &SessionConfig, hooks: SessionHooks) -> Result<Self, CoreError> {
        let modal = Arc::new(ModalStore::new());
        let session = Session::new(config, hooks, Arc::clone(&modal))?;
        Ok(Self::with_session(session))
    }

    /// Build around an existing session, sharing its modal store.
    pub fn with_session(session: Session) -> Self {
        let modal = Arc::clone(session.modal());
        Self {
            session,
            devices: Arc::new(DeviceStore::new()),
            modal,
            navigator: Navigator::new(Router::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn devices(&self) -> &Arc<DeviceStore> {
        &self.devices
    }

    pub fn modal(&self) -> &Arc<ModalStore> {
        &self.modal
    }

    pub fn subscribe_credentials(&self) -> watch::Receiver<CredentialEvent> {
        self.session.subscribe_credentials()
    }

    /// Navigate to `path` and load its view.
    pub async fn open(&mut self, path: &str) -> Result<Screen, CoreError> {
        let navigation = self.navigator.navigate(path);
        self.load(navigation).await
    }

    /// Go back one history entry, reloading its data.
    pub async fn back(&mut self) -> Result<Option<Screen>, CoreError> {
        match self.navigator.back() {
            Some(navigation) => self.load(navigation).await.map(Some),
            None => Ok(None),
        }
    }

    /// Reload the current view in place, e.g. after the token changed.
    pub async fn reload(&mut self) -> Result<Option<Screen>, CoreError> {
        match self.navigator.current() {
            Some(navigation) => self.load(navigation).await.map(Some),
            None => Ok(None),
        }
    }

    async fn load(&self, navigation: Navigation) -> Result<Screen, CoreError> {
        debug!(path = %navigation.resolved.path, view = %navigation.resolved.view, "loading view");

        let data = match &navigation.resolved.view {
            View::DeviceList => {
                self.devices.get_devices_list(&self.session).await?;
                ViewData::DeviceList {
                    devices: self.devices.devices(),
                }
            }
            View::DeviceDetail { id } => {
                let device = self.devices.refresh_device(&self.session, id).await?;
                let peers = self
                    .session
                    .list_peers(id, &PeerQuery::default())
                    .await?
                    .items;
                ViewData::DeviceDetail { device, peers }
            }
            View::NotFound => {
                self.devices.clear();
                ViewData::NotFound {
                    path: navigation.resolved.path.clone(),
                }
            }
        };

        Ok(Screen { navigation, data })
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("session", &self.session)
            .field("devices", &self.devices.len())
            .field("modal", &self.modal.active())
            .finish_non_exhaustive()
    }
}
