// ── Authenticated session ──
//
// Wraps a `WgrestClient` with the bearer token read from a `TokenStore`
// and intercepts every failed request. Authentication failures (401 or an
// "invalid key" message) trigger the token prompt; on confirmation the new
// token is stored, swapped into the client, announced on the credential
// channel, and the original request is replayed.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use wgdash_api::{
    BearerToken, Device, DeviceCreateOrUpdateRequest, InterfaceStatus, Page, PageRequest, Peer,
    PeerCreateOrUpdateRequest, PeerQuery, VersionInfo, WgrestClient,
};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::notify::{Notice, Notifier};
use crate::recovery::{ACCESS_TOKEN_MODAL, CredentialEvent, PromptError, TokenPrompt};
use crate::store::ModalStore;
use crate::token::TokenStore;

const TOKEN_SAVED: &str = "Your token is saved";
const INPUT_CANCELED: &str = "Input canceled";

/// The collaborators a session talks to besides the HTTP server.
pub struct SessionHooks {
    pub tokens: Arc<dyn TokenStore>,
    pub prompt: Arc<dyn TokenPrompt>,
    pub notifier: Arc<dyn Notifier>,
}

/// Cheaply cloneable handle to an authenticated wgrest session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: WgrestClient,
    tokens: Arc<dyn TokenStore>,
    prompt: Arc<dyn TokenPrompt>,
    notifier: Arc<dyn Notifier>,
    modal: Arc<ModalStore>,
    credentials: watch::Sender<CredentialEvent>,
    /// Held while a prompt is on screen; at most one prompt at a time.
    recovery: Mutex<()>,
    notify_all_errors: bool,
}

impl Session {
    /// Build a session, reading the current token from `hooks.tokens`.
    ///
    /// A missing token is not an error: requests go out with an empty
    /// bearer value and the first rejection opens the prompt.
    pub fn new(
        config: &SessionConfig,
        hooks: SessionHooks,
        modal: Arc<ModalStore>,
    ) -> Result<Self, CoreError> {
        let token = match hooks.tokens.load()? {
            Some(token) => BearerToken::new(token),
            None => {
                debug!("no stored token, starting unauthenticated");
                BearerToken::empty()
            }
        };

        let client = WgrestClient::new(config.url.as_str(), token, &config.transport())?;
        Ok(Self::from_client(client, config.notify_all_errors, hooks, modal))
    }

    /// Wrap an existing client. Its token slot is used as is.
    pub fn from_client(
        client: WgrestClient,
        notify_all_errors: bool,
        hooks: SessionHooks,
        modal: Arc<ModalStore>,
    ) -> Self {
        let (credentials, _) = watch::channel(CredentialEvent::initial());
        Self {
            inner: Arc::new(SessionInner {
                client,
                tokens: hooks.tokens,
                prompt: hooks.prompt,
                notifier: hooks.notifier,
                modal,
                credentials,
                recovery: Mutex::new(()),
                notify_all_errors,
            }),
        }
    }

    /// The wrapped client, for calls that should bypass the interceptor.
    pub fn client(&self) -> &WgrestClient {
        &self.inner.client
    }

    pub fn modal(&self) -> &Arc<ModalStore> {
        &self.inner.modal
    }

    /// Receive a [`CredentialEvent`] every time the token changes.
    pub fn subscribe_credentials(&self) -> watch::Receiver<CredentialEvent> {
        self.inner.credentials.subscribe()
    }

    /// Number of token rotations since the session was built.
    pub fn generation(&self) -> u64 {
        self.inner.credentials.borrow().generation
    }

    /// Issue `op` through the interceptor.
    ///
    /// `op` must be replayable: it is called again, with the same client
    /// handle, after every successful recovery. A replacement token that is
    /// rejected as well opens the prompt again.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: Fn(WgrestClient) -> Fut,
        Fut: Future<Output = Result<T, wgdash_api::Error>>,
    {
        loop {
            let issued_with = self.generation();
            let err = match op(self.inner.client.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if self.inner.notify_all_errors {
                self.inner.notifier.notify(&Notice::error(err.to_string()));
            }

            if !err.is_auth_failure() {
                return Err(err.into());
            }

            warn!(
                status = ?err.status(),
                generation = issued_with,
                "request rejected as unauthenticated"
            );
            self.recover(issued_with, err).await?;
        }
    }

    /// Store `token`, swap it into the client and announce the change.
    pub fn rotate_token(&self, token: SecretString) -> Result<(), CoreError> {
        self.inner.tokens.save(&token)?;
        self.inner.client.token().replace(token);
        self.inner.notifier.notify(&Notice::success(TOKEN_SAVED));
        self.inner.credentials.send_modify(|event| *event = event.next());

        info!(generation = self.generation(), "access token rotated");
        Ok(())
    }

    async fn recover(&self, issued_with: u64, failure: wgdash_api::Error) -> Result<(), CoreError> {
        let _guard = self.inner.recovery.lock().await;

        // Another request already obtained a new token while we waited.
        if self.generation() != issued_with {
            debug!("token rotated concurrently, replaying");
            return Ok(());
        }

        self.inner.modal.open_modal(ACCESS_TOKEN_MODAL);
        let prompt = Arc::clone(&self.inner.prompt);
        let answer = tokio::task::spawn_blocking(move || prompt.request_token())
            .await
            .unwrap_or_else(|e| Err(PromptError(e.to_string())));
        self.inner.modal.close_modal();

        match answer {
            Ok(Some(token)) => self.rotate_token(token),
            Ok(None) => {
                self.inner.notifier.notify(&Notice::info(INPUT_CANCELED));
                info!("token prompt cancelled");
                Err(CoreError::RecoveryCancelled { source: failure })
            }
            Err(e) => Err(CoreError::PromptUnavailable {
                message: e.to_string(),
                source: failure,
            }),
        }
    }

    // ── Service ──────────────────────────────────────────────────────

    pub async fn version(&self) -> Result<VersionInfo, CoreError> {
        self.call(|c| async move { c.version().await }).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn list_devices(&self, page: PageRequest) -> Result<Page<Device>, CoreError> {
        self.call(|c| async move { c.list_devices(page).await })
            .await
    }

    /// Every device, following `next` links.
    pub async fn list_all_devices(&self) -> Result<Vec<Device>, CoreError> {
        self.call(|c| async move {
            c.paginate_all(PageRequest::default(), |page| {
                let c = c.clone();
                async move { c.list_devices(page).await }
            })
            .await
        })
        .await
    }

    pub async fn get_device(&self, name: &str) -> Result<Device, CoreError> {
        self.call(|c| async move { c.get_device(name).await })
            .await
            .map_err(device_not_found(name))
    }

    pub async fn create_device(
        &self,
        body: &DeviceCreateOrUpdateRequest,
    ) -> Result<Device, CoreError> {
        self.call(|c| async move { c.create_device(body).await })
            .await
    }

    pub async fn update_device(
        &self,
        name: &str,
        body: &DeviceCreateOrUpdateRequest,
    ) -> Result<Device, CoreError> {
        self.call(|c| async move { c.update_device(name, body).await })
            .await
            .map_err(device_not_found(name))
    }

    pub async fn delete_device(&self, name: &str) -> Result<(), CoreError> {
        self.call(|c| async move { c.delete_device(name).await })
            .await
            .map_err(device_not_found(name))
    }

    pub async fn device_up(&self, name: &str) -> Result<InterfaceStatus, CoreError> {
        self.call(|c| async move { c.device_up(name).await })
            .await
            .map_err(device_not_found(name))
    }

    pub async fn device_down(&self, name: &str) -> Result<InterfaceStatus, CoreError> {
        self.call(|c| async move { c.device_down(name).await })
            .await
            .map_err(device_not_found(name))
    }

    // ── Peers ────────────────────────────────────────────────────────

    pub async fn list_peers(&self, device: &str, query: &PeerQuery) -> Result<Page<Peer>, CoreError> {
        self.call(|c| async move { c.list_peers(device, query).await })
            .await
            .map_err(device_not_found(device))
    }

    /// Every peer matching `query`, following `next` links from
    /// `query.page`.
    pub async fn list_all_peers(
        &self,
        device: &str,
        query: &PeerQuery,
    ) -> Result<Vec<Peer>, CoreError> {
        self.call(|c| async move {
            c.paginate_all(query.page, |page| {
                let c = c.clone();
                let query = PeerQuery {
                    page,
                    ..query.clone()
                };
                async move { c.list_peers(device, &query).await }
            })
            .await
        })
        .await
        .map_err(device_not_found(device))
    }

    /// `key` may be the standard or URL-safe base64 form.
    pub async fn get_peer(&self, device: &str, key: &str) -> Result<Peer, CoreError> {
        let url_key = wgdash_api::types::url_safe_key(key);
        let url_key = url_key.as_str();
        self.call(|c| async move { c.get_peer(device, url_key).await })
            .await
            .map_err(peer_not_found(key))
    }

    pub async fn create_peer(
        &self,
        device: &str,
        body: &PeerCreateOrUpdateRequest,
    ) -> Result<Peer, CoreError> {
        self.call(|c| async move { c.create_peer(device, body).await })
            .await
            .map_err(device_not_found(device))
    }

    pub async fn update_peer(
        &self,
        device: &str,
        key: &str,
        body: &PeerCreateOrUpdateRequest,
    ) -> Result<Peer, CoreError> {
        let url_key = wgdash_api::types::url_safe_key(key);
        let url_key = url_key.as_str();
        self.call(|c| async move { c.update_peer(device, url_key, body).await })
            .await
            .map_err(peer_not_found(key))
    }

    pub async fn delete_peer(&self, device: &str, key: &str) -> Result<(), CoreError> {
        let url_key = wgdash_api::types::url_safe_key(key);
        let url_key = url_key.as_str();
        self.call(|c| async move { c.delete_peer(device, url_key).await })
            .await
            .map_err(peer_not_found(key))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.inner.client)
            .field("generation", &self.generation())
            .field("notify_all_errors", &self.inner.notify_all_errors)
            .finish_non_exhaustive()
    }
}

/// Narrow a generic 404 to the device the caller asked for. The server's
/// response stays attached as the source.
fn device_not_found(name: &str) -> impl FnOnce(CoreError) -> CoreError + '_ {
    move |err| match err {
        CoreError::NotFound { source, .. } => CoreError::DeviceNotFound {
            name: name.into(),
            source: Some(source),
        },
        other => other,
    }
}

fn peer_not_found(key: &str) -> impl FnOnce(CoreError) -> CoreError + '_ {
    move |err| match err {
        CoreError::NotFound { source, .. } => CoreError::PeerNotFound {
            key: key.into(),
            source: Some(source),
        },
        other => other,
    }
}
