// Async HTTP client for the wgrest REST API.
//
// Base path: /v1/
// Auth: Authorization: Bearer <token>

use std::future::Future;

use reqwest::header::{AUTHORIZATION, LINK};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::BearerToken;
use crate::error::Error;
use crate::pagination::{Page, PageLinks, PageRequest};
use crate::transport::TransportConfig;
use crate::types::{
    Device, DeviceCreateOrUpdateRequest, ErrorResponse, InterfaceStatus, Peer,
    PeerCreateOrUpdateRequest, PeerQuery, VersionInfo,
};

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the wgrest API.
///
/// Every request under `/v1/` carries the bearer token held in a shared
/// [`BearerToken`] slot, read at request-build time. Cloning the client
/// is cheap and shares both the connection pool and the token slot.
#[derive(Clone)]
pub struct WgrestClient {
    http: reqwest::Client,
    base_url: Url,
    token: BearerToken,
}

impl WgrestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, token slot, and transport config.
    pub fn new(
        base_url: &str,
        token: BearerToken,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http, token)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        token: BearerToken,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Normalize to the service root with a trailing slash.
    ///
    /// Accepts `https://host`, `https://host/`, and `https://host/v1`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/');
        let path = path.strip_suffix("/v1").unwrap_or(path).to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared token slot. Replacing its value re-authenticates every
    /// request built afterwards.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `/v1/<segments…>/`. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("v1")
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        Ok(builder.header(AUTHORIZATION, self.token.header_value()?))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.authorized(self.http.get(url))?.send().await?;
        self.handle_response(resp).await
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Page<T>, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorized(self.http.get(url))?
            .query(params)
            .send()
            .await?;
        let links = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(PageLinks::parse)
            .unwrap_or_default();
        let items = self.handle_response(resp).await?;
        Ok(Page { items, links })
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.authorized(self.http.post(url))?.json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.authorized(self.http.post(url))?.send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PATCH {url}");

        let resp = self.authorized(self.http.patch(url))?.json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.authorized(self.http.delete(url))?.send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
                detail: err.detail,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
                detail: None,
            }
        }
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Follow `next` links from `first` until the server stops advertising
    /// one, collecting every item.
    pub async fn paginate_all<T, F, Fut>(&self, first: PageRequest, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(PageRequest) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut request = first;

        loop {
            let page = fetch(request).await?;
            let received = page.items.len();
            all.extend(page.items);

            match page.links.next {
                Some(next) if received > 0 && next.page > request.page => request = next.into(),
                _ => break,
            }
        }

        Ok(all)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Service ──────────────────────────────────────────────────────

    /// `GET /version`. Unauthenticated on the server side; the token is
    /// not sent.
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        let url = self.base_url.join("version")?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn list_devices(&self, page: PageRequest) -> Result<Page<Device>, Error> {
        self.get_page(self.endpoint(&["devices"])?, &page.to_params())
            .await
    }

    pub async fn get_device(&self, name: &str) -> Result<Device, Error> {
        self.get(self.endpoint(&["devices", name])?).await
    }

    pub async fn create_device(&self, body: &DeviceCreateOrUpdateRequest) -> Result<Device, Error> {
        self.post(self.endpoint(&["devices"])?, body).await
    }

    pub async fn update_device(
        &self,
        name: &str,
        body: &DeviceCreateOrUpdateRequest,
    ) -> Result<Device, Error> {
        self.patch(self.endpoint(&["devices", name])?, body).await
    }

    pub async fn delete_device(&self, name: &str) -> Result<(), Error> {
        self.delete(self.endpoint(&["devices", name])?).await
    }

    /// Bring the interface up (`wg-quick up`).
    pub async fn device_up(&self, name: &str) -> Result<InterfaceStatus, Error> {
        self.post_empty(self.endpoint(&["devices", name, "up"])?)
            .await
    }

    /// Bring the interface down (`wg-quick down`).
    pub async fn device_down(&self, name: &str) -> Result<InterfaceStatus, Error> {
        self.post_empty(self.endpoint(&["devices", name, "down"])?)
            .await
    }

    // ── Peers ────────────────────────────────────────────────────────

    pub async fn list_peers(&self, device: &str, query: &PeerQuery) -> Result<Page<Peer>, Error> {
        self.get_page(
            self.endpoint(&["devices", device, "peers"])?,
            &query.to_params(),
        )
        .await
    }

    /// Fetch one peer by its url-safe public key.
    pub async fn get_peer(&self, device: &str, url_safe_key: &str) -> Result<Peer, Error> {
        self.get(self.endpoint(&["devices", device, "peers", url_safe_key])?)
            .await
    }

    pub async fn create_peer(
        &self,
        device: &str,
        body: &PeerCreateOrUpdateRequest,
    ) -> Result<Peer, Error> {
        self.post(self.endpoint(&["devices", device, "peers"])?, body)
            .await
    }

    pub async fn update_peer(
        &self,
        device: &str,
        url_safe_key: &str,
        body: &PeerCreateOrUpdateRequest,
    ) -> Result<Peer, Error> {
        self.patch(
            self.endpoint(&["devices", device, "peers", url_safe_key])?,
            body,
        )
        .await
    }

    pub async fn delete_peer(&self, device: &str, url_safe_key: &str) -> Result<(), Error> {
        self.delete(self.endpoint(&["devices", device, "peers", url_safe_key])?)
            .await
    }
}

impl std::fmt::Debug for WgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgrestClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
