//! Request and response types for the wgrest REST API (`/v1/`).
//!
//! Field names are snake_case on the wire, matching Rust field names, so
//! no renaming is needed. Response types default every field the server
//! may omit; request types skip unset fields so PATCH bodies stay partial.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── Devices ──────────────────────────────────────────────────────────

/// A WireGuard interface, as returned by `GET /v1/devices/` and `GET /v1/devices/{name}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub listen_port: u16,
    #[serde(default)]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default)]
    pub firewall_mark: u32,
    /// Interface addresses. Older servers call this field `networks`.
    #[serde(default, alias = "networks", deserialize_with = "null_as_empty")]
    pub addresses: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub pre_up: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub post_up: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub pre_down: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub post_down: Vec<String>,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub peers_count: u32,
    #[serde(default)]
    pub total_receive_bytes: u64,
    #[serde(default)]
    pub total_transmit_bytes: u64,
}

/// Body for `POST /v1/devices/` and `PATCH /v1/devices/{name}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCreateOrUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firewall_mark: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_up: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_up: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_down: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_down: Option<Vec<String>>,
}

/// Response of `POST /v1/devices/{name}/up/` and `.../down/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub status: String,
    pub interface: String,
}

// ── Peers ────────────────────────────────────────────────────────────

/// A peer of a device, as returned by `GET /v1/devices/{name}/peers/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub public_key: String,
    /// Base64url form of the public key, used in peer URLs.
    #[serde(default)]
    pub url_safe_public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preshared_key: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub allowed_ips: Vec<String>,
    #[serde(default)]
    pub last_handshake_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_keepalive_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub receive_bytes: u64,
    #[serde(default)]
    pub transmit_bytes: u64,
}

impl Peer {
    /// The last handshake, or `None` if the peer never completed one.
    ///
    /// The server reports "never" as the zero time (`0001-01-01T00:00:00Z`).
    pub fn last_handshake(&self) -> Option<DateTime<Utc>> {
        self.last_handshake_time.filter(|t| t.year() > 1)
    }

    /// The key to address this peer in URLs.
    ///
    /// Falls back to converting the standard base64 key when the server
    /// did not send the url-safe form.
    pub fn url_key(&self) -> String {
        if self.url_safe_public_key.is_empty() {
            url_safe_key(&self.public_key)
        } else {
            self.url_safe_public_key.clone()
        }
    }
}

/// wgrest encodes an unset slice as `null`; read it as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Convert a standard base64 WireGuard key into its base64url form.
pub fn url_safe_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Body for `POST /v1/devices/{name}/peers/` and the peer PATCH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerCreateOrUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preshared_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_ips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_keepalive_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

// ── Peer listing options ─────────────────────────────────────────────

/// Fields the server can sort peer listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum PeerSortField {
    PubKey,
    ReceiveBytes,
    TransmitBytes,
    TotalBytes,
    LastHandshakeTime,
}

/// Sort order for peer listings, written as `field` or `-field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerSort {
    pub field: PeerSortField,
    pub descending: bool,
}

impl fmt::Display for PeerSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

impl FromStr for PeerSort {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (descending, field) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        Ok(Self {
            field: field.parse()?,
            descending,
        })
    }
}

/// Query options for `GET /v1/devices/{name}/peers/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerQuery {
    pub page: crate::pagination::PageRequest,
    /// Search by allowed IPs.
    pub q: Option<String>,
    pub sort: Option<PeerSort>,
}

impl PeerQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.page.to_params();
        if let Some(ref q) = self.q {
            params.push(("q", q.clone()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.to_string()));
        }
        params
    }
}

// ── Service ──────────────────────────────────────────────────────────

/// Response of `GET /version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub wgrest: String,
    #[serde(default)]
    pub wireguard: String,
}

/// Error body returned by the API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_decodes_minimal_and_legacy_shapes() {
        let device: Device = serde_json::from_value(json!({
            "name": "wg0",
            "listen_port": 51820,
            "public_key": "pub",
            "networks": ["10.0.0.1/24"],
            "peers_count": 2,
            "total_receive_bytes": 1024,
            "total_transmit_bytes": 2048,
            "unknown_field": true
        }))
        .unwrap();

        assert_eq!(device.name, "wg0");
        assert_eq!(device.listen_port, 51820);
        assert_eq!(device.addresses, vec!["10.0.0.1/24".to_string()]);
        assert_eq!(device.peers_count, 2);
        assert!(!device.running);
        assert!(device.private_key.is_none());
    }

    #[test]
    fn update_request_serializes_only_set_fields() {
        let req = DeviceCreateOrUpdateRequest {
            listen_port: Some(51821),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "listen_port": 51821 })
        );
    }

    #[test]
    fn zero_handshake_time_means_never() {
        let peer: Peer = serde_json::from_value(json!({
            "public_key": "abc+/=",
            "last_handshake_time": "0001-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(peer.last_handshake_time.is_some());
        assert!(peer.last_handshake().is_none());
        assert_eq!(peer.url_key(), "abc-_=");
    }

    #[test]
    fn null_slices_decode_as_empty() {
        let peer: Peer = serde_json::from_value(json!({
            "public_key": "abc=",
            "allowed_ips": null
        }))
        .unwrap();
        assert!(peer.allowed_ips.is_empty());

        let device: Device = serde_json::from_value(json!({
            "name": "wg0",
            "networks": null,
            "dns": null,
            "pre_up": null,
            "post_down": null
        }))
        .unwrap();
        assert!(device.addresses.is_empty());
        assert!(device.dns.is_empty());
        assert!(device.pre_up.is_empty());
        assert!(device.post_down.is_empty());
    }

    #[test]
    fn peer_sort_round_trips_through_strings() {
        let sort: PeerSort = "-receive_bytes".parse().unwrap();
        assert!(sort.descending);
        assert_eq!(sort.field, PeerSortField::ReceiveBytes);
        assert_eq!(sort.to_string(), "-receive_bytes");
        assert_eq!("pub_key".parse::<PeerSort>().unwrap().to_string(), "pub_key");
        assert!("bogus".parse::<PeerSort>().is_err());
    }

    #[test]
    fn peer_query_params_include_optional_filters() {
        let query = PeerQuery {
            q: Some("10.0.0.2".into()),
            sort: Some(PeerSort {
                field: PeerSortField::TotalBytes,
                descending: true,
            }),
            ..Default::default()
        };
        let params = query.to_params();
        assert!(params.contains(&("q", "10.0.0.2".to_string())));
        assert!(params.contains(&("sort", "-total_bytes".to_string())));
        assert!(params.contains(&("page", "0".to_string())));
    }
}
