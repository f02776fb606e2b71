// wgdash-api: Async Rust client for the wgrest WireGuard management API

pub mod auth;
pub mod client;
pub mod error;
pub mod pagination;
pub mod transport;
pub mod types;

pub use auth::BearerToken;
pub use client::WgrestClient;
pub use error::Error;
pub use pagination::{Page, PageLinks, PageRef, PageRequest};
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    Device, DeviceCreateOrUpdateRequest, InterfaceStatus, Peer, PeerCreateOrUpdateRequest,
    PeerQuery, PeerSort, PeerSortField, VersionInfo,
};
