// wgdash-core: Session, token recovery, stores and routing for wgdash
//
// Sits between the wgrest HTTP client and any front end. The `Session`
// owns the client and intercepts authentication failures; the stores are
// plain structs with `watch`-based change notification; the router is a
// static table.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod recovery;
pub mod router;
pub mod session;
pub mod store;
pub mod token;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{SessionConfig, TlsVerification};
pub use dashboard::{Dashboard, Screen, ViewData};
pub use error::CoreError;
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use recovery::{ACCESS_TOKEN_MODAL, CredentialEvent, PromptError, TokenPrompt};
pub use router::{Navigation, Navigator, NOT_FOUND_PATH, Resolved, Router, View};
pub use session::{Session, SessionHooks};
pub use store::{DeviceStore, Keyed, ModalState, ModalStore};
pub use token::{MemoryTokenStore, TokenStore};

// Domain records come straight from the API crate.
pub use wgdash_api::{
    Device, DeviceCreateOrUpdateRequest, InterfaceStatus, Page, PageLinks, PageRequest, Peer,
    PeerCreateOrUpdateRequest, PeerQuery, PeerSort, PeerSortField, VersionInfo,
};
