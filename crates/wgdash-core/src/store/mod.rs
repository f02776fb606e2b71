// ── Application state stores ──
//
// Explicit state structs built once by the dashboard and passed by
// reference. Each publishes changes through `watch` channels.

pub(crate) mod collection;
pub mod devices;
pub mod modal;

pub use collection::Keyed;
pub use devices::DeviceStore;
pub use modal::{ModalState, ModalStore};
