// ── Modal visibility ──
//
// A single shared slot naming the modal currently on screen. Consumers
// read or subscribe; nothing else happens on open/close.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModalState {
    pub modal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Which modal (if any) is open. At most one at a time.
pub struct ModalStore {
    state: watch::Sender<ModalState>,
}

impl ModalStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ModalState::default());
        Self { state }
    }

    pub fn open_modal(&self, modal: impl Into<String>) {
        self.set(ModalState {
            modal: Some(modal.into()),
            payload: None,
        });
    }

    /// Open a modal carrying an opaque payload for its consumer.
    pub fn open_modal_with(&self, modal: impl Into<String>, payload: Value) {
        self.set(ModalState {
            modal: Some(modal.into()),
            payload: Some(payload),
        });
    }

    pub fn close_modal(&self) {
        self.set(ModalState::default());
    }

    pub fn current(&self) -> ModalState {
        self.state.borrow().clone()
    }

    /// Tag of the open modal.
    pub fn active(&self) -> Option<String> {
        self.state.borrow().modal.clone()
    }

    pub fn is_open(&self, modal: &str) -> bool {
        self.state.borrow().modal.as_deref() == Some(modal)
    }

    pub fn subscribe(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }

    // Repeating the current state does not wake subscribers.
    fn set(&self, next: ModalState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}
