//! User-facing notifications ("toasts").
//!
//! The session reports recovery outcomes and, optionally, every failed
//! request through a [`Notifier`]. Front ends decide how to show them.

use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notices. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Routes notices into the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => error!(notice = %notice.message),
            NoticeLevel::Success | NoticeLevel::Info => {
                info!(level = %notice.level, notice = %notice.message);
            }
        }
    }
}
