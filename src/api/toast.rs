// User notifications (fire-and-forget toasts)

use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastIcon {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub icon: ToastIcon,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            icon: ToastIcon::Success,
            title: title.into(),
            text: None,
        }
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            icon: ToastIcon::Error,
            title: title.into(),
            text: Some(text.into()),
        }
    }

    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            icon: ToastIcon::Info,
            title: title.into(),
            text: Some(text.into()),
        }
    }
}

pub type ToastEmitter = Arc<dyn Fn(Toast) + Send + Sync>;

/// Emitter that only logs; used by non-interactive modes.
pub fn log_toasts() -> ToastEmitter {
    Arc::new(|t: Toast| match t.icon {
        ToastIcon::Error => log::warn!(
            "[PHASE: ui] [STEP: toast] {}: {}",
            t.title,
            t.text.as_deref().unwrap_or("")
        ),
        _ => log::info!(
            "[PHASE: ui] [STEP: toast] {}: {}",
            t.title,
            t.text.as_deref().unwrap_or("")
        ),
    })
}
