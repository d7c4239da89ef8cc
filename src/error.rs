// Error taxonomy for portal operations (save / sign / export / autosave)
//
// Every failure is caught at the operation boundary and turned into a toast; nothing here is
// escalated past the component performing the action.

use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum PortalError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-success status (validation or business rule).
    #[error("request rejected (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// A local precondition failed before any network call was issued.
    #[error("{0}")]
    Precondition(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PortalError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Best-effort user-facing text: the server/precondition message when one exists,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        let msg = match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Precondition(m) => Some(m.clone()),
            Self::Transport(_) | Self::Serialization(_) => None,
        };
        msg.filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Rejected {
                status: status.as_u16(),
                message: None,
            },
            None => Self::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_prefers_server_message() {
        let e = PortalError::Rejected {
            status: 422,
            message: Some("Contract already signed".to_string()),
        };
        assert_eq!(
            e.user_message(GENERIC_FAILURE_MESSAGE),
            "Contract already signed"
        );
    }

    #[test]
    fn rejected_without_message_falls_back() {
        let e = PortalError::Rejected {
            status: 500,
            message: Some("   ".to_string()),
        };
        assert_eq!(e.user_message("Update failed"), "Update failed");
    }

    #[test]
    fn transport_never_leaks_internal_text() {
        let e = PortalError::Transport("tcp connect error: 10.0.0.4:443".to_string());
        assert_eq!(e.user_message("Update failed"), "Update failed");
    }

    #[test]
    fn precondition_message_is_shown_verbatim() {
        let e = PortalError::precondition("Brand id is missing. Please sign in again.");
        assert!(e.is_precondition());
        assert_eq!(
            e.user_message("Update failed"),
            "Brand id is missing. Please sign in again."
        );
    }
}
