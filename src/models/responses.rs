// API response models

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =========================
// Generic wrapper (matches the backend's { success, data, message } envelope)
// =========================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Whichever of `message` / `error` the server filled in.
    pub fn failure_text(&self) -> Option<&str> {
        let filled = |m: &&str| !m.trim().is_empty();
        self.message
            .as_deref()
            .filter(filled)
            .or_else(|| self.error.as_deref().filter(filled))
    }
}

/// Extract the best failure text from an arbitrary error body.
pub fn failure_text_from_body(body: &str) -> Option<String> {
    let parsed: ApiResponse<Value> = serde_json::from_str(body).ok()?;
    parsed.failure_text().map(|s| s.to_string())
}

// =========================
// Contract editor
// =========================

/// Contract preview: both role trees as the backend stores them, plus any saved notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPreviewResponse {
    #[serde(default)]
    pub contract_id: String,
    #[serde(default)]
    pub purple: Value,
    #[serde(default)]
    pub yellow: Value,
    #[serde(default)]
    pub additional_notes: Option<ContractNotesDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractNotesDto {
    pub influencer: Option<String>,
    pub brand: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_text_prefers_message_over_error() {
        let body = r#"{"success":false,"message":"Contract is locked","error":"E_LOCKED"}"#;
        assert_eq!(
            failure_text_from_body(body).as_deref(),
            Some("Contract is locked")
        );
    }

    #[test]
    fn failure_text_uses_error_when_message_blank() {
        let body = r#"{"message":"  ","error":"brandId mismatch"}"#;
        assert_eq!(
            failure_text_from_body(body).as_deref(),
            Some("brandId mismatch")
        );
    }

    #[test]
    fn failure_text_none_for_non_json() {
        assert!(failure_text_from_body("<html>502 Bad Gateway</html>").is_none());
    }

    #[test]
    fn preview_tolerates_missing_sections() {
        let parsed: ContractPreviewResponse =
            serde_json::from_str(r#"{"contractId":"C1","purple":{"fee":"100"}}"#).unwrap();
        assert_eq!(parsed.contract_id, "C1");
        assert!(parsed.yellow.is_null());
        assert!(parsed.additional_notes.is_none());
    }
}
