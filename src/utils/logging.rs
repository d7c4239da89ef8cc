// Logging utilities
// Structured logging with JSON and human-readable formats

use log::Level;
use serde_json::json;
use std::collections::HashMap;

/// Mask a secret (tokens, ids) for logs: first/last 4 chars, or `***` when short.
pub fn mask_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let visible = 4;
    let start: String = chars[..visible].iter().collect();
    let end: String = chars[chars.len() - visible..].iter().collect();

    format!("{}...{}", start, end)
}

/// `ada.lovelace@example.com` -> `a***@example.com`
pub fn mask_email(email: &str) -> String {
    let s = email.trim();
    match s.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Keep only the last two digits of a phone number.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 2 {
        return "***".to_string();
    }
    let tail: String = digits[digits.len() - 2..].iter().collect();
    format!("***{}", tail)
}

/// Mask a contract-editor field value for logging, based on what its key says it holds.
pub fn mask_field_value(key: &str, value: &str) -> String {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with("phone") {
        mask_phone(value)
    } else if lower.ends_with("email") {
        mask_email(value)
    } else if lower.ends_with("name") || lower.contains("address") || lower.contains("notes") {
        format!("<{} chars>", value.chars().count())
    } else {
        value.to_string()
    }
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let mut phase = None;
    let mut step = None;
    let mut cleaned_message = message.to_string();

    if let Some((value, rest)) = take_tag(&cleaned_message, "[PHASE:") {
        phase = Some(value);
        cleaned_message = rest;
    }

    if let Some((value, rest)) = take_tag(&cleaned_message, "[STEP:") {
        step = Some(value);
        cleaned_message = rest;
    }

    (phase, step, cleaned_message)
}

fn take_tag(message: &str, tag: &str) -> Option<(String, String)> {
    let start = message.find(tag)?;
    let end = message[start..].find(']')?;
    let value = message[start + tag.len()..start + end].trim().to_string();
    let rest = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    Some((value, rest))
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
    details: Option<&HashMap<String, serde_json::Value>>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    if let Some(details) = details {
        log_entry["details"] = json!(details);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // PII masking
    // -------------------------------------------------------------------------

    #[test]
    fn mask_sensitive_short_values_fully_masked() {
        assert_eq!(mask_sensitive("abc"), "***");
        assert_eq!(mask_sensitive("12345678"), "***");
    }

    #[test]
    fn mask_sensitive_long_values_partially_masked() {
        let masked = mask_sensitive("abcdefghijklmnop");
        assert_eq!(masked, "abcd...mnop");
    }

    #[test]
    fn mask_sensitive_handles_multibyte() {
        let masked = mask_sensitive("ééééééééééé");
        assert_eq!(masked, "éééé...éééé");
    }

    #[test]
    fn mask_email_keeps_domain_only() {
        assert_eq!(mask_email("ada.lovelace@example.com"), "a***@example.com");
        assert_eq!(mask_email("@example.com"), "***");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn mask_phone_keeps_last_two_digits() {
        assert_eq!(mask_phone("+1 (555) 222-3333"), "***33");
        assert_eq!(mask_phone("7"), "***");
    }

    #[test]
    fn mask_field_value_by_key() {
        assert_eq!(mask_field_value("purple.profile.phone", "+15552223333"), "***33");
        assert_eq!(
            mask_field_value("sign.brand.email", "grace@navy.mil"),
            "g***@navy.mil"
        );
        assert_eq!(mask_field_value("sign.brand.name", "Grace"), "<5 chars>");
        assert_eq!(mask_field_value("yellow.goLive.start", "2025-01-01"), "2025-01-01");
    }

    // -------------------------------------------------------------------------
    // Metadata extraction + formatting
    // -------------------------------------------------------------------------

    #[test]
    fn parse_log_metadata_extracts_phase_and_step() {
        let (phase, step, msg) =
            parse_log_metadata("[PHASE: contract] [STEP: save] save entered (fields=3)");
        assert_eq!(phase.as_deref(), Some("contract"));
        assert_eq!(step.as_deref(), Some("save"));
        assert_eq!(msg, "save entered (fields=3)");
    }

    #[test]
    fn parse_log_metadata_without_tags_is_untouched() {
        let (phase, step, msg) = parse_log_metadata("plain message");
        assert!(phase.is_none());
        assert!(step.is_none());
        assert_eq!(msg, "plain message");
    }

    #[test]
    fn json_log_includes_optional_fields() {
        let line = format_json_log(
            "2025-01-01T00:00:00Z",
            Level::Info,
            "collab_portal",
            "saved",
            Some("autosave"),
            None,
            None,
        );
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["phase"], "autosave");
        assert_eq!(v["level"], "INFO");
        assert!(v.get("step").is_none());
    }

    #[test]
    fn human_readable_log_layout() {
        let line = format_human_readable_log(
            "2025-01-01 00:00:00.000",
            Level::Warn,
            "collab_portal::api",
            "failed",
            Some("contract"),
            Some("sign"),
        );
        assert_eq!(
            line,
            "[2025-01-01 00:00:00.000] [WARN] [PHASE: contract] [STEP: sign] [collab_portal::api] failed"
        );
    }
}
