// Input validation utilities

use crate::error::PortalError;
use regex::Regex;

/// Validate a contract id before it is interpolated into a URL path or a file name.
///
/// Only letters, digits, `_` and `-` are accepted.
pub fn validate_contract_id(contract_id: &str) -> Result<&str, PortalError> {
    let s = contract_id.trim();
    if s.is_empty() {
        return Err(PortalError::precondition("Contract id is required."));
    }
    if s.len() > 64 {
        return Err(PortalError::precondition(
            "Contract id cannot exceed 64 characters.",
        ));
    }

    let id_re = Regex::new(r"^[A-Za-z0-9_-]+$").map_err(|e| {
        PortalError::precondition(format!(
            "Internal error: failed to compile contract id regex: {}",
            e
        ))
    })?;
    if !id_re.is_match(s) {
        return Err(PortalError::precondition(format!(
            "Contract id contains invalid characters: '{}'",
            s
        )));
    }

    Ok(s)
}

/// Brand-side saves need the signed-in brand's id.
pub fn require_brand_id(brand_id: Option<&str>) -> Result<&str, PortalError> {
    match brand_id.map(str::trim).filter(|b| !b.is_empty()) {
        Some(b) => Ok(b),
        None => Err(PortalError::precondition(
            "Brand id is missing. Please sign in again.",
        )),
    }
}

/// Trim and drop empty values (absent is sent instead of "").
pub fn non_empty_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_id_accepts_simple_ids() {
        assert_eq!(validate_contract_id(" 65f1c0ab-22_x ").unwrap(), "65f1c0ab-22_x");
    }

    #[test]
    fn contract_id_rejects_path_traversal() {
        let err = validate_contract_id("../../etc/passwd").unwrap_err();
        assert!(err.is_precondition());
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn contract_id_rejects_empty_and_long() {
        assert!(validate_contract_id("   ").is_err());
        assert!(validate_contract_id(&"a".repeat(65)).is_err());
    }

    #[test]
    fn brand_id_required() {
        assert!(require_brand_id(None).is_err());
        assert!(require_brand_id(Some("  ")).is_err());
        assert_eq!(require_brand_id(Some(" B1")).unwrap(), "B1");
    }

    #[test]
    fn non_empty_trimmed_drops_blank() {
        assert_eq!(non_empty_trimmed(Some("  ")), None);
        assert_eq!(non_empty_trimmed(None), None);
        assert_eq!(non_empty_trimmed(Some(" a@b.co ")).as_deref(), Some("a@b.co"));
    }
}
