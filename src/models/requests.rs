// API request models
// Bodies the portal core sends to the marketplace backend.

use crate::contract::fields::Role;
use crate::contract::path_tree::PathTree;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// =========================
// Contract editor
// =========================

/// Influencer-side "confirm contract" body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfluencerConfirmRequest {
    pub contract_id: String,
    pub purple: PathTree,
    #[serde(rename = "type")]
    pub confirm_type: u8,
}

pub const INFLUENCER_CONFIRM_TYPE: u8 = 1;

/// Brand-side "resend contract with updates" body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandResendRequest {
    pub contract_id: String,
    pub brand_id: String,
    pub yellow_updates: PathTree,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesUpdateRequest {
    pub contract_id: String,
    /// Keyed by role name (`influencer` / `brand`).
    pub notes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub contract_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// =========================
// Onboarding wizard
// =========================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSaveRequest {
    pub section: String,
    pub data: Value,
}
