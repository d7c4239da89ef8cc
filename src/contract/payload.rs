// Save / sign payload builders for the contract editor
//
// Pure functions: a field snapshot plus the session context in, the exact calls to issue out.
// Preconditions (contract id shape, brand id for the brand role) are checked here so a bad
// save fails before anything touches the network.

use crate::contract::fields::{coerce_value, route_key, FieldRoute, FieldSnapshot, Role, SignField};
use crate::contract::path_tree::PathTree;
use crate::error::PortalError;
use crate::models::requests::{
    BrandResendRequest, InfluencerConfirmRequest, NotesUpdateRequest, SignRequest,
    INFLUENCER_CONFIRM_TYPE,
};
use crate::models::state::Session;
use crate::utils::validation::{non_empty_trimmed, require_brand_id, validate_contract_id};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const PATH_INFLUENCER_CONFIRM: &str = "contract/influencer/confirm";
pub const PATH_BRAND_RESEND: &str = "contract/brand/resend";
pub const PATH_NOTES_UPDATE: &str = "contract/notes";
pub const PATH_SIGN: &str = "contract/sign";

pub fn preview_path(contract_id: &str) -> String {
    format!("contract/preview/{}", contract_id)
}

pub fn pdf_path(contract_id: &str) -> String {
    format!("contract/pdf/{}", contract_id)
}

pub fn pdf_file_name(contract_id: &str) -> String {
    format!("Contract-{}.pdf", contract_id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiCall {
    pub path: String,
    pub body: Value,
}

impl ApiCall {
    fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, PortalError> {
        Ok(Self {
            path: path.into(),
            body: serde_json::to_value(body)?,
        })
    }
}

/// Calls for one save: the notes side-channel (if any) goes first, then the main call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavePlan {
    pub main_call: ApiCall,
    pub notes_call: Option<ApiCall>,
}

/// Merge the active role's namespace into a tree, stripping the namespace and coercing
/// phone-like values on the way in.
pub fn build_tree(snapshot: &FieldSnapshot, role: Role) -> PathTree {
    let mut tree = PathTree::empty();
    for (key, value) in snapshot.iter() {
        if let FieldRoute::Tree(path) = route_key(key, role) {
            tree.set_path(path, coerce_value(key, value));
        }
    }
    tree
}

pub fn build_payload(
    snapshot: &FieldSnapshot,
    contract_id: &str,
    session: &Session,
) -> Result<SavePlan, PortalError> {
    let contract_id = validate_contract_id(contract_id)?.to_string();
    let role = session.role;

    let main_call = match role {
        Role::Influencer => ApiCall::post(
            PATH_INFLUENCER_CONFIRM,
            &InfluencerConfirmRequest {
                contract_id: contract_id.clone(),
                purple: build_tree(snapshot, role),
                confirm_type: INFLUENCER_CONFIRM_TYPE,
            },
        )?,
        Role::Brand => {
            let brand_id = require_brand_id(session.brand_id.as_deref())?.to_string();
            ApiCall::post(
                PATH_BRAND_RESEND,
                &BrandResendRequest {
                    contract_id: contract_id.clone(),
                    brand_id,
                    yellow_updates: build_tree(snapshot, role),
                },
            )?
        }
    };

    // Presence of the key triggers the call, even for an empty note.
    let notes_call = match snapshot.get(&role.notes_key()) {
        Some(note) => {
            let mut notes = BTreeMap::new();
            notes.insert(role.as_str().to_string(), note.to_string());
            Some(ApiCall::post(
                PATH_NOTES_UPDATE,
                &NotesUpdateRequest {
                    contract_id: contract_id.clone(),
                    notes,
                },
            )?)
        }
        None => None,
    };

    Ok(SavePlan {
        main_call,
        notes_call,
    })
}

pub fn build_sign_request(
    snapshot: &FieldSnapshot,
    contract_id: &str,
    role: Role,
) -> Result<ApiCall, PortalError> {
    let contract_id = validate_contract_id(contract_id)?.to_string();
    ApiCall::post(
        PATH_SIGN,
        &SignRequest {
            contract_id,
            role,
            name: non_empty_trimmed(snapshot.get(&role.sign_key(SignField::Name))),
            email: non_empty_trimmed(snapshot.get(&role.sign_key(SignField::Email))),
        },
    )
}
