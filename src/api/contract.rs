// Contract editor overlay: load, save, sign and PDF export
//
// Every operation catches its own failure and reports it through the toast emitter; nothing
// escapes past the overlay. A failed save leaves the edited fields as they are (no rollback,
// no refetch) so the user can retry.

use super::client::ApiClient;
use super::toast::{Toast, ToastEmitter};
use crate::contract::fields::{collect_fields, FieldRegistry, Role, SignField};
use crate::contract::path_tree::PathTree;
use crate::contract::payload::{
    build_payload, build_sign_request, pdf_file_name, pdf_path, preview_path,
};
use crate::error::{PortalError, GENERIC_FAILURE_MESSAGE};
use crate::models::responses::ContractPreviewResponse;
use crate::models::state::Session;
use crate::utils::logging::mask_field_value;
use crate::utils::validation::validate_contract_id;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub type AfterSaveHook = Arc<dyn Fn() + Send + Sync>;

/// Outcome of one save. `notes` is `None` when no notes field was present.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub correlation_id: String,
    pub notes: Option<Result<(), PortalError>>,
    pub main: Result<(), PortalError>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.main.is_ok()
    }
}

pub struct ContractEditor {
    client: Arc<dyn ApiClient>,
    contract_id: String,
    session: Session,
    fields: FieldRegistry,
    open: bool,
    emit_toast: ToastEmitter,
    after_save: Option<AfterSaveHook>,
}

impl ContractEditor {
    pub fn new(
        client: Arc<dyn ApiClient>,
        contract_id: impl Into<String>,
        session: Session,
        emit_toast: ToastEmitter,
    ) -> Self {
        Self {
            client,
            contract_id: contract_id.into(),
            session,
            fields: FieldRegistry::new(),
            open: true,
            emit_toast,
            after_save: None,
        }
    }

    pub fn with_after_save(mut self, hook: AfterSaveHook) -> Self {
        self.after_save = Some(hook);
        self
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldRegistry {
        &mut self.fields
    }

    /// Fetch the contract preview and seed the editable fields from it.
    pub async fn load(&mut self) -> Result<(), PortalError> {
        let contract_id = validate_contract_id(&self.contract_id)?.to_string();
        info!(
            "[PHASE: contract] [STEP: load] Loading contract preview (contract_id={}, role={})",
            contract_id, self.session.role
        );

        let result = async {
            let raw = self.client.get_json(&preview_path(&contract_id)).await?;
            let preview: ContractPreviewResponse = serde_json::from_value(raw)?;
            Ok::<_, PortalError>(preview)
        }
        .await;

        match result {
            Ok(preview) => {
                self.seed_from_preview(&preview);
                info!(
                    "[PHASE: contract] [STEP: load] Seeded {} editable fields",
                    self.fields.len()
                );
                Ok(())
            }
            Err(e) => {
                warn!("[PHASE: contract] [STEP: load] Preview failed: {}", e);
                (self.emit_toast)(Toast::error(
                    "Could not load contract",
                    e.user_message(GENERIC_FAILURE_MESSAGE),
                ));
                Err(e)
            }
        }
    }

    /// Register one field per leaf of the active role's tree, then the sign and notes fields.
    pub fn seed_from_preview(&mut self, preview: &ContractPreviewResponse) {
        let role = self.session.role;
        let section = match role {
            Role::Influencer => &preview.purple,
            Role::Brand => &preview.yellow,
        };

        if section.is_object() {
            for (path, value) in PathTree::from_json(section).flatten() {
                let key = format!("{}.{}", role.namespace(), path);
                self.fields.register(key, path, value);
            }
        }

        self.fields
            .register(role.sign_key(SignField::Name), "Signer name", "");
        self.fields
            .register(role.sign_key(SignField::Email), "Signer email", "");

        let existing_note = preview
            .additional_notes
            .as_ref()
            .and_then(|n| match role {
                Role::Influencer => n.influencer.clone(),
                Role::Brand => n.brand.clone(),
            })
            .unwrap_or_default();
        self.fields
            .register(role.notes_key(), "Additional notes", existing_note);
    }

    /// Persist the edited fields: notes side-channel first (if present), then the role's main
    /// call. A notes failure is reported on its own and never blocks the main call.
    pub async fn save(&mut self) -> SaveReport {
        let started = Instant::now();
        let correlation_id = Uuid::new_v4().simple().to_string();
        let snapshot = collect_fields(&self.fields);

        info!(
            "[PHASE: contract] [STEP: save] save entered (correlation_id={}, role={}, fields={})",
            correlation_id,
            self.session.role,
            snapshot.len()
        );
        for (key, value) in snapshot.iter() {
            debug!(
                "[PHASE: contract] [STEP: save] field {}={}",
                key,
                mask_field_value(key, value)
            );
        }

        let plan = match build_payload(&snapshot, &self.contract_id, &self.session) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(
                    "[PHASE: contract] [STEP: save] precondition failed (correlation_id={}): {}",
                    correlation_id, e
                );
                (self.emit_toast)(Toast::error(
                    "Update failed",
                    e.user_message(GENERIC_FAILURE_MESSAGE),
                ));
                return SaveReport {
                    correlation_id,
                    notes: None,
                    main: Err(e),
                };
            }
        };

        let notes = match &plan.notes_call {
            Some(call) => {
                let result = self.client.post(&call.path, &call.body).await.map(|_| ());
                if let Err(e) = &result {
                    warn!(
                        "[PHASE: contract] [STEP: save_notes] notes update failed (correlation_id={}): {}",
                        correlation_id, e
                    );
                    (self.emit_toast)(Toast::error(
                        "Notes were not saved",
                        e.user_message(GENERIC_FAILURE_MESSAGE),
                    ));
                }
                Some(result)
            }
            None => None,
        };

        let main = self
            .client
            .post(&plan.main_call.path, &plan.main_call.body)
            .await
            .map(|_| ());

        match &main {
            Ok(()) => {
                info!(
                    "[PHASE: contract] [STEP: save] exit ok (correlation_id={}, duration_ms={})",
                    correlation_id,
                    started.elapsed().as_millis()
                );
                (self.emit_toast)(Toast::success("Contract updated"));
                self.open = false;
                if let Some(hook) = &self.after_save {
                    hook();
                }
            }
            Err(e) => {
                warn!(
                    "[PHASE: contract] [STEP: save] main update failed (correlation_id={}, duration_ms={}): {}",
                    correlation_id,
                    started.elapsed().as_millis(),
                    e
                );
                (self.emit_toast)(Toast::error(
                    "Update failed",
                    e.user_message(GENERIC_FAILURE_MESSAGE),
                ));
            }
        }

        SaveReport {
            correlation_id,
            notes,
            main,
        }
    }

    /// Sign with the trimmed identity fields. Success closes the overlay and runs the
    /// after-save hook; failure keeps it open.
    pub async fn sign(&mut self) -> Result<(), PortalError> {
        let correlation_id = Uuid::new_v4().simple().to_string();
        let snapshot = collect_fields(&self.fields);
        info!(
            "[PHASE: contract] [STEP: sign] sign entered (correlation_id={}, role={})",
            correlation_id, self.session.role
        );

        let result = async {
            let call = build_sign_request(&snapshot, &self.contract_id, self.session.role)?;
            self.client.post(&call.path, &call.body).await?;
            Ok::<_, PortalError>(())
        }
        .await;

        match &result {
            Ok(()) => {
                info!(
                    "[PHASE: contract] [STEP: sign] exit ok (correlation_id={})",
                    correlation_id
                );
                (self.emit_toast)(Toast::success("Contract signed"));
                self.open = false;
                if let Some(hook) = &self.after_save {
                    hook();
                }
            }
            Err(e) => {
                warn!(
                    "[PHASE: contract] [STEP: sign] failed (correlation_id={}): {}",
                    correlation_id, e
                );
                (self.emit_toast)(Toast::error(
                    "Signing failed",
                    e.user_message(GENERIC_FAILURE_MESSAGE),
                ));
            }
        }
        result
    }

    /// Download the contract PDF into `dir` as `Contract-<id>.pdf`.
    pub async fn export_pdf(&self, dir: &Path) -> Result<PathBuf, PortalError> {
        let result = async {
            let contract_id = validate_contract_id(&self.contract_id)?;
            let target = dir.join(pdf_file_name(contract_id));
            let bytes = self.client.get_bytes(&pdf_path(contract_id)).await?;
            write_document(&target, &bytes).await?;
            Ok::<_, PortalError>(target)
        }
        .await;

        match &result {
            Ok(path) => {
                info!("[PHASE: contract] [STEP: export_pdf] wrote {:?}", path);
                (self.emit_toast)(Toast::info("PDF downloaded", path.display().to_string()));
            }
            Err(e) => {
                warn!("[PHASE: contract] [STEP: export_pdf] failed: {}", e);
                (self.emit_toast)(Toast::error(
                    "Download failed",
                    e.user_message(GENERIC_FAILURE_MESSAGE),
                ));
            }
        }
        result
    }
}

async fn write_document(target: &Path, bytes: &[u8]) -> Result<(), PortalError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            PortalError::precondition(format!("Export folder is not writable: {}", e))
        })?;
    }
    tokio::fs::write(target, bytes)
        .await
        .map_err(|e| PortalError::precondition(format!("Failed to write {:?}: {}", target, e)))
}
