// Onboarding wizard sections with per-section autosave
//
// Three rounds of free-form answers, each tracked by its own scheduler so an edit in one round
// never resets another round's timer or status.

use super::{AutosaveConfig, AutosaveScheduler, AutosaveStatus, PersistFn};
use crate::api::client::ApiClient;
use crate::error::PortalError;
use crate::models::requests::OnboardingSaveRequest;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PATH_ONBOARDING_SAVE: &str = "onboarding/save";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Round1,
    Round2,
    Round3,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Round1, Section::Round2, Section::Round3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Round1 => "round1",
            Section::Round2 => "round2",
            Section::Round3 => "round3",
        }
    }

    fn index(&self) -> usize {
        match self {
            Section::Round1 => 0,
            Section::Round2 => 1,
            Section::Round3 => 2,
        }
    }
}

/// Initial shape for a section before the user touches it.
pub fn default_section_state() -> Value {
    json!({})
}

pub struct OnboardingWizard {
    values: [Value; 3],
    schedulers: [AutosaveScheduler<Value>; 3],
}

impl OnboardingWizard {
    /// Mount the wizard: every section starts from `initial` (or the default shape) and that
    /// value becomes its autosave baseline.
    pub fn mount(
        client: Arc<dyn ApiClient>,
        config: AutosaveConfig,
        initial: Option<[Value; 3]>,
    ) -> Self {
        let values = initial.unwrap_or_else(|| Section::ALL.map(|_| default_section_state()));
        let schedulers = Section::ALL.map(|section| {
            AutosaveScheduler::new(
                section.as_str(),
                section_persist(Arc::clone(&client), section),
                config,
            )
        });
        for section in Section::ALL {
            schedulers[section.index()].observe(values[section.index()].clone());
        }
        Self { values, schedulers }
    }

    pub fn value(&self, section: Section) -> &Value {
        &self.values[section.index()]
    }

    /// Replace a section's state and let its scheduler decide whether that is a change.
    pub fn update(&mut self, section: Section, value: Value) -> bool {
        self.values[section.index()] = value.clone();
        self.schedulers[section.index()].observe(value)
    }

    /// Set one top-level answer inside a section.
    pub fn set_answer(&mut self, section: Section, field: &str, answer: Value) -> bool {
        let mut next = self.values[section.index()].clone();
        if !next.is_object() {
            next = default_section_state();
        }
        if let Some(obj) = next.as_object_mut() {
            obj.insert(field.to_string(), answer);
        }
        self.update(section, next)
    }

    pub fn status(&self, section: Section) -> AutosaveStatus {
        self.schedulers[section.index()].status()
    }

    pub fn scheduler(&self, section: Section) -> &AutosaveScheduler<Value> {
        &self.schedulers[section.index()]
    }

    /// Unmount: cancel every pending save. Section state is kept, not deleted.
    pub fn dispose(&self) {
        for s in &self.schedulers {
            s.dispose();
        }
    }
}

fn section_persist(client: Arc<dyn ApiClient>, section: Section) -> PersistFn<Value> {
    Arc::new(move |data: Value| -> BoxFuture<'static, Result<(), PortalError>> {
        let client = Arc::clone(&client);
        async move {
            let body = serde_json::to_value(OnboardingSaveRequest {
                section: section.as_str().to_string(),
                data,
            })?;
            client.post(PATH_ONBOARDING_SAVE, &body).await.map(|_| ())
        }
        .boxed()
    })
}
