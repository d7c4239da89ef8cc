// Debounced autosave for a value that changes over time
//
// - The first observed value is the baseline and is never persisted.
// - Each structural change marks the status `Saving` and re-arms the debounce timer.
// - When the timer settles, persist runs once with the latest value.
// - Persists for one scheduler run one at a time, in fire order; a result that was overtaken
//   by a newer change does not touch the status (the newer change owns it).
// - Dispose (or drop) cancels pending timers; nothing persists afterwards.
//
// Timers run on the tokio runtime; `observe` must be called from within one.

pub mod onboarding;

use crate::error::PortalError;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEBOUNCE_MS: u64 = 600;
pub const DEFAULT_SAVED_RESET_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutosaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

impl AutosaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AutosaveStatus::Idle => "",
            AutosaveStatus::Saving => "Saving...",
            AutosaveStatus::Saved => "Saved",
            AutosaveStatus::Error => "Save failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    pub debounce: Duration,
    /// How long `Saved` is shown before falling back to `Idle`.
    pub saved_reset: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            saved_reset: Duration::from_millis(DEFAULT_SAVED_RESET_MS),
        }
    }
}

pub type PersistFn<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), PortalError>> + Send + Sync>;

pub struct AutosaveScheduler<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    name: String,
    config: AutosaveConfig,
    persist: PersistFn<T>,
    tracked: Mutex<Tracked<T>>,
    status: watch::Sender<AutosaveStatus>,
    persist_lock: tokio::sync::Mutex<()>,
    cancel: CancellationToken,
}

struct Tracked<T> {
    last: Option<T>,
    /// Bumped on every change; timers and persist results carry the version they were armed
    /// for.
    version: u64,
    timer: Option<JoinHandle<()>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T> AutosaveScheduler<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    pub fn new(name: impl Into<String>, persist: PersistFn<T>, config: AutosaveConfig) -> Self {
        let (status, _) = watch::channel(AutosaveStatus::Idle);
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                config,
                persist,
                tracked: Mutex::new(Tracked {
                    last: None,
                    version: 0,
                    timer: None,
                }),
                status,
                persist_lock: tokio::sync::Mutex::new(()),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn status(&self) -> AutosaveStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.shared.status.subscribe()
    }

    /// Feed the current value. Returns true when it counted as a change and a save was armed.
    pub fn observe(&self, value: T) -> bool {
        if self.shared.cancel.is_cancelled() {
            return false;
        }

        let mut tracked = lock(&self.shared.tracked);
        if tracked.last.is_none() {
            tracked.last = Some(value);
            debug!(
                "[PHASE: autosave] [STEP: baseline] {} baseline captured",
                self.shared.name
            );
            return false;
        }
        if tracked.last.as_ref() == Some(&value) {
            return false;
        }

        tracked.last = Some(value);
        tracked.version += 1;
        let version = tracked.version;
        if let Some(pending) = tracked.timer.take() {
            pending.abort();
        }
        self.shared.status.send_replace(AutosaveStatus::Saving);

        let shared = Arc::clone(&self.shared);
        tracked.timer = Some(tokio::spawn(fire_after_debounce(shared, version)));
        true
    }

    /// Cancel pending timers. Safe to call more than once.
    pub fn dispose(&self) {
        self.shared.cancel.cancel();
        if let Some(pending) = lock(&self.shared.tracked).timer.take() {
            pending.abort();
        }
    }
}

impl<T> Drop for AutosaveScheduler<T> {
    fn drop(&mut self) {
        self.shared.cancel.cancel();
        if let Some(pending) = lock(&self.shared.tracked).timer.take() {
            pending.abort();
        }
    }
}

async fn fire_after_debounce<T>(shared: Arc<Shared<T>>, version: u64)
where
    T: Clone + Send + 'static,
{
    tokio::select! {
        _ = shared.cancel.cancelled() => return,
        _ = tokio::time::sleep(shared.config.debounce) => {}
    }

    let value = {
        let mut tracked = lock(&shared.tracked);
        if tracked.version != version {
            return;
        }
        // Past this point the save is in flight and a newer change no longer aborts it.
        tracked.timer = None;
        match tracked.last.clone() {
            Some(v) => v,
            None => return,
        }
    };

    let _in_flight = shared.persist_lock.lock().await;
    if shared.cancel.is_cancelled() {
        return;
    }

    info!(
        "[PHASE: autosave] [STEP: persist] {} persisting version {}",
        shared.name, version
    );
    let result = (shared.persist)(value).await;

    if lock(&shared.tracked).version != version {
        debug!(
            "[PHASE: autosave] [STEP: persist] {} version {} finished after a newer change; status left alone",
            shared.name, version
        );
        return;
    }

    match result {
        Ok(()) => {
            shared.status.send_replace(AutosaveStatus::Saved);
            tokio::spawn(reset_after_saved(Arc::clone(&shared), version));
        }
        Err(e) => {
            warn!(
                "[PHASE: autosave] [STEP: persist] {} version {} failed: {}",
                shared.name, version, e
            );
            shared.status.send_replace(AutosaveStatus::Error);
        }
    }
}

async fn reset_after_saved<T>(shared: Arc<Shared<T>>, version: u64)
where
    T: Send + 'static,
{
    tokio::select! {
        _ = shared.cancel.cancelled() => return,
        _ = tokio::time::sleep(shared.config.saved_reset) => {}
    }

    let tracked = lock(&shared.tracked);
    if tracked.version == version {
        shared.status.send_if_modified(|s| {
            if *s == AutosaveStatus::Saved {
                *s = AutosaveStatus::Idle;
                true
            } else {
                false
            }
        });
    }
}
