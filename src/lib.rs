// Collaboration portal client core
// Main library entry point

pub mod api;
pub mod autosave;
pub mod config;
pub mod contract;
pub mod error;
pub mod models;
mod tui;
pub mod utils;

use api::client::{ApiClient, DryRunApiClient};
use api::contract::{ContractEditor, SaveReport};
use autosave::onboarding::{OnboardingWizard, Section};
use autosave::{AutosaveConfig, AutosaveStatus};
use contract::fields::{FieldSnapshot, Role};
use log::{error, info};
use models::state::Session;
use serde_json::json;
use std::sync::Arc;

fn human_line(message: &std::fmt::Arguments<'_>, record: &log::Record<'_>) -> String {
    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let (phase, step, cleaned) = utils::logging::parse_log_metadata(&message.to_string());
    utils::logging::format_human_readable_log(
        &timestamp_local.to_string(),
        record.level(),
        record.target(),
        &cleaned,
        phase.as_deref(),
        step.as_deref(),
    )
}

fn json_line(message: &std::fmt::Arguments<'_>, record: &log::Record<'_>) -> String {
    let (phase, step, cleaned) = utils::logging::parse_log_metadata(&message.to_string());
    utils::logging::format_json_log(
        &chrono::Utc::now().to_rfc3339(),
        record.level(),
        record.target(),
        &cleaned,
        phase.as_deref(),
        step.as_deref(),
        None,
    )
}

/// Dual-format file logging: `portal-<ts>.log` (JSON lines) and `portal-<ts>.txt`.
/// Stdout is optional and must stay off while the TUI owns the terminal.
pub fn init_logging(with_stdout: bool) -> anyhow::Result<()> {
    let log_dir = utils::path_resolver::resolve_log_folder()?;
    std::fs::create_dir_all(&log_dir)?;

    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    let json_log_file = log_dir.join(format!("portal-{}.log", timestamp));
    let txt_log_file = log_dir.join(format!("portal-{}.txt", timestamp));

    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(|out, message, record| {
                    out.finish(format_args!("{}", human_line(message, record)))
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("{}", json_line(message, record)))
                })
                .chain(fern::log_file(json_log_file)?),
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!("{}", human_line(message, record)))
                })
                .chain(fern::log_file(txt_log_file)?),
        )
        .apply()?;

    info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(())
}

/// Interactive terminal editor for one contract.
pub fn run_tui(contract_id: String) {
    if let Err(e) = init_logging(false) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(
        "[PHASE: initialization] Contract editor starting at {}",
        chrono::Utc::now()
    );

    let settings = match config::Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!("[PHASE: initialization] [STEP: config] {:?}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    match tui::run(&settings, &contract_id) {
        Ok(Some(last)) => match last.text {
            Some(text) => println!("{}: {}", last.title, text),
            None => println!("{}", last.title),
        },
        Ok(None) => {}
        Err(e) => {
            error!("[PHASE: tui] [STEP: fatal] TUI exited with error: {:?}", e);
            eprintln!("Portal error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Non-interactive TUI smoke mode (for automated checks).
/// Renders a single frame on an in-memory backend and exits.
pub fn run_tui_smoke(target: Option<String>) {
    if let Err(e) = init_logging(false) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let target = target.as_deref().unwrap_or("editor");
    if let Err(e) = tui::smoke(target) {
        error!(
            "[PHASE: tui] [STEP: smoke] TUI smoke exited with error: {:?}",
            e
        );
        eprintln!("Portal error: {}", e);
        std::process::exit(1);
    }
    println!("TUI smoke ok (target={})", target);
}

fn sample_snapshot(role: Role) -> FieldSnapshot {
    let mut snapshot = FieldSnapshot::new();
    match role {
        Role::Influencer => {
            snapshot.insert("purple.company.name", "Studio North");
            snapshot.insert("purple.company.phone", "+1 (555) 010-2030");
            snapshot.insert("purple.deliverables.posts", "3");
        }
        Role::Brand => {
            snapshot.insert("yellow.campaign.name", "Spring Launch");
            snapshot.insert("yellow.contact.mobilePhone", "555-0100 ext 9");
        }
    }
    snapshot.insert(role.notes_key(), "Posting window starts in May");
    snapshot
}

/// Run the full editor save against the dry-run client: notes first, then the main call,
/// with toasts going to the log.
async fn dry_run_save(session: Session) -> SaveReport {
    let client: Arc<dyn ApiClient> = Arc::new(DryRunApiClient);
    let snapshot = sample_snapshot(session.role);
    let mut editor = ContractEditor::new(client, "C-1001", session, api::toast::log_toasts());
    for (key, value) in snapshot.iter() {
        editor.fields_mut().register(key, key, value);
    }
    editor.save().await
}

/// Non-interactive payload transcript: prints the save plan for a sample snapshot of each
/// role, then runs the save flow against the dry-run client. Exits 0/1. No network calls.
pub fn run_payload_smoke() {
    if let Err(e) = init_logging(true) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Portal error: {}", e);
            std::process::exit(1);
        }
    };

    let sessions = [
        Session::new(Role::Influencer, None),
        Session::new(Role::Brand, Some("B-100".to_string())),
    ];

    let mut failed = false;
    for session in sessions {
        let snapshot = sample_snapshot(session.role);
        match contract::payload::build_payload(&snapshot, "C-1001", &session) {
            Ok(plan) => match serde_json::to_string_pretty(&plan) {
                Ok(text) => println!("{}:\n{}", session.role, text),
                Err(e) => {
                    error!("[PHASE: payload] [STEP: smoke] {}", e);
                    failed = true;
                }
            },
            Err(e) => {
                error!(
                    "[PHASE: payload] [STEP: smoke] role={} failed: {}",
                    session.role, e
                );
                failed = true;
            }
        }

        let role = session.role;
        let report = rt.block_on(dry_run_save(session));
        println!(
            "{} dry-run save: {} (correlation_id={})",
            role,
            if report.is_success() { "ok" } else { "failed" },
            report.correlation_id
        );
        failed |= !report.is_success();
    }

    if failed {
        std::process::exit(1);
    }
}

fn status_text(status: AutosaveStatus) -> &'static str {
    match status.label() {
        "" => "idle",
        label => label,
    }
}

/// Mount the onboarding wizard on the dry-run client, edit two sections and wait one debounce.
/// Returns the status of each section after the wait.
async fn onboarding_dry_run(config: AutosaveConfig) -> [AutosaveStatus; 3] {
    let client: Arc<dyn ApiClient> = Arc::new(DryRunApiClient);
    let mut wizard = OnboardingWizard::mount(client, config, None);

    wizard.set_answer(Section::Round1, "handle", json!("@studio_north"));
    wizard.set_answer(Section::Round1, "handle", json!("@studio.north"));
    wizard.set_answer(Section::Round3, "rate", json!(250));
    for section in Section::ALL {
        info!(
            "[PHASE: onboarding] [STEP: edited] {} {}",
            section.as_str(),
            status_text(wizard.status(section))
        );
    }

    tokio::time::sleep(config.debounce + std::time::Duration::from_millis(50)).await;
    let statuses = Section::ALL.map(|section| wizard.status(section));
    wizard.dispose();
    statuses
}

/// Non-interactive onboarding autosave transcript using the configured debounce.
/// Exits 0 when the edited sections saved and the untouched one stayed idle.
pub fn run_onboarding_smoke() {
    if let Err(e) = init_logging(true) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let settings = match config::Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!("[PHASE: initialization] [STEP: config] {:?}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Portal error: {}", e);
            std::process::exit(1);
        }
    };

    let statuses = rt.block_on(onboarding_dry_run(settings.autosave_config()));
    for (section, status) in Section::ALL.iter().zip(statuses) {
        println!("{}: {}", section.as_str(), status_text(status));
    }

    let expected = [
        AutosaveStatus::Saved,
        AutosaveStatus::Idle,
        AutosaveStatus::Saved,
    ];
    if statuses != expected {
        error!(
            "[PHASE: onboarding] [STEP: smoke] unexpected statuses {:?}",
            statuses
        );
        std::process::exit(1);
    }
}
