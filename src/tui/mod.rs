//! Terminal contract editor.
//!
//! - Centered window titled with the contract id and the active role
//! - One editable line per seeded field (role tree leaves, signer name/email, notes)
//! - Bottom button row: [ Save ] [ Sign ] [ Export PDF ] [ Close ]
//! - Error toasts open a message modal; success/info toasts show on the status line
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the terminal UI.

use crate::api::client::{ApiClient, ReqwestApiClient};
use crate::api::contract::ContractEditor;
use crate::api::toast::{Toast, ToastEmitter, ToastIcon};
use crate::config::Settings;
use crate::contract::fields::Role;
use crate::models::responses::{ContractNotesDto, ContractPreviewResponse};
use crate::models::state::Session;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use serde_json::json;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Save,
    Sign,
    Export,
    Close,
}

impl ButtonFocus {
    const ALL: [ButtonFocus; 4] = [
        ButtonFocus::Save,
        ButtonFocus::Sign,
        ButtonFocus::Export,
        ButtonFocus::Close,
    ];

    fn label(&self) -> &'static str {
        match self {
            ButtonFocus::Save => "Save",
            ButtonFocus::Sign => "Sign",
            ButtonFocus::Export => "Export PDF",
            ButtonFocus::Close => "Close",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MessageModal {
    title: String,
    body: String,
    quit_on_dismiss: bool,
}

/// Single-line input; the cursor counts chars, not bytes.
#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
        }
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn len_chars(&self) -> usize {
        self.value.chars().count()
    }

    /// Returns true when the key was consumed (the value may or may not have changed).
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.len_chars() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len_chars());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.len_chars();
                true
            }
            _ => false,
        }
    }

    fn display_with_cursor(&self) -> String {
        let at = self.byte_index(self.cursor);
        format!("{}|{}", &self.value[..at], &self.value[at..])
    }
}

struct EditorState {
    editor: ContractEditor,
    inputs: Vec<TextInput>,
    focus: FocusTarget,
    modal: Option<MessageModal>,
    status: Option<Toast>,
    toasts: Arc<Mutex<Vec<Toast>>>,
    export_dir: PathBuf,
    quit: bool,
}

impl EditorState {
    fn new(editor: ContractEditor, toasts: Arc<Mutex<Vec<Toast>>>, export_dir: PathBuf) -> Self {
        let mut state = Self {
            editor,
            inputs: Vec::new(),
            focus: FocusTarget::Button(ButtonFocus::Save),
            modal: None,
            status: None,
            toasts,
            export_dir,
            quit: false,
        };
        state.reseed_inputs();
        state
    }

    fn reseed_inputs(&mut self) {
        self.inputs = self
            .editor
            .fields()
            .fields()
            .iter()
            .map(|f| TextInput::new(f.value.clone()))
            .collect();
        self.focus = if self.inputs.is_empty() {
            FocusTarget::Button(ButtonFocus::Save)
        } else {
            FocusTarget::Field(0)
        };
    }

    fn focus_order(&self) -> Vec<FocusTarget> {
        (0..self.inputs.len())
            .map(FocusTarget::Field)
            .chain(ButtonFocus::ALL.iter().copied().map(FocusTarget::Button))
            .collect()
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            (pos + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    /// Pull toasts emitted by the editor: errors open a modal, the rest go to the status line.
    fn drain_toasts(&mut self) {
        let pending: Vec<Toast> = match self.toasts.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for toast in pending {
            if toast.icon == ToastIcon::Error && self.modal.is_none() {
                self.modal = Some(MessageModal {
                    title: toast.title.clone(),
                    body: toast.text.clone().unwrap_or_default(),
                    quit_on_dismiss: false,
                });
            }
            self.status = Some(toast);
        }
    }
}

/// Toast emitter that queues toasts for the render loop.
fn queue_toasts(queue: Arc<Mutex<Vec<Toast>>>) -> ToastEmitter {
    Arc::new(move |t: Toast| {
        if let Ok(mut q) = queue.lock() {
            q.push(t);
        }
    })
}

/// Interactive editor for one contract. Returns the last toast shown so the caller can
/// echo it after the terminal is restored.
pub fn run(settings: &Settings, contract_id: &str) -> Result<Option<Toast>> {
    info!(
        "[PHASE: tui] [STEP: start] Starting contract editor (contract_id={})",
        contract_id
    );

    let session = settings.session()?;
    let client: Arc<dyn ApiClient> = Arc::new(ReqwestApiClient::new(
        &settings.api.base_url,
        settings.api_timeout(),
        settings.api.bearer_token.clone(),
    )?);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let toasts = Arc::new(Mutex::new(Vec::new()));
    let mut editor = ContractEditor::new(
        client,
        contract_id,
        session,
        queue_toasts(toasts.clone()),
    )
    .with_after_save(Arc::new(|| {
        info!("[PHASE: tui] [STEP: after_save] Contract list refresh requested")
    }));
    let loaded = rt.block_on(editor.load());

    let mut state = EditorState::new(editor, toasts, settings.export_folder());
    state.drain_toasts();
    if loaded.is_err() {
        if let Some(modal) = state.modal.as_mut() {
            modal.quit_on_dismiss = true;
        }
    }

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut state, &rt);
    restore_terminal(&mut terminal)?;

    result.map(|_| state.status)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut EditorState,
    rt: &Runtime,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    while !state.quit {
        state.drain_toasts();
        terminal.draw(|f| draw(f.size(), f, state))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(state, key.code, rt);
                }
            }
        }
    }

    Ok(())
}

fn handle_key(state: &mut EditorState, code: KeyCode, rt: &Runtime) {
    if let Some(modal) = &state.modal {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            if modal.quit_on_dismiss || !state.editor.is_open() {
                state.quit = true;
            }
            state.modal = None;
        }
        return;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => state.move_focus(true),
        KeyCode::BackTab | KeyCode::Up => state.move_focus(false),
        KeyCode::Esc => activate(state, ButtonFocus::Close, rt),
        KeyCode::Enter => match state.focus {
            FocusTarget::Field(_) => state.move_focus(true),
            FocusTarget::Button(b) => activate(state, b, rt),
        },
        other => match state.focus {
            FocusTarget::Field(i) => {
                let Some(input) = state.inputs.get_mut(i) else {
                    return;
                };
                if input.handle_key(other) {
                    let value = input.value.clone();
                    if let Some(field) = state.editor.fields_mut().field_mut(i) {
                        field.value = value;
                    }
                }
            }
            FocusTarget::Button(b) => {
                let pos = ButtonFocus::ALL.iter().position(|x| *x == b).unwrap_or(0);
                let next = match other {
                    KeyCode::Left => pos.saturating_sub(1),
                    KeyCode::Right => (pos + 1).min(ButtonFocus::ALL.len() - 1),
                    _ => pos,
                };
                state.focus = FocusTarget::Button(ButtonFocus::ALL[next]);
            }
        },
    }
}

fn activate(state: &mut EditorState, button: ButtonFocus, rt: &Runtime) {
    if !state.editor.is_open() && button != ButtonFocus::Close {
        warn!(
            "[PHASE: tui] [STEP: action] {} ignored; editor already closed",
            button.label()
        );
        return;
    }
    info!("[PHASE: tui] [STEP: action] {}", button.label());
    match button {
        ButtonFocus::Save => {
            let report = rt.block_on(state.editor.save());
            if !report.is_success() {
                warn!(
                    "[PHASE: tui] [STEP: action] Save failed (correlation_id={}); edits kept",
                    report.correlation_id
                );
            }
        }
        ButtonFocus::Sign => {
            if let Err(e) = rt.block_on(state.editor.sign()) {
                warn!(
                    "[PHASE: tui] [STEP: action] Sign failed; editor stays open: {}",
                    e
                );
            }
        }
        ButtonFocus::Export => {
            let dir = state.export_dir.clone();
            match rt.block_on(state.editor.export_pdf(&dir)) {
                Ok(path) => info!("[PHASE: tui] [STEP: action] Exported {:?}", path),
                Err(e) => warn!("[PHASE: tui] [STEP: action] Export failed: {}", e),
            }
        }
        ButtonFocus::Close => state.editor.close(),
    }
    state.drain_toasts();
    if !state.editor.is_open() && state.modal.is_none() {
        state.quit = true;
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &EditorState) {
    let window_area = centered_window(area, 100, 30);

    let title = format!(
        "Contract {} ({})",
        state.editor.contract_id(),
        state.editor.role()
    );
    f.render_widget(Block::default().borders(Borders::ALL).title(title), window_area);

    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    draw_fields(f, rows[0], state);
    draw_status(f, rows[1], state);
    draw_buttons(f, rows[2], state);

    if let Some(modal) = &state.modal {
        draw_message_modal(f, window_area, &modal.title, &modal.body);
    }
}

fn draw_fields(f: &mut ratatui::Frame<'_>, area: Rect, state: &EditorState) {
    let block = Block::default().borders(Borders::ALL).title("Fields");
    let list_height = area.height.saturating_sub(2) as usize;
    let fields = state.editor.fields().fields();

    let mut lines: Vec<Line> = Vec::new();
    if fields.is_empty() {
        lines.push(Line::from("(no editable fields)"));
    } else {
        let selected = match state.focus {
            FocusTarget::Field(i) => i,
            FocusTarget::Button(_) => 0,
        };
        let start = selected.saturating_sub(list_height / 2);
        let end = (start + list_height).min(fields.len());
        let label_width = fields
            .iter()
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(32);

        for (i, field) in fields.iter().enumerate().take(end).skip(start) {
            let focused = state.focus == FocusTarget::Field(i);
            let value = match state.inputs.get(i) {
                Some(input) if focused => input.display_with_cursor(),
                Some(input) => input.value.clone(),
                None => field.value.clone(),
            };
            let style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!("{:<width$} ", field.label, width = label_width)),
                Span::styled(format!(" {} ", value), style),
            ]));
        }
    }

    let p = Paragraph::new(Text::from(lines)).block(block);
    f.render_widget(p, area);
}

fn draw_status(f: &mut ratatui::Frame<'_>, area: Rect, state: &EditorState) {
    let line = match &state.status {
        Some(t) => {
            let color = match t.icon {
                ToastIcon::Success => Color::Green,
                ToastIcon::Error => Color::Red,
                ToastIcon::Info => Color::Cyan,
            };
            let text = match &t.text {
                Some(text) => format!("{}: {}", t.title, text),
                None => t.title.clone(),
            };
            Line::from(Span::styled(text, Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            "Tab/Up/Down to move, Enter to activate, Esc to close.",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &EditorState) {
    let mut spans = Vec::new();
    for (i, b) in ButtonFocus::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(button_text(
            b.label(),
            state.focus == FocusTarget::Button(*b),
            state.editor.is_open(),
        ));
    }
    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, title: &str, body: &str) {
    let modal_w = 70u16.min(window_area.width.saturating_sub(4)).max(40);
    let modal_h = 8u16.min(window_area.height.saturating_sub(4)).max(6);
    let area = Rect {
        x: window_area.x + (window_area.width.saturating_sub(modal_w)) / 2,
        y: window_area.y + (window_area.height.saturating_sub(modal_h)) / 2,
        width: modal_w,
        height: modal_h,
    };

    f.render_widget(ratatui::widgets::Clear, area);
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let p = Paragraph::new(Text::from(body.to_string()))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);

    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height - 2,
        width: area.width - 2,
        height: 1,
    };
    let ok = Span::styled("[ OK ]", Style::default().add_modifier(Modifier::REVERSED));
    let p = Paragraph::new(Text::from(Line::from(vec![ok]))).alignment(Alignment::Right);
    f.render_widget(p, buttons_area);
}

fn sample_preview(contract_id: &str) -> ContractPreviewResponse {
    ContractPreviewResponse {
        contract_id: contract_id.to_string(),
        purple: json!({
            "company": { "name": "Studio North", "phone": "+1 (555) 010-2030" },
            "deliverables": { "posts": "3", "stories": "6" }
        }),
        yellow: json!({
            "campaign": { "name": "Spring Launch", "budget": "2500" },
            "contact": { "email": "ops@brand.example" }
        }),
        additional_notes: Some(ContractNotesDto {
            influencer: Some("Posting window starts in May".to_string()),
            brand: None,
        }),
    }
}

/// Seeded state for deterministic rendering; no network call is made.
fn new_smoke_state(target: &str) -> Result<EditorState> {
    let role = if target == "brand" {
        Role::Brand
    } else {
        Role::Influencer
    };
    let brand_id = match role {
        Role::Brand => Some("B-100".to_string()),
        Role::Influencer => None,
    };
    let client: Arc<dyn ApiClient> = Arc::new(ReqwestApiClient::new(
        "http://localhost:8080/api/",
        Duration::from_secs(1),
        None,
    )?);
    let toasts = Arc::new(Mutex::new(Vec::new()));
    let mut editor = ContractEditor::new(
        client,
        "C-1001",
        Session::new(role, brand_id),
        queue_toasts(toasts.clone()),
    );
    editor.seed_from_preview(&sample_preview("C-1001"));

    let mut state = EditorState::new(editor, toasts, std::env::temp_dir());
    if target == "toast" {
        if let Ok(mut q) = state.toasts.lock() {
            q.push(Toast::error("Update failed", "Brand ID is required."));
        }
        state.drain_toasts();
    }
    Ok(state)
}

fn render_to_buffer(state: &EditorState) -> Result<Buffer> {
    // In-memory backend: no raw mode, no alternate screen.
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, state))?;
    Ok(terminal.backend().buffer().clone())
}

/// Non-interactive smoke mode: render a single frame and exit.
/// Targets: editor|brand|toast
pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );
    let t = target.trim().to_ascii_lowercase();
    let state = new_smoke_state(t.as_str())?;
    render_to_buffer(&state)?;
    Ok(())
}
