//! Main TUI application logic.
//!
//! The [`App`] owns the [`Session`] and runs it without ever blocking the
//! draw loop:
//!
//! - Work commands are spawned onto the tokio runtime. Each task sends its
//!   single outcome event back over a channel.
//! - Download progress arrives on the same channel.
//! - The loop drains the channel every tick, feeds events to the session and
//!   dispatches whatever it answers.
//!
//! ## Keys
//!
//! - **Progress**: `q`/`Esc` cancel after the current step
//! - **Confirm**: `y` yes, `n`/`Esc` no, `q` quit
//! - **Picker**: arrows move, typing filters, `Enter` installs, `Esc` clears
//!   the filter or quits
//! - **Summary**: `Enter`/`q`/`Esc` exit
//!
//! `Ctrl+C` quits from any screen.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use goinst_engine::download::{ProgressCallback, ProgressEvent};
use goinst_engine::effects::{Effects, execute};
use goinst_engine::{Command, Event, Input, Prompt, Session, SessionOutcome};
use ratatui::Frame;
use tokio::runtime::Handle;
use tracing::debug;

use super::state::{ConfirmState, PickerState, ProgressState, Screen};
use super::terminal::TerminalGuard;
use super::theme::Theme;
use super::views::{confirm_view, progress_view, summary_view, version_select_view};
use crate::report::{self, Summary};

/// Event polling timeout in milliseconds. Also the spinner frame interval.
const POLL_TIMEOUT_MS: u64 = 100;

/// Message from a background task to the event loop.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Outcome of a dispatched command.
    Event(Event),
    /// Download telemetry.
    Progress(ProgressEvent),
}

/// Returns a download progress callback that forwards to the event loop.
#[must_use]
pub fn progress_sender(tx: Sender<WorkerMessage>) -> ProgressCallback {
    Arc::new(move |event| {
        let _ = tx.send(WorkerMessage::Progress(event));
    })
}

/// Main application state.
pub struct App<E> {
    session: Session,
    effects: Arc<E>,
    runtime: Handle,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    screen: Screen,
    theme: Theme,
    progress: ProgressState,
    confirm: Option<ConfirmState>,
    picker: Option<PickerState>,
    summary: Option<Summary>,
    outcome: Option<SessionOutcome>,
    should_quit: bool,
}

impl<E: Effects + 'static> App<E> {
    /// Creates the app. `tx` must be the sender paired with `rx`, the same one
    /// the effects' progress callback was built from.
    #[must_use]
    pub fn new(
        session: Session,
        effects: E,
        runtime: Handle,
        tx: Sender<WorkerMessage>,
        rx: Receiver<WorkerMessage>,
    ) -> Self {
        Self {
            session,
            effects: Arc::new(effects),
            runtime,
            tx,
            rx,
            screen: Screen::Progress,
            theme: Theme::detect(),
            progress: ProgressState::default(),
            confirm: None,
            picker: None,
            summary: None,
            outcome: None,
            should_quit: false,
        }
    }

    /// Dispatches the session's first command.
    pub fn start(&mut self) {
        let command = self.session.start();
        self.dispatch(command);
    }

    /// How the session ended, once it has.
    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Exit(outcome) => {
                debug!(?outcome, "session finished");
                self.summary = Some(report::summarize(&outcome));
                self.outcome = Some(outcome);
                self.screen = Screen::Summary;
            }
            Command::AwaitInput(prompt) => self.show_prompt(prompt),
            Command::Wait => {}
            work => {
                self.progress.begin(self.session.state());
                self.screen = Screen::Progress;

                let effects = Arc::clone(&self.effects);
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    if let Some(event) = execute(effects.as_ref(), work).await {
                        let _ = tx.send(WorkerMessage::Event(event));
                    }
                });
            }
        }
    }

    fn show_prompt(&mut self, prompt: Prompt) {
        match prompt {
            Prompt::ConfirmDependencies { missing, command } => {
                self.confirm = Some(ConfirmState::dependencies(&missing, &command));
                self.screen = Screen::Confirm;
            }
            Prompt::ConfirmOverwrite { version, root } => {
                self.confirm = Some(ConfirmState::overwrite(&version, &root));
                self.screen = Screen::Confirm;
            }
            Prompt::SelectVersion {
                catalog,
                target,
                notice,
            } => {
                self.picker = Some(PickerState::new(&catalog, &target, notice));
                self.screen = Screen::Picker;
            }
        }
    }

    fn send_input(&mut self, input: Input) {
        let command = self.session.handle(Event::Input(input));
        self.dispatch(command);
    }

    /// Feeds every pending background message to the session.
    fn poll_worker(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            match message {
                WorkerMessage::Event(event) => {
                    let command = self.session.handle(event);
                    self.dispatch(command);
                }
                WorkerMessage::Progress(progress) => self.progress.apply(progress),
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.screen {
            Screen::Progress => {
                if matches!(code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.quit();
                }
            }
            Screen::Confirm => match code {
                KeyCode::Char('y' | 'Y') => self.send_input(Input::Confirm(true)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.send_input(Input::Confirm(false)),
                KeyCode::Char('q') => self.quit(),
                _ => {}
            },
            Screen::Picker => self.handle_picker_key(code),
            Screen::Summary => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.should_quit = true;
                }
            }
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match code {
            KeyCode::Up => picker.select_previous(),
            KeyCode::Down => picker.select_next(),
            KeyCode::Backspace => picker.pop_filter(),
            KeyCode::Esc if !picker.filter.is_empty() => picker.clear_filter(),
            KeyCode::Esc => self.quit(),
            KeyCode::Enter => {
                let version = picker.selected_choice().map(|c| c.version.clone());
                if let Some(version) = version {
                    self.send_input(Input::Select(version));
                }
            }
            KeyCode::Char(c) if !c.is_control() => picker.push_filter(c),
            _ => {}
        }
    }

    fn quit(&mut self) {
        if self.outcome.is_some() {
            self.should_quit = true;
            return;
        }
        if self.session.state().is_busy() {
            self.progress.cancelling = true;
        }
        self.send_input(Input::Quit);
    }
}

/// Runs the event loop until the user leaves the summary screen.
///
/// # Errors
///
/// Returns an error if drawing or reading terminal events fails.
pub fn run_app<E: Effects + 'static>(
    guard: &mut TerminalGuard,
    mut app: App<E>,
) -> Result<SessionOutcome> {
    app.start();

    loop {
        app.poll_worker();
        app.progress.tick();

        guard
            .terminal
            .draw(|frame| render(&app, frame))
            .context("failed to draw frame")?;

        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS)).context("event poll failed")?
            && let TermEvent::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code, key.modifiers);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(app.outcome.unwrap_or(SessionOutcome::Cancelled))
}

fn render<E>(app: &App<E>, frame: &mut Frame) {
    let area = frame.area();

    match app.screen {
        Screen::Progress => progress_view::render(frame, area, &app.theme, &app.progress),
        Screen::Confirm => {
            if let Some(confirm) = &app.confirm {
                confirm_view::render(frame, area, &app.theme, confirm);
            }
        }
        Screen::Picker => {
            if let Some(picker) = &app.picker {
                version_select_view::render(frame, area, &app.theme, picker);
            }
        }
        Screen::Summary => {
            if let Some(summary) = &app.summary {
                summary_view::render(frame, area, &app.theme, summary);
            }
        }
    }
}
