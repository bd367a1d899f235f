//! Sequential session driver.
//!
//! Runs a [`Session`] to completion on the current task: every command is
//! executed inline and its event fed straight back, and prompts are answered by
//! a [`Frontend`]. Only one unit of work is ever in flight. Used by the
//! line-oriented frontend and by tests; the terminal UI dispatches work on a
//! background runtime instead so it can keep redrawing.

use tracing::error;

use crate::effects::{Effects, execute};
use crate::event::{Command, Event, Input, Prompt, SessionOutcome};
use crate::session::{Session, SessionState};

/// Something that can answer prompts.
pub trait Frontend {
    /// Answers `prompt`. Returning [`Input::Quit`] cancels the session.
    fn answer(&mut self, prompt: &Prompt) -> Input;

    /// Called before each unit of work is dispatched.
    fn working(&mut self, state: SessionState) {
        let _ = state;
    }

    /// Whether the user asked to stop while work was running.
    ///
    /// Checked after each unit of work completes; a `true` answer is fed to
    /// the session as [`Input::Quit`] before that work's outcome.
    fn cancel_requested(&self) -> bool {
        false
    }
}

/// Drives `session` until it exits and returns the outcome.
pub async fn run<E: Effects, F: Frontend>(
    session: &mut Session,
    effects: &E,
    frontend: &mut F,
) -> SessionOutcome {
    let mut command = session.start();

    loop {
        let event = match command {
            Command::Exit(outcome) => return outcome,
            Command::AwaitInput(prompt) => Event::Input(frontend.answer(&prompt)),
            Command::Wait => return stalled(session),
            work => {
                frontend.working(session.state());
                let Some(event) = execute(effects, work).await else {
                    return stalled(session);
                };
                if frontend.cancel_requested() && !session.pending_cancel() {
                    session.handle(Event::Input(Input::Quit));
                }
                event
            }
        };
        command = session.handle(event);
    }
}

/// Nothing is in flight and nothing was asked; the session cannot progress.
fn stalled(session: &Session) -> SessionOutcome {
    error!(state = ?session.state(), "session stalled with no work in flight");
    session
        .outcome()
        .cloned()
        .unwrap_or(SessionOutcome::Cancelled)
}
