//! Line-oriented frontend.
//!
//! Prompts are written to stderr and answered from stdin one line at a time,
//! so the installer can run over SSH, in CI or with piped input. End of input
//! counts as quitting.
//!
//! Ctrl+C while a step is running lets the step finish and then cancels the
//! session. At a prompt nothing is in flight, so it cancels straight away.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use goinst_engine::download::{self, ProgressCallback, ProgressEvent};
use goinst_engine::driver::{self, Frontend};
use goinst_engine::effects::HostEffects;
use goinst_engine::select::normalize_version;
use goinst_engine::{Input, InstallerConfig, Prompt, Session, SessionOutcome, SessionState};

use crate::picker::{self, VersionChoice};
use crate::report;

/// Versions listed before the user has to narrow the list with a filter.
const PICKER_PAGE: usize = 15;

/// Runs a whole session on stdin/stderr.
pub async fn run(config: InstallerConfig, version: Option<&str>) -> SessionOutcome {
    let effects = HostEffects::new(config.clone(), progress_printer());
    let mut session = Session::new(config, version);
    let mut frontend = LineFrontend::new(io::stdin().lock(), io::stderr());
    let watcher = tokio::spawn(watch_ctrl_c(Arc::clone(&frontend.interrupts)));
    let outcome = driver::run(&mut session, &effects, &mut frontend).await;
    watcher.abort();
    outcome
}

/// Ctrl+C state shared between the signal watcher and the frontend.
#[derive(Debug, Default)]
pub struct Interrupts {
    requested: AtomicBool,
    prompting: AtomicBool,
}

impl Interrupts {
    /// Records a Ctrl+C. Returns `true` if a prompt was waiting for input,
    /// in which case the session can be abandoned immediately.
    pub fn interrupt(&self) -> bool {
        self.requested.store(true, Ordering::SeqCst);
        self.prompting.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn set_prompting(&self, prompting: bool) {
        self.prompting.store(prompting, Ordering::SeqCst);
    }
}

async fn watch_ctrl_c(interrupts: Arc<Interrupts>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if interrupts.interrupt() {
            // The prompt is blocked in a read; nothing has been dispatched.
            eprintln!();
            report::print(&SessionOutcome::Cancelled);
            std::process::exit(report::EXIT_CANCELLED);
        }
        eprintln!();
        eprintln!("Cancelling after the current step...");
    }
}

/// Reports download progress on stderr.
fn progress_printer() -> ProgressCallback {
    Arc::new(|event| match event {
        ProgressEvent::Started { url, total } => {
            if total > 0 {
                eprintln!("Downloading {url} ({})", download::format_bytes(total));
            } else {
                eprintln!("Downloading {url}");
            }
        }
        ProgressEvent::Progress { downloaded, speed } => {
            eprint!(
                "\r  {} ({}/s)   ",
                download::format_bytes(downloaded),
                download::format_bytes(speed)
            );
        }
        ProgressEvent::Completed => eprintln!(),
    })
}

/// Answers prompts by reading lines from `input` and writing to `output`.
pub struct LineFrontend<R, W> {
    input: R,
    output: W,
    interrupts: Arc<Interrupts>,
}

impl<R: BufRead, W: Write> LineFrontend<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            interrupts: Arc::default(),
        }
    }

    /// Prints `question` and reads one trimmed line. `None` on end of input.
    fn ask(&mut self, question: &str) -> Option<String> {
        let _ = write!(self.output, "{question}");
        let _ = self.output.flush();
        let mut line = String::new();
        self.interrupts.set_prompting(true);
        let read = self.input.read_line(&mut line);
        self.interrupts.set_prompting(false);
        match read {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn say(&mut self, line: &str) {
        let _ = writeln!(self.output, "{line}");
    }

    fn confirm(&mut self, question: &str) -> Input {
        match self.ask(&format!("{question} [y/N] ")) {
            None => Input::Quit,
            Some(answer) => Input::Confirm(matches!(
                answer.to_ascii_lowercase().as_str(),
                "y" | "yes"
            )),
        }
    }

    fn select(&mut self, choices: &[VersionChoice], notice: Option<&str>) -> Input {
        if let Some(notice) = notice {
            self.say(notice);
        }
        let mut filter = String::new();

        loop {
            let visible: Vec<usize> = picker::filter_indices(choices, &filter)
                .into_iter()
                .filter(|&i| choices[i].available)
                .collect();

            self.say("Select Go Version");
            if visible.is_empty() {
                self.say("  No matching versions for this platform.");
            }
            for (n, &i) in visible.iter().take(PICKER_PAGE).enumerate() {
                let choice = &choices[i];
                self.say(&format!(
                    "  {:>2}) {:<12} {}",
                    n + 1,
                    choice.version,
                    choice.description()
                ));
            }
            if visible.len() > PICKER_PAGE {
                self.say(&format!(
                    "  ... {} more, type part of a version to filter",
                    visible.len() - PICKER_PAGE
                ));
            }

            let Some(answer) = self.ask("Version number, filter, or q to quit [1]: ") else {
                return Input::Quit;
            };
            if answer.eq_ignore_ascii_case("q") {
                return Input::Quit;
            }
            if answer.is_empty() {
                if let Some(&first) = visible.first() {
                    return Input::Select(choices[first].version.clone());
                }
                continue;
            }
            if let Ok(n) = answer.parse::<usize>()
                && let Some(&i) = visible.get(n.wrapping_sub(1))
                && n <= PICKER_PAGE
            {
                return Input::Select(choices[i].version.clone());
            }
            let wanted = normalize_version(&answer);
            if let Some(choice) = choices.iter().find(|c| c.available && c.version == wanted) {
                return Input::Select(choice.version.clone());
            }
            filter = answer;
        }
    }
}

impl<R: BufRead, W: Write> Frontend for LineFrontend<R, W> {
    fn answer(&mut self, prompt: &Prompt) -> Input {
        match prompt {
            Prompt::ConfirmDependencies { missing, command } => {
                self.say("The following dependencies are missing:");
                for dep in missing {
                    let kind = if dep.required { "required" } else { "recommended" };
                    self.say(&format!("  - {} ({kind})", dep.name));
                }
                self.say(&format!("They can be installed with: {command}"));
                self.confirm("Install missing dependencies?")
            }
            Prompt::SelectVersion {
                catalog,
                target,
                notice,
            } => {
                let choices = picker::choices(catalog, target);
                self.select(&choices, notice.as_deref())
            }
            Prompt::ConfirmOverwrite { version, root } => {
                self.say(&format!("Go is already installed at {}.", root.display()));
                self.confirm(&format!("Remove it and install {version}?"))
            }
        }
    }

    fn working(&mut self, state: SessionState) {
        let line = match state {
            SessionState::Installing(stage) => match stage.step() {
                Some((index, total)) => format!("[{index}/{total}] {}", stage.description()),
                None => stage.description().to_string(),
            },
            other => other.description().to_string(),
        };
        self.say(&line);
    }

    fn cancel_requested(&self) -> bool {
        self.interrupts.requested()
    }
}
