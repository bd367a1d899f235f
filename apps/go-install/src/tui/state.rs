//! TUI state management.
//!
//! View-specific state for each screen. The session itself is the source of
//! truth for where the installation is; these types only hold what the views
//! need to draw it.

use std::path::Path;

use goinst_engine::SessionState;
use goinst_engine::catalog::ReleaseCatalog;
use goinst_engine::deps::MissingDependency;
use goinst_engine::download::{self, ProgressEvent};
use goinst_engine::platform::Target;

use crate::picker::{self, VersionChoice};

/// Spinner animation frames, advanced once per event loop tick.
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Active screen in the TUI application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Spinner and step description while work is in flight.
    #[default]
    Progress,
    /// Yes/no question.
    Confirm,
    /// Version picker.
    Picker,
    /// Final result.
    Summary,
}

/// Bytes received so far for the archive download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadState {
    pub downloaded: u64,
    /// `Content-Length`, or 0 if the server did not send one.
    pub total: u64,
    pub speed: u64,
}

impl DownloadState {
    /// Completed fraction, if the total size is known.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.downloaded as f64 / self.total as f64;
        Some(ratio.clamp(0.0, 1.0))
    }

    /// "12.00 MB / 64.00 MB", or just the received size if the total is unknown.
    #[must_use]
    pub fn format_progress(&self) -> String {
        if self.total == 0 {
            download::format_bytes(self.downloaded)
        } else {
            format!(
                "{} / {}",
                download::format_bytes(self.downloaded),
                download::format_bytes(self.total)
            )
        }
    }

    /// Speed as "4.20 MB/s", or empty before the first measurement.
    #[must_use]
    pub fn format_speed(&self) -> String {
        if self.speed == 0 {
            String::new()
        } else {
            format!("{}/s", download::format_bytes(self.speed))
        }
    }
}

/// State of the progress screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    /// Session state whose work is in flight.
    pub state: SessionState,
    /// Present while the archive is being downloaded.
    pub download: Option<DownloadState>,
    /// Set once the user asked to quit; the session stops after the current step.
    pub cancelling: bool,
    tick: usize,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(SessionState::CheckingDependencies)
    }
}

impl ProgressState {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            download: None,
            cancelling: false,
            tick: 0,
        }
    }

    /// Switches to the work for `state`, keeping the spinner position.
    pub fn begin(&mut self, state: SessionState) {
        self.state = state;
        self.download = None;
    }

    /// Advances the spinner.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    #[must_use]
    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.tick % SPINNER_FRAMES.len()]
    }

    /// Folds a download progress report into the state.
    pub fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total, .. } => {
                self.download = Some(DownloadState {
                    total,
                    ..DownloadState::default()
                });
            }
            ProgressEvent::Progress { downloaded, speed } => {
                let download = self.download.get_or_insert_with(DownloadState::default);
                download.downloaded = downloaded;
                download.speed = speed;
            }
            ProgressEvent::Completed => {
                if let Some(download) = self.download.as_mut()
                    && download.total > 0
                {
                    download.downloaded = download.total;
                }
            }
        }
    }
}

/// A yes/no question with some context lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmState {
    pub title: String,
    pub lines: Vec<String>,
    pub question: String,
}

impl ConfirmState {
    #[must_use]
    pub fn dependencies(missing: &[MissingDependency], command: &str) -> Self {
        let mut lines = vec!["The following dependencies are missing:".to_string()];
        lines.extend(missing.iter().map(|dep| {
            let kind = if dep.required { "required" } else { "recommended" };
            format!("  - {} ({kind})", dep.name)
        }));
        lines.push(String::new());
        lines.push("They will be installed with:".to_string());
        lines.push(format!("  {command}"));
        Self {
            title: "Missing Dependencies".to_string(),
            lines,
            question: "Install missing dependencies?".to_string(),
        }
    }

    #[must_use]
    pub fn overwrite(version: &str, root: &Path) -> Self {
        Self {
            title: "Existing Installation".to_string(),
            lines: vec![
                format!("Go is already installed at {}.", root.display()),
                "It will be removed before the new version is unpacked.".to_string(),
            ],
            question: format!("Replace it with {version}?"),
        }
    }
}

/// State of the version picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub choices: Vec<VersionChoice>,
    pub filter: String,
    /// Indices into `choices` that match the filter.
    pub visible: Vec<usize>,
    /// Index into `visible` of the highlighted row.
    pub selected: usize,
    /// Why a requested version was not used.
    pub notice: Option<String>,
    pub target: String,
}

impl PickerState {
    #[must_use]
    pub fn new(catalog: &ReleaseCatalog, target: &Target, notice: Option<String>) -> Self {
        let choices = picker::choices(catalog, target);
        let mut state = Self {
            visible: Vec::new(),
            choices,
            filter: String::new(),
            selected: 0,
            notice,
            target: target.to_string(),
        };
        state.refilter();
        state
    }

    pub fn push_filter(&mut self, c: char) {
        self.filter.push(c);
        self.refilter();
    }

    pub fn pop_filter(&mut self) {
        self.filter.pop();
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.refilter();
    }

    /// Moves the highlight to the previous selectable row.
    pub fn select_previous(&mut self) {
        if let Some(pos) = (0..self.selected).rev().find(|&p| self.is_selectable(p)) {
            self.selected = pos;
        }
    }

    /// Moves the highlight to the next selectable row.
    pub fn select_next(&mut self) {
        if let Some(pos) = (self.selected + 1..self.visible.len()).find(|&p| self.is_selectable(p)) {
            self.selected = pos;
        }
    }

    /// The highlighted row, if it can be installed.
    #[must_use]
    pub fn selected_choice(&self) -> Option<&VersionChoice> {
        self.visible
            .get(self.selected)
            .map(|&i| &self.choices[i])
            .filter(|c| c.available)
    }

    fn is_selectable(&self, pos: usize) -> bool {
        self.visible
            .get(pos)
            .is_some_and(|&i| self.choices[i].available)
    }

    fn refilter(&mut self) {
        self.visible = picker::filter_indices(&self.choices, &self.filter);
        self.selected = (0..self.visible.len())
            .find(|&p| self.is_selectable(p))
            .unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goinst_engine::pipeline::Stage;
    use std::path::PathBuf;

    fn catalog() -> ReleaseCatalog {
        ReleaseCatalog::from_json(
            r#"[
                {"version": "go1.23.0", "files": [
                    {"filename": "go1.23.0.darwin-arm64.tar.gz", "os": "darwin", "arch": "arm64", "kind": "archive", "sha256": "aa"}
                ]},
                {"version": "go1.22.1", "files": [
                    {"filename": "go1.22.1.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive", "sha256": "bb"}
                ]},
                {"version": "go1.22.0", "files": []},
                {"version": "go1.21.8", "files": [
                    {"filename": "go1.21.8.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive", "sha256": "cc"}
                ]}
            ]"#,
        )
        .unwrap()
    }

    fn picker() -> PickerState {
        PickerState::new(&catalog(), &Target::new("linux", "amd64"), None)
    }

    #[test]
    fn picker_starts_on_first_selectable_row() {
        let state = picker();
        assert_eq!(state.visible.len(), 4);
        assert_eq!(state.selected, 1);
        assert_eq!(state.selected_choice().unwrap().version, "go1.22.1");
        assert_eq!(state.target, "linux/amd64");
    }

    #[test]
    fn navigation_skips_unavailable_rows() {
        let mut state = picker();
        state.select_next();
        assert_eq!(state.selected_choice().unwrap().version, "go1.21.8");
        state.select_next();
        assert_eq!(state.selected_choice().unwrap().version, "go1.21.8");
        state.select_previous();
        assert_eq!(state.selected_choice().unwrap().version, "go1.22.1");
        state.select_previous();
        assert_eq!(state.selected_choice().unwrap().version, "go1.22.1");
    }

    #[test]
    fn filtering_narrows_rows_and_reselects() {
        let mut state = picker();
        state.push_filter('2');
        state.push_filter('1');
        assert_eq!(state.filter, "21");
        assert_eq!(state.selected_choice().unwrap().version, "go1.21.8");

        state.pop_filter();
        state.pop_filter();
        state.push_filter('x');
        assert!(state.visible.is_empty());
        assert!(state.selected_choice().is_none());

        state.clear_filter();
        assert_eq!(state.visible.len(), 4);
    }

    #[test]
    fn download_progress_is_tracked() {
        let mut state = ProgressState::new(SessionState::Installing(Stage::Downloading));
        assert!(state.download.is_none());

        state.apply(ProgressEvent::Started {
            url: "https://go.dev/dl/x".to_string(),
            total: 2048,
        });
        state.apply(ProgressEvent::Progress {
            downloaded: 1024,
            speed: 512,
        });
        let download = state.download.unwrap();
        assert_eq!(download.ratio(), Some(0.5));
        assert_eq!(download.format_progress(), "1.00 KB / 2.00 KB");
        assert_eq!(download.format_speed(), "512 B/s");

        state.apply(ProgressEvent::Completed);
        assert_eq!(state.download.unwrap().ratio(), Some(1.0));

        state.begin(SessionState::Installing(Stage::Verifying));
        assert!(state.download.is_none());
    }

    #[test]
    fn unknown_total_has_no_ratio() {
        let download = DownloadState {
            downloaded: 10,
            total: 0,
            speed: 0,
        };
        assert_eq!(download.ratio(), None);
        assert_eq!(download.format_speed(), "");
    }

    #[test]
    fn spinner_cycles() {
        let mut state = ProgressState::default();
        let first = state.spinner();
        for _ in 0..SPINNER_FRAMES.len() {
            state.tick();
        }
        assert_eq!(state.spinner(), first);
    }

    #[test]
    fn dependency_question_shows_command() {
        let confirm = ConfirmState::dependencies(
            &[MissingDependency {
                name: "Git".to_string(),
                required: false,
                packages: vec!["git".to_string()],
            }],
            "sudo apk add git",
        );
        assert!(confirm.lines.contains(&"  - Git (recommended)".to_string()));
        assert!(confirm.lines.contains(&"  sudo apk add git".to_string()));

        let overwrite = ConfirmState::overwrite("go1.22.1", &PathBuf::from("/usr/local/go"));
        assert_eq!(overwrite.question, "Replace it with go1.22.1?");
    }
}
