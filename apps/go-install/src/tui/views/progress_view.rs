//! Progress screen: spinner, step description and download gauge.

use goinst_engine::SessionState;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::tui::state::ProgressState;
use crate::tui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, state: &ProgressState) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // Status
        Constraint::Length(3), // Download gauge
        Constraint::Min(0),
        Constraint::Length(3), // Help
    ])
    .split(area);

    render_status(frame, chunks[0], theme, state);
    if let Some(download) = &state.download {
        let speed = download.format_speed();
        let label = if speed.is_empty() {
            download.format_progress()
        } else {
            format!("{}  {speed}", download.format_progress())
        };
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.border)),
            )
            .gauge_style(Style::default().fg(theme.accent))
            .label(label)
            .ratio(download.ratio().unwrap_or(0.0));
        frame.render_widget(gauge, chunks[1]);
    }
    render_help(frame, chunks[3], theme, state);
}

fn render_status(frame: &mut Frame, area: Rect, theme: &Theme, state: &ProgressState) {
    let step = match state.state {
        SessionState::Installing(stage) => stage
            .step()
            .map(|(index, total)| format!("Step {index} of {total}")),
        _ => None,
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                state.spinner().to_string(),
                Style::default().fg(theme.accent),
            ),
            Span::raw(" "),
            Span::styled(
                state.state.description(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    if let Some(step) = step {
        lines.push(Line::from(Span::styled(
            format!("    {step}"),
            Style::default().fg(theme.muted),
        )));
    }

    let status = Paragraph::new(lines).block(
        Block::default()
            .title(" Installing Go ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(status, area);
}

fn render_help(frame: &mut Frame, area: Rect, theme: &Theme, state: &ProgressState) {
    let line = if state.cancelling {
        Line::from(Span::styled(
            "Cancelling after the current step...",
            Style::default().fg(theme.warning),
        ))
    } else {
        Line::from(vec![
            Span::styled("[q] ", Style::default().fg(theme.accent)),
            Span::styled("Cancel", Style::default().fg(theme.muted)),
        ])
    };

    let help = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use goinst_engine::download::ProgressEvent;
    use goinst_engine::pipeline::Stage;
    use crate::tui::views::render_to_string;

    fn draw(state: &ProgressState) -> String {
        render_to_string(80, 16, |frame| {
            render(frame, frame.area(), &Theme::dark(), state);
        })
    }

    #[test]
    fn shows_busy_description() {
        let screen = draw(&ProgressState::new(SessionState::CheckingDependencies));
        assert!(screen.contains("Checking system dependencies..."));
        assert!(screen.contains("Cancel"));
    }

    #[test]
    fn shows_pipeline_step_and_download() {
        let mut state = ProgressState::new(SessionState::Installing(Stage::Downloading));
        state.apply(ProgressEvent::Started {
            url: "https://go.dev/dl/go.tar.gz".to_string(),
            total: 4096,
        });
        state.apply(ProgressEvent::Progress {
            downloaded: 1024,
            speed: 2048,
        });

        let screen = draw(&state);
        assert!(screen.contains("Downloading Go archive..."));
        assert!(screen.contains("Step 1 of 5"));
        assert!(screen.contains("1.00 KB / 4.00 KB"));
    }

    #[test]
    fn shows_cancelling_notice() {
        let mut state = ProgressState::new(SessionState::Installing(Stage::Extracting));
        state.cancelling = true;
        assert!(draw(&state).contains("Cancelling after the current step..."));
    }
}
