//! Final result screen.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::report::{Summary, Tone};
use crate::tui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, summary: &Summary) {
    let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).split(area);

    let (title, color) = match summary.tone {
        Tone::Success => (" Done ", theme.success),
        Tone::Warning => (" Finished ", theme.warning),
        Tone::Error => (" Failed ", theme.error),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", summary.headline),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ];
    if !summary.details.is_empty() {
        lines.push(Line::from(""));
        lines.extend(summary.details.iter().map(|detail| {
            Line::from(Span::styled(
                format!("  {detail}"),
                Style::default().fg(theme.text),
            ))
        }));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(body, chunks[0]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("[Enter] ", Style::default().fg(theme.accent)),
        Span::styled("Exit", Style::default().fg(theme.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::views::render_to_string;

    #[test]
    fn shows_headline_and_details() {
        let summary = Summary {
            tone: Tone::Success,
            headline: "Successfully installed go1.22.1 to /usr/local/go".to_string(),
            details: vec!["Restart your terminal or run: source /root/.bashrc".to_string()],
        };
        let screen = render_to_string(90, 12, |frame| {
            render(frame, frame.area(), &Theme::dark(), &summary);
        });
        assert!(screen.contains("Done"));
        assert!(screen.contains("Successfully installed go1.22.1 to /usr/local/go"));
        assert!(screen.contains("source /root/.bashrc"));
    }

    #[test]
    fn failure_uses_failed_title() {
        let summary = Summary {
            tone: Tone::Error,
            headline: "Error: network error: connection refused".to_string(),
            details: Vec::new(),
        };
        let screen = render_to_string(60, 10, |frame| {
            render(frame, frame.area(), &Theme::dark(), &summary);
        });
        assert!(screen.contains("Failed"));
        assert!(screen.contains("connection refused"));
    }
}
