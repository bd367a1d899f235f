//! Yes/no confirmation screen.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::state::ConfirmState;
use crate::tui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, state: &ConfirmState) {
    let chunks = Layout::vertical([Constraint::Min(5), Constraint::Length(3)]).split(area);

    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(state.lines.iter().map(|line| {
        Line::from(Span::styled(
            format!("  {line}"),
            Style::default().fg(theme.text),
        ))
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", state.question),
        Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
    )));

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(format!(" {} ", state.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(body, chunks[0]);

    let key = Style::default().fg(theme.accent);
    let text = Style::default().fg(theme.muted);
    let help = Paragraph::new(Line::from(vec![
        Span::styled("[y] ", key),
        Span::styled("Yes", text),
        Span::raw("  "),
        Span::styled("[n] ", key),
        Span::styled("No", text),
        Span::raw("  "),
        Span::styled("[q] ", key),
        Span::styled("Quit", text),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(help, chunks[1]);
}
