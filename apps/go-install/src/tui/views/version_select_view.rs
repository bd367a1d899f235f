//! Version picker.
//!
//! Rows without an archive for the host are drawn muted and cannot be
//! highlighted. Typing filters the list.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::state::PickerState;
use crate::tui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, theme: &Theme, state: &PickerState) {
    let notice_height = if state.notice.is_some() { 3 } else { 0 };
    let chunks = Layout::vertical([
        Constraint::Length(notice_height),
        Constraint::Length(3), // Filter
        Constraint::Min(4),    // Versions
        Constraint::Length(3), // Help
    ])
    .split(area);

    if let Some(notice) = &state.notice {
        let widget = Paragraph::new(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(theme.warning),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
        frame.render_widget(widget, chunks[0]);
    }

    let filter = Paragraph::new(Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(theme.muted)),
        Span::styled(state.filter.as_str(), Style::default().fg(theme.text)),
        Span::styled("_", Style::default().fg(theme.accent)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(filter, chunks[1]);

    render_list(frame, chunks[2], theme, state);
    render_help(frame, chunks[3], theme);
}

fn render_list(frame: &mut Frame, area: Rect, theme: &Theme, state: &PickerState) {
    // Two rows go to the border.
    let rows = usize::from(area.height.saturating_sub(2)).max(1);
    let first = state.selected.saturating_sub(rows - 1);

    let lines: Vec<Line> = if state.visible.is_empty() {
        vec![Line::from(Span::styled(
            "  No matching versions.",
            Style::default().fg(theme.muted),
        ))]
    } else {
        state
            .visible
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .map(|(pos, &index)| {
                let choice = &state.choices[index];
                let highlighted = pos == state.selected && choice.available;
                let style = if !choice.available {
                    Style::default().fg(theme.muted)
                } else if highlighted {
                    Style::default()
                        .fg(theme.selected)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                let marker = if highlighted { "> " } else { "  " };
                let mut spans = vec![
                    Span::styled(marker, style),
                    Span::styled(format!("{:<14}", choice.version), style),
                    Span::styled(choice.description(), Style::default().fg(theme.muted)),
                ];
                if !choice.available {
                    spans.push(Span::styled(
                        format!("  (no {} archive)", state.target),
                        Style::default().fg(theme.muted),
                    ));
                }
                Line::from(spans)
            })
            .collect()
    };

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(" Select Go Version ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(list, area);
}

fn render_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let key = Style::default().fg(theme.accent);
    let text = Style::default().fg(theme.muted);
    let help = Paragraph::new(Line::from(vec![
        Span::styled("[Up/Down] ", key),
        Span::styled("Navigate", text),
        Span::raw("  "),
        Span::styled("[Enter] ", key),
        Span::styled("Install", text),
        Span::raw("  "),
        Span::styled("[Type] ", key),
        Span::styled("Filter", text),
        Span::raw("  "),
        Span::styled("[Esc] ", key),
        Span::styled("Clear filter / Quit", text),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(help, area);
}
