//! Screen rendering modules.
//!
//! Each view is a `render(frame, area, theme, state)` function with no state
//! of its own.

pub mod confirm_view;
pub mod progress_view;
pub mod summary_view;
pub mod version_select_view;

/// Draws with `draw` on an off-screen terminal and returns the buffer's text,
/// one line per row.
#[cfg(test)]
pub(crate) fn render_to_string(
    width: u16,
    height: u16,
    draw: impl FnOnce(&mut ratatui::Frame),
) -> String {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(draw).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .chunks(usize::from(width))
        .map(|row| row.iter().map(ratatui::buffer::Cell::symbol).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
