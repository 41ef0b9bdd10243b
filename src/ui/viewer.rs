// File viewer rendering.
// Shows the selected file with line numbers.

use ratatui::{prelude::*, widgets::*};

use crate::state::{FileView, LoadingState};

use super::tree::{pane_block, render_empty, render_error, render_loading};

/// Render the content of the selected file.
pub fn render_viewer(
    frame: &mut Frame,
    content: &LoadingState<FileView>,
    size: Option<u64>,
    scroll: u16,
    area: Rect,
    focused: bool,
) {
    match content {
        LoadingState::Idle => render_empty(
            frame,
            area,
            pane_block(" Viewer ".to_string(), focused),
            "Select a file to view",
        ),
        LoadingState::Loading => render_loading(
            frame,
            area,
            pane_block(" Viewer ".to_string(), focused),
            "Loading file",
        ),
        LoadingState::Error(e) => {
            render_error(frame, area, pane_block(" Viewer ".to_string(), focused), e)
        }
        LoadingState::Loaded(view) => {
            let line_count = view.content.lines().count();
            let first = scroll as usize;
            let last = (first + area.height.saturating_sub(2) as usize).min(line_count);
            let title = match size {
                Some(bytes) => format!(
                    " {} ({} bytes) [{}-{}/{}] ",
                    view.path,
                    bytes,
                    first + 1,
                    last,
                    line_count
                ),
                None => format!(" {} [{}-{}/{}] ", view.path, first + 1, last, line_count),
            };

            let numbered_lines: Vec<Line> = view
                .content
                .lines()
                .enumerate()
                .map(|(i, line)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>6} │ ", i + 1),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(line),
                    ])
                })
                .collect();

            let text = Paragraph::new(numbered_lines)
                .block(pane_block(title, focused))
                .scroll((scroll, 0));
            frame.render_widget(text, area);
        }
    }
}
