// Tree pane rendering.
// Indented folder/file rows with loading, error, and empty states.

use ratatui::{prelude::*, widgets::*};

use crate::state::{ExplorerState, LoadingState};
use crate::tree::VisibleRow;

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, block: Block, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(block);
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, block: Block, error: &str) {
    let text = Paragraph::new(format!("❌ {}", error))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, block: Block, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(text, area);
}

/// Border color for a pane, highlighted when it has focus.
pub fn pane_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn row_item(row: &VisibleRow, viewing: Option<&str>) -> ListItem<'static> {
    let indent = "  ".repeat(row.depth);
    let (icon, mut style) = match (row.is_directory(), row.expanded) {
        (true, true) => ("📂", Style::default().fg(Color::Cyan)),
        (true, false) => ("📁", Style::default().fg(Color::Cyan)),
        (false, _) => ("📄", Style::default()),
    };
    if viewing == Some(row.path.as_str()) {
        style = style.fg(Color::Green).add_modifier(Modifier::UNDERLINED);
    }

    ListItem::new(Line::from(vec![
        Span::raw(format!("{}{} ", indent, icon)),
        Span::styled(row.name.clone(), style),
    ]))
}

/// Render the repository tree.
pub fn render_tree<T>(
    frame: &mut Frame,
    structure: &LoadingState<T>,
    explorer: &mut ExplorerState,
    viewing: Option<&str>,
    area: Rect,
    focused: bool,
) {
    let block = pane_block(" Files ".to_string(), focused);

    match structure {
        LoadingState::Idle => render_empty(frame, area, block, "Press r to load"),
        LoadingState::Loading => render_loading(frame, area, block, "Loading structure"),
        LoadingState::Error(e) => render_error(frame, area, block, e),
        LoadingState::Loaded(_) => {
            if explorer.rows().is_empty() {
                render_empty(frame, area, block, "Repository is empty");
                return;
            }

            let items: Vec<ListItem> = explorer
                .rows()
                .iter()
                .map(|row| row_item(row, viewing))
                .collect();
            let list_widget = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");

            frame.render_stateful_widget(list_widget, area, &mut explorer.list_state);
        }
    }
}
