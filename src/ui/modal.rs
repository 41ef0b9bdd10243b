// Modal UI components.
// Branch picker and repository prompt drawn over the main view.

use ratatui::{prelude::*, widgets::*};

use crate::github::Branch;
use crate::state::LoadingState;

/// Draw the branch picker on top of the current view.
pub fn draw_branch_modal(
    frame: &mut Frame,
    branches: &LoadingState<Vec<Branch>>,
    current: &str,
    selection: usize,
) {
    let area = frame.area();

    // Create centered modal
    let modal_width = 60.min(area.width);
    let modal_height = 18.min(area.height);
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Branch list
            Constraint::Length(1), // Instructions
        ])
        .split(modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Switch Branch ");

    let message = match branches {
        LoadingState::Idle | LoadingState::Loading => {
            Some(("⏳ Loading branches...".to_string(), Color::Yellow))
        }
        LoadingState::Error(e) => Some((format!("❌ {}", e), Color::Red)),
        LoadingState::Loaded(list) if list.is_empty() => {
            Some(("No branches found".to_string(), Color::DarkGray))
        }
        LoadingState::Loaded(_) => None,
    };

    if let Some((text, color)) = message {
        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .block(block);
        frame.render_widget(widget, chunks[0]);
    } else if let LoadingState::Loaded(list) = branches {
        let items: Vec<ListItem> = list
            .iter()
            .map(|branch| {
                let marker = if branch.name == current { "● " } else { "  " };
                let sha: String = branch.commit_identity().chars().take(7).collect();
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::styled(branch.name.as_str(), Style::default().fg(Color::White)),
                    Span::styled(format!("  {}", sha), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(selection));

        let list_widget = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list_widget, chunks[0], &mut list_state);
    }

    // Instructions
    let instructions = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" = Switch  ", Style::default().fg(Color::DarkGray)),
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::styled(" = Navigate  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
    ]);

    let instructions_widget = Paragraph::new(instructions)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[1]);
}

/// Draw the open-repository prompt with the text typed so far.
pub fn draw_repo_modal(frame: &mut Frame, input: &str, error: Option<&str>) {
    let area = frame.area();

    let modal_width = 60.min(area.width);
    let modal_height = 6.min(area.height);
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Min(1),    // Validation error
            Constraint::Length(1), // Instructions
        ])
        .split(modal_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Open Repository ");

    let input_line = Line::from(vec![
        Span::styled("Repository: ", Style::default().fg(Color::DarkGray)),
        Span::raw(input),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(input_line).block(input_block), chunks[0]);

    let (text, color) = match error {
        Some(e) => (format!(" ❌ {}", e), Color::Red),
        None => (" owner/name or a github.com URL".to_string(), Color::DarkGray),
    };
    let hint = Paragraph::new(text)
        .style(Style::default().fg(color).bg(Color::Black))
        .wrap(Wrap { trim: true });
    frame.render_widget(hint, chunks[1]);

    let instructions = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" = Open  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
    ]);
    let instructions_widget = Paragraph::new(instructions)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[2]);
}
