// UI module for rendering the TUI.
// Contains the header, tree pane, file viewer, status bar, and overlays.

mod modal;
mod tree;
mod viewer;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Focus};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if let Some(selection) = app.branch_picker {
        modal::draw_branch_modal(
            frame,
            app.controller.branches(),
            app.controller.branch(),
            selection,
        );
    }

    if let Some(input) = &app.repo_prompt {
        modal::draw_repo_modal(frame, input, app.prompt_error.as_deref());
    }

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the repository, branch, and tree totals.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let repo = app
        .controller
        .repo()
        .map(|repo| repo.to_string())
        .unwrap_or_else(|| "no repository".to_string());

    let mut spans = vec![
        Span::styled(
            " gh-explorer ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(repo, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" @ ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.controller.branch(), Style::default().fg(Color::Green)),
    ];

    let loading = app.controller.structure().is_loading()
        || app.controller.branches().is_loading()
        || app.controller.content().is_loading();
    if loading {
        spans.push(Span::styled("  ⏳", Style::default().fg(Color::Yellow)));
    }

    if app.controller.structure().is_loaded() {
        let counts = app.explorer.counts();
        spans.push(Span::styled(
            format!("  {} files, {} folders", counts.files, counts.directories),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the tree pane and file viewer side by side.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    tree::render_tree(
        frame,
        app.controller.structure(),
        &mut app.explorer,
        app.controller.selected_path(),
        chunks[0],
        app.focus == Focus::Tree,
    );
    let size = app
        .controller
        .selected_path()
        .and_then(|path| app.explorer.tree().find(path))
        .and_then(|node| node.size);
    viewer::render_viewer(
        frame,
        app.controller.content(),
        size,
        app.viewer_scroll,
        chunks[1],
        app.focus == Focus::Viewer,
    );
}

/// Draw the status bar with warnings, keybinding hints, and rate limit.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();

    if let Some(warning) = app.controller.warning() {
        spans.push(Span::styled(
            format!(" ⚠️ {} ", warning),
            Style::default().fg(Color::Yellow),
        ));
    }

    let hints = match app.focus {
        Focus::Tree => vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            Span::raw("  ↵ "),
            Span::styled("Open", Style::default().fg(Color::DarkGray)),
            Span::raw("  ←→ "),
            Span::styled("Fold", Style::default().fg(Color::DarkGray)),
        ],
        Focus::Viewer => vec![
            Span::raw(" ↑↓ "),
            Span::styled("Scroll", Style::default().fg(Color::DarkGray)),
            Span::raw("  PgUp/Dn "),
            Span::styled("Page", Style::default().fg(Color::DarkGray)),
        ],
    };
    spans.extend(hints);
    spans.extend([
        Span::raw("  Tab "),
        Span::styled("Switch", Style::default().fg(Color::DarkGray)),
        Span::raw("  b "),
        Span::styled("Branch", Style::default().fg(Color::DarkGray)),
        Span::raw("  o "),
        Span::styled("Open", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    let rate = &app.rate_limit;
    if rate.limit > 0 {
        let rate_color = if rate.remaining < 100 {
            Color::Red
        } else if rate.remaining < 500 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        spans.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 55.min(area.width);
    let popup_height = 20.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Move selection / scroll file"),
        key("  Enter/Space   ", "Open folder or file"),
        key("  →/l           ", "Expand folder"),
        key("  ←/h           ", "Collapse folder / go to parent"),
        key("  C             ", "Collapse all folders"),
        key("  Tab           ", "Switch between tree and viewer"),
        key("  PgUp/Dn ^u/^d ", "Page scroll (viewer)"),
        key("  Home/End g/G  ", "Jump to start/end"),
        key("  b             ", "Switch branch"),
        key("  o             ", "Open another repository"),
        key("  r             ", "Refresh from GitHub"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
