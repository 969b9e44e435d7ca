use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, ToastKind};
use crate::models::Grade;

use super::styles;
use super::tabs::lessons;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Grade tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_grade_tabs(frame, app, chunks[1]);
    lessons::render(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::Searching) {
        render_search_overlay(frame, app);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingReset) {
        render_reset_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  QLA Mathematics";
    let mode = if app.offline_mode { "[offline] " } else { "" };
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub((title.len() + mode.len() + help_hint.len() + 4) as u16)
                as usize,
        )),
        Span::styled(mode, styles::error_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_grade_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        ("[g] Grade 7", app.grade == Grade::Seven),
        ("[g] Grade 8", app.grade == Grade::Eight),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[/] search | [m]ark | [x] bookmark | [e]xport | [q]uit";

    let (left_text, left_style) = match app.toast {
        Some(ref toast) => {
            let style = match toast.kind {
                ToastKind::Info => styles::muted_style(),
                ToastKind::Success => styles::success_style(),
                ToastKind::Error => styles::error_style(),
            };
            (format!(" {} ", toast.text), style)
        }
        None => {
            let stats = app.stats();
            (
                format!(
                    " {} | {}/{} completed ",
                    app.grade.title(),
                    stats.completed,
                    stats.total
                ),
                styles::muted_style(),
            )
        }
    };

    let right_text = format!(" {} ", shortcuts);
    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_search_overlay(frame: &mut Frame, app: &App) {
    let height = (app.search_results.len() as u16 + 5).clamp(5, 18);
    let area = centered_rect_fixed(62, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(vec![
        Span::styled(" Search: ", styles::muted_style()),
        Span::styled(app.search_query.as_str(), styles::search_style()),
        Span::styled("▌", styles::search_style()),
    ])];
    lines.push(Line::from(""));

    if app.search_results.is_empty() {
        let hint = if app.search_query.trim().is_empty() {
            " Type to search lessons by title, unit, or keyword"
        } else {
            " No matches"
        };
        lines.push(Line::from(Span::styled(hint, styles::muted_style())));
    } else {
        for (i, entry) in app.search_results.iter().enumerate() {
            let style = if i == app.search_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<44}", crate::utils::truncate_string(entry.title, 42)),
                    style,
                ),
                Span::styled(format!(" U{}", entry.unit_index + 1), styles::muted_style()),
            ]));
        }
    }

    let block = Block::default()
        .title(" Find a lesson ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 24, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            "        ╔═╗ ╦  ╔═╗  ╔╦╗╔═╗╔╦╗╦ ╦╔═╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ║═╬╗║  ╠═╣  ║║║╠═╣ ║ ╠═╣╚═╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ╚═╝╚╩═╝╩ ╩  ╩ ╩╩ ╩ ╩ ╩ ╩╚═╝",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Move through the lesson list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  PgUp/PgDn ", styles::help_key_style()),
            Span::styled("Scroll a page at a time", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  g         ", styles::help_key_style()),
            Span::styled("Switch between Grade 7 and 8", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Open lesson (caches for offline)", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  /         ", styles::help_key_style()),
            Span::styled("Search lessons", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  m         ", styles::help_key_style()),
            Span::styled("Cycle lesson status", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  x         ", styles::help_key_style()),
            Span::styled("Toggle bookmark", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  b         ", styles::help_key_style()),
            Span::styled("Show bookmarks only", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  e         ", styles::help_key_style()),
            Span::styled("Export progress data", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Reset all progress", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  C         ", styles::help_key_style()),
            Span::styled("Clear the offline cache", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_reset_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 9, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Reset all lesson progress?",
            styles::highlight_style(),
        )),
        Line::from(Span::styled(
            "   This cannot be undone. Bookmarks are kept.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to reset, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
