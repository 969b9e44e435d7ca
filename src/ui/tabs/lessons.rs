use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, FilterMode};
use crate::models::{Availability, LessonStatus};
use crate::ui::styles;
use crate::utils::{format_ms_date, truncate_string};

/// Render the lesson catalog: table on the left, detail and stats on the
/// right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_lesson_table(frame, app, chunks[0]);
    render_side_panel(frame, app, chunks[1]);
}

fn status_glyph(status: LessonStatus) -> (&'static str, ratatui::style::Style) {
    match status {
        LessonStatus::NotStarted => ("·", styles::muted_style()),
        LessonStatus::InProgress => ("◐", styles::in_progress_style()),
        LessonStatus::Completed => ("●", styles::completed_style()),
    }
}

fn render_lesson_table(frame: &mut Frame, app: &App, area: Rect) {
    let lessons = app.visible_lessons();

    let header = Row::new([
        Cell::from(" "),
        Cell::from(" "),
        Cell::from("#"),
        Cell::from("Lesson"),
        Cell::from("Unit"),
        Cell::from("Availability"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = lessons
        .iter()
        .map(|lesson| {
            let record = app.store.get(&lesson.id);
            let (glyph, glyph_style) = status_glyph(record.status);
            let bookmark = if app.store.is_bookmarked(&lesson.id) {
                "★"
            } else {
                " "
            };
            let availability = app.availability_of(&lesson.id);

            let base_style = if availability == Availability::ComingSoon {
                styles::coming_soon_style()
            } else {
                styles::list_item_style()
            };

            // Lesson number out of the identifier, e.g. "grade7-lesson-12"
            let number = lesson
                .id
                .rsplit('-')
                .next()
                .unwrap_or("?");

            Row::new(vec![
                Cell::from(Span::styled(glyph, glyph_style)),
                Cell::from(Span::styled(bookmark, styles::bookmark_style())),
                Cell::from(format!("{:>2}", number)),
                Cell::from(truncate_string(lesson.title, 48)),
                Cell::from(format!("U{}", lesson.unit_index + 1)),
                Cell::from(availability.label()),
            ])
            .style(base_style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Fill(4),
        Constraint::Length(4),
        Constraint::Length(12),
    ];

    let filter_tag = match app.filter_mode {
        FilterMode::All => "",
        FilterMode::Bookmarked => " [bookmarks]",
    };
    let title = format!(
        " {} Lessons ({}){} ",
        app.grade.title(),
        lessons.len(),
        filter_tag
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !lessons.is_empty() {
        state.select(Some(app.selection.min(lessons.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_side_panel(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(8)])
        .split(area);

    render_stats(frame, app, chunks[0]);
    render_lesson_detail(frame, app, chunks[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.stats();
    let ratio = if stats.total > 0 {
        stats.completed as f64 / stats.total as f64
    } else {
        0.0
    };

    let block = Block::default()
        .title(" Progress ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(3)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(styles::completed_style())
        .ratio(ratio)
        .label(format!("{}/{} completed", stats.completed, stats.total));
    frame.render_widget(gauge, chunks[0]);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  In progress: ", styles::muted_style()),
            Span::styled(stats.in_progress.to_string(), styles::in_progress_style()),
            Span::styled("   Bookmarked: ", styles::muted_style()),
            Span::styled(stats.bookmarked.to_string(), styles::bookmark_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), chunks[2]);
}

fn render_lesson_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_lesson() {
        Some(lesson) => {
            let record = app.store.get(&lesson.id);
            let availability = app.availability_of(&lesson.id);
            let (glyph, glyph_style) = status_glyph(record.status);

            let mut lines = vec![
                Line::from(Span::styled(lesson.title, styles::title_style())),
                Line::from(Span::styled(lesson.unit_name, styles::muted_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Status:       ", styles::muted_style()),
                    Span::styled(glyph, glyph_style),
                    Span::raw(" "),
                    Span::raw(record.status.label()),
                ]),
                Line::from(vec![
                    Span::styled("Availability: ", styles::muted_style()),
                    match availability {
                        Availability::Open => Span::styled("Open", styles::success_style()),
                        Availability::ComingSoon => {
                            Span::styled("Coming Soon", styles::coming_soon_style())
                        }
                        Availability::Checking => {
                            Span::styled("Checking...", styles::muted_style())
                        }
                    },
                ]),
                Line::from(vec![
                    Span::styled("Bookmarked:   ", styles::muted_style()),
                    if app.store.is_bookmarked(&lesson.id) {
                        Span::styled("★ yes", styles::bookmark_style())
                    } else {
                        Span::raw("no")
                    },
                ]),
            ];

            if record.status != LessonStatus::NotStarted {
                lines.push(Line::from(vec![
                    Span::styled("Last updated: ", styles::muted_style()),
                    Span::raw(format_ms_date(record.timestamp)),
                ]));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(&*lesson.href, styles::muted_style())));
            lines
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No lessons match the current filter.",
                styles::muted_style(),
            )),
            Line::from(Span::styled(
                "  Press [b] to show all lessons.",
                styles::muted_style(),
            )),
        ],
    };

    let paragraph = Paragraph::new(content)
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .title(" Lesson ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        );
    frame.render_widget(paragraph, area);
}
