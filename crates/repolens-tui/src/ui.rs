// UI rendering logic
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use repolens_core::{RepositorySummary, Theme};

use crate::{
    analytics_ui, app::format_count, help_ui, saved_ui, share_ui, App, InputMode, View,
};

/// Small palette so the light theme isn't an afterthought
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight: Color,
    pub error: Color,
    pub success: Color,
    pub star: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: Color::Cyan,
            text: Color::White,
            muted: Color::Gray,
            highlight: Color::Rgb(68, 71, 90),
            error: Color::Red,
            success: Color::Green,
            star: Color::Yellow,
        },
        Theme::Light => Palette {
            accent: Color::Blue,
            text: Color::Black,
            muted: Color::DarkGray,
            highlight: Color::Rgb(210, 220, 240),
            error: Color::Red,
            success: Color::Rgb(0, 128, 0),
            star: Color::Rgb(160, 120, 0),
        },
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with view tabs
            Constraint::Min(5),    // Active view
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.view {
        View::Search => render_search_view(frame, app, chunks[1]),
        View::Saved => saved_ui::render(frame, app, chunks[1]),
        View::Analytics => analytics_ui::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    // Popups last so they draw on top
    if app.show_share {
        share_ui::render(frame, app, frame.area());
    }
    if app.input_mode == InputMode::ConfirmingClear {
        saved_ui::render_confirm_modal(frame, app, frame.area());
    }
    if app.show_help {
        help_ui::render(frame, app, frame.area());
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Min(30),
            Constraint::Length(30),
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(Span::styled(
        "🔭 RepoLens",
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(logo, header_chunks[0]);

    // View tabs with the saved count badge
    let mut tab_spans = Vec::new();
    for (i, view) in [View::Search, View::Saved, View::Analytics].iter().enumerate() {
        let label = match view {
            View::Saved => format!(" [{}] {} ({}) ", i + 1, view.title(), app.saved_count),
            _ => format!(" [{}] {} ", i + 1, view.title()),
        };
        let style = if *view == app.view {
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.muted)
        };
        tab_spans.push(Span::styled(label, style));
    }
    let tabs = Paragraph::new(Line::from(tab_spans))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, header_chunks[1]);

    // Right: who's signed in
    let account = match &app.session {
        Some(session) => Line::from(vec![
            Span::styled("@", Style::default().fg(colors.muted)),
            Span::styled(
                session.user.login.clone(),
                Style::default().fg(colors.success),
            ),
        ]),
        None => Line::from(Span::styled(
            "not signed in",
            Style::default().fg(colors.muted),
        )),
    };
    let account = Paragraph::new(account)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(account, header_chunks[2]);
}

fn render_search_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let constraints = if app.show_filters {
        vec![
            Constraint::Length(3), // Search input
            Constraint::Length(6), // Filter panel
            Constraint::Min(5),    // Results
        ]
    } else {
        vec![Constraint::Length(3), Constraint::Min(5)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_search_input(frame, app, chunks[0]);

    let results_area = if app.show_filters {
        render_filter_panel(frame, app, chunks[1]);
        chunks[2]
    } else {
        chunks[1]
    };

    // Results list on the left, detail pane on the right
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(results_area);

    render_results_list(frame, app, content[0]);
    render_detail_pane(frame, app, content[1]);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    let border_style = if app.input_mode == InputMode::Searching {
        Style::default().fg(colors.accent)
    } else {
        Style::default().fg(colors.muted)
    };

    let hint = if app.input_mode == InputMode::Searching {
        " Search (Enter to submit, Esc to cancel) "
    } else {
        " Search (press / to edit) "
    };

    let input = Paragraph::new(app.search_input.as_str())
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(hint)
                .border_style(border_style),
        );
    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching {
        frame.set_cursor_position((
            area.x + app.search_input.len() as u16 + 1,
            area.y + 1,
        ));
    }
}

fn render_filter_panel(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    let rows = [
        (
            "Language",
            app.filters.language.clone().unwrap_or_else(|| "any".into()),
        ),
        (
            "Min stars",
            app.filters
                .min_stars
                .map(|s| s.to_string())
                .unwrap_or_else(|| "any".into()),
        ),
        ("Sort", app.filters.sort.to_string()),
        ("Order", app.filters.order.to_string()),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let selected = matches!(
                app.input_mode,
                InputMode::Filtering | InputMode::EditingFilter
            ) && i == app.filter_cursor;
            let marker = if selected { "▶ " } else { "  " };
            let value_span = if selected && app.input_mode == InputMode::EditingFilter {
                Span::styled(
                    format!("{}_", app.filter_edit_buffer),
                    Style::default().fg(colors.accent),
                )
            } else {
                Span::styled(value.clone(), Style::default().fg(colors.text))
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(colors.accent)),
                Span::styled(format!("{:<10}", label), Style::default().fg(colors.muted)),
                value_span,
            ])
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filters (Enter: edit/cycle, d: reset, Esc: close) ")
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(panel, area);
}

fn render_results_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let colors = palette(app.theme);

    let title = if app.has_searched && !app.loading && !app.results.items.is_empty() {
        format!(
            " {} · Page {}/{} ",
            app.found_message(),
            app.page,
            app.total_pages()
        )
    } else {
        " Results ".to_string()
    };

    if app.loading {
        let spinner = Paragraph::new("Searching repositories...")
            .style(Style::default().fg(colors.muted))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(spinner, area);
        return;
    }

    if let Some(error) = &app.error_message {
        let alert = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                error.clone(),
                Style::default().fg(colors.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press e to dismiss",
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Results "));
        frame.render_widget(alert, area);
        return;
    }

    if !app.has_searched {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Search GitHub repositories",
                Style::default().fg(colors.text),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press / and type a query to get started",
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Results "));
        frame.render_widget(empty, area);
        return;
    }

    if app.results.items.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No repositories found. Try a different query or loosen the filters.",
            Style::default().fg(colors.muted),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Results "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .results
        .items
        .iter()
        .map(|repo| result_list_item(repo, app.saved_ids.contains(&repo.id), &colors))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors.muted)),
        )
        .highlight_style(
            Style::default()
                .bg(colors.highlight)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

pub fn result_list_item<'a>(
    repo: &'a RepositorySummary,
    saved: bool,
    colors: &Palette,
) -> ListItem<'a> {
    let bookmark = if saved { "🔖 " } else { "   " };
    let mut stat_spans = vec![
        Span::raw("   "),
        Span::styled("★ ", Style::default().fg(colors.star)),
        Span::styled(
            format_count(repo.stars as u64),
            Style::default().fg(colors.star),
        ),
        Span::styled("  ⑂ ", Style::default().fg(colors.success)),
        Span::styled(
            format_count(repo.forks as u64),
            Style::default().fg(colors.success),
        ),
    ];
    if let Some(language) = &repo.language {
        stat_spans.push(Span::styled(
            format!("  {}", language),
            Style::default().fg(colors.accent),
        ));
    }
    stat_spans.push(Span::styled(
        format!("  Updated {}", relative_date(repo.updated_at)),
        Style::default().fg(colors.muted),
    ));

    ListItem::new(vec![
        Line::from(vec![
            Span::raw(bookmark),
            Span::styled(
                repo.full_name.as_str(),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(stat_spans),
        Line::from(""),
    ])
}

fn render_detail_pane(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);
    let mut lines = Vec::new();

    if let Some(repo) = app.selected_repository() {
        lines.push(Line::from(Span::styled(
            repo.full_name.clone(),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("by {}", repo.owner.login),
            Style::default().fg(colors.muted),
        )));
        lines.push(Line::from(""));

        if let Some(description) = &repo.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(colors.text),
            )));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![
            Span::styled("Stars: ", Style::default().fg(colors.muted)),
            Span::styled(
                format_count(repo.stars as u64),
                Style::default().fg(colors.star),
            ),
            Span::styled("   Forks: ", Style::default().fg(colors.muted)),
            Span::styled(
                format_count(repo.forks as u64),
                Style::default().fg(colors.success),
            ),
        ]));

        if let Some(language) = &repo.language {
            lines.push(Line::from(vec![
                Span::styled("Language: ", Style::default().fg(colors.muted)),
                Span::styled(language.clone(), Style::default().fg(colors.accent)),
            ]));
        }

        lines.push(Line::from(vec![
            Span::styled("Updated: ", Style::default().fg(colors.muted)),
            Span::styled(
                relative_date(repo.updated_at),
                Style::default().fg(colors.text),
            ),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            repo.html_url.clone(),
            Style::default().fg(colors.muted).add_modifier(Modifier::UNDERLINED),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: open in browser   b: save/unsave",
            Style::default().fg(colors.muted),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Nothing selected",
            Style::default().fg(colors.muted),
        )));
    }

    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Details ")
                .border_style(Style::default().fg(colors.muted)),
        );
    frame.render_widget(detail, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    let text = if let Some(status) = &app.status_message {
        status.clone()
    } else {
        match app.input_mode {
            InputMode::Searching => "Enter: search  Esc: cancel".to_string(),
            InputMode::Filtering => {
                "j/k: field  Enter: edit/cycle  d: reset  Esc: close".to_string()
            }
            InputMode::EditingFilter => "Enter: apply  Esc: cancel".to_string(),
            InputMode::EnteringInvite => "Enter: send invite  Esc: cancel".to_string(),
            InputMode::ConfirmingClear => "y: confirm  n: cancel".to_string(),
            InputMode::Normal => match app.view {
                View::Search => {
                    "/: search  f: filters  s: sort  o: order  n/p: page  b: save  ?: help"
                        .to_string()
                }
                View::Saved => {
                    "s: sort  l: language  d: remove  C: clear all  ?: help".to_string()
                }
                View::Analytics => "r: refresh  S: share & invite  ?: help".to_string(),
            },
        }
    };

    let bar = Paragraph::new(Span::styled(text, Style::default().fg(colors.muted)));
    frame.render_widget(bar, area);
}

/// Rough "Updated 3 days ago" wording for repo cards
pub fn relative_date(date: DateTime<Utc>) -> String {
    let days = (Utc::now() - date).num_days();
    match days {
        i64::MIN..=0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=29 => format!("{} days ago", days),
        30..=364 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}

/// Centered popup helper shared by the modal renderers
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_date_wording() {
        let now = Utc::now();
        assert_eq!(relative_date(now), "today");
        assert_eq!(relative_date(now - Duration::days(1)), "yesterday");
        assert_eq!(relative_date(now - Duration::days(10)), "10 days ago");
        assert_eq!(relative_date(now - Duration::days(90)), "3 months ago");
        assert_eq!(relative_date(now - Duration::days(800)), "2 years ago");
    }
}
