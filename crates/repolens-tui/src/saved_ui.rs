// Saved repositories view
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, Paragraph, Wrap},
    Frame,
};

use crate::ui::{centered_rect, palette, result_list_item};
use crate::App;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let colors = palette(app.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    // Filter bar: language selection and sort mode
    let language_label = app
        .saved_language
        .clone()
        .unwrap_or_else(|| format!("All Languages ({})", app.saved_count));

    let filter_bar = Paragraph::new(Line::from(vec![
        Span::styled("Language: ", Style::default().fg(colors.muted)),
        Span::styled(language_label, Style::default().fg(colors.accent)),
        Span::styled("   Sort: ", Style::default().fg(colors.muted)),
        Span::styled(app.saved_sort.label(), Style::default().fg(colors.accent)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filters (l: language, s: sort) ")
            .border_style(Style::default().fg(colors.muted)),
    );
    frame.render_widget(filter_bar, chunks[0]);

    let title = format!(" 🔖 Saved Repositories ({}) ", app.saved_count);

    if app.saved_count == 0 {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "You haven't saved any repositories yet.",
                Style::default().fg(colors.text),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press b on any search result to save it here!",
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    if app.saved_repos.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No repositories match the selected filters.",
            Style::default().fg(colors.muted),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<_> = app
        .saved_repos
        .iter()
        .map(|repo| result_list_item(repo, true, &colors))
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
    frame.render_stateful_widget(list, chunks[1], &mut app.saved_state);
}

/// Clearing the whole bookmark set is irreversible, so it goes through this
/// modal; Cancel is the no-consequence default.
pub fn render_confirm_modal(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);
    let popup = centered_rect(50, 30, area);

    frame.render_widget(Clear, popup);

    let plural = if app.saved_count == 1 {
        "repository"
    } else {
        "repositories"
    };

    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Remove all {} saved {}?",
                app.saved_count, plural
            ),
            Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This action cannot be undone.",
            Style::default().fg(colors.muted),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(colors.error).add_modifier(Modifier::BOLD)),
            Span::styled("Clear All    ", Style::default().fg(colors.error)),
            Span::styled("[n] ", Style::default().fg(colors.success).add_modifier(Modifier::BOLD)),
            Span::styled("Cancel", Style::default().fg(colors.success)),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Clear All Repositories? ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(colors.error)),
    );

    frame.render_widget(body, popup);
}
