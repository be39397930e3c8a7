// Analytics view: totals, top languages, top repos, recent activity
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};
use repolens_core::AnalyticsSnapshot;

use crate::app::format_count;
use crate::ui::palette;
use crate::{AnalyticsState, App};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    match &app.analytics {
        AnalyticsState::Idle | AnalyticsState::Loading => {
            let loading = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Loading your analytics...",
                    Style::default().fg(colors.muted),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Analytics "));
            frame.render_widget(loading, area);
        }
        AnalyticsState::Failed(message) => {
            let failed = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(colors.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(colors.muted),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Analytics "));
            frame.render_widget(failed, area);
        }
        AnalyticsState::Ready(snapshot) => render_snapshot(frame, app, snapshot, area),
    }
}

fn render_snapshot(frame: &mut Frame, app: &App, snapshot: &AnalyticsSnapshot, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Profile line
            Constraint::Length(4), // Totals
            Constraint::Min(7),    // Languages + top repos
            Constraint::Length(4), // Activity + visibility
        ])
        .split(area);

    render_profile(frame, app, chunks[0]);
    render_totals(frame, app, snapshot, chunks[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    render_languages(frame, app, snapshot, middle[0]);
    render_top_repos(frame, app, snapshot, middle[1]);

    render_activity(frame, app, snapshot, chunks[3]);
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);

    let line = match &app.session {
        Some(session) => Line::from(vec![
            Span::styled(
                session.user.display_name().to_string(),
                Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  @{} · GitHub Analytics", session.user.login),
                Style::default().fg(colors.muted),
            ),
        ]),
        None => Line::from(Span::styled(
            "GitHub Analytics",
            Style::default().fg(colors.text),
        )),
    };

    let profile = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(profile, area);
}

fn render_totals(frame: &mut Frame, app: &App, snapshot: &AnalyticsSnapshot, area: Rect) {
    let colors = palette(app.theme);

    let cells = [
        ("Repositories", format_count(snapshot.total_repos as u64)),
        ("Total Stars", format_count(snapshot.total_stars)),
        ("Total Forks", format_count(snapshot.total_forks)),
        ("Recent Commits", format_count(snapshot.total_commits as u64)),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    for ((label, value), column) in cells.iter().zip(columns.iter()) {
        let cell = Paragraph::new(vec![
            Line::from(Span::styled(
                value.clone(),
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                label.to_string(),
                Style::default().fg(colors.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(cell, *column);
    }
}

fn render_languages(frame: &mut Frame, app: &App, snapshot: &AnalyticsSnapshot, area: Rect) {
    let colors = palette(app.theme);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Top Languages ")
        .border_style(Style::default().fg(colors.muted));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if snapshot.top_languages.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No language data",
            Style::default().fg(colors.muted),
        ));
        frame.render_widget(empty, inner);
        return;
    }

    // One gauge row per language, capped by available height
    let rows: Vec<Constraint> = snapshot
        .top_languages
        .iter()
        .map(|_| Constraint::Length(1))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(inner);

    for (entry, row) in snapshot.top_languages.iter().zip(rows.iter()) {
        let pct = entry.percentage(snapshot.total_repos);
        let gauge = Gauge::default()
            .ratio((pct / 100.0).clamp(0.0, 1.0))
            .label(format!(
                "{} · {} repos ({:.1}%)",
                entry.language, entry.count, pct
            ))
            .gauge_style(Style::default().fg(colors.accent).bg(colors.highlight));
        frame.render_widget(gauge, *row);
    }
}

fn render_top_repos(frame: &mut Frame, app: &App, snapshot: &AnalyticsSnapshot, area: Rect) {
    let colors = palette(app.theme);

    let items: Vec<ListItem> = snapshot
        .top_repos
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("#{} ", i + 1),
                    Style::default().fg(colors.muted).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    repo.name().to_string(),
                    Style::default().fg(colors.accent),
                ),
                Span::styled(
                    format!("  ★ {}", format_count(repo.stars as u64)),
                    Style::default().fg(colors.star),
                ),
                Span::styled(
                    format!("  ⑂ {}", format_count(repo.forks as u64)),
                    Style::default().fg(colors.success),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Top Repositories ")
            .border_style(Style::default().fg(colors.muted)),
    );
    frame.render_widget(list, area);
}

fn render_activity(frame: &mut Frame, app: &App, snapshot: &AnalyticsSnapshot, area: Rect) {
    let colors = palette(app.theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let activity = Paragraph::new(vec![
        Line::from(Span::styled(
            format_count(snapshot.active_day_count as u64),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Active days this month",
            Style::default().fg(colors.muted),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Activity (Last 30 Days) ")
            .border_style(Style::default().fg(colors.muted)),
    );
    frame.render_widget(activity, columns[0]);

    let visibility = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Public: ", Style::default().fg(colors.muted)),
            Span::styled(
                format_count(snapshot.public_repo_count as u64),
                Style::default().fg(colors.success),
            ),
        ]),
        Line::from(vec![
            Span::styled("Private: ", Style::default().fg(colors.muted)),
            Span::styled(
                format_count(snapshot.private_repo_count as u64),
                Style::default().fg(colors.text),
            ),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Repository Breakdown ")
            .border_style(Style::default().fg(colors.muted)),
    );
    frame.render_widget(visibility, columns[1]);
}
