// Keybindings help popup
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::{centered_rect, palette};
use crate::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);
    let popup = centered_rect(70, 80, area);

    frame.render_widget(Clear, popup);

    let section = |title: &str| {
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
        ))
    };
    let key = |k: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(colors.star)),
            Span::styled(what.to_string(), Style::default().fg(colors.text)),
        ])
    };

    let lines = vec![
        section("Global"),
        key("1/2/3", "Switch to Search / Saved / Analytics"),
        key("Tab", "Next view"),
        key("T", "Toggle light/dark theme"),
        key("?", "This help"),
        key("q", "Quit"),
        Line::from(""),
        section("Search"),
        key("/", "Edit the query, Enter submits"),
        key("f", "Filter panel (language, min stars, sort, order)"),
        key("s", "Quick sort: cycle field, descending"),
        key("o", "Flip sort order"),
        key("n / p", "Next / previous page"),
        key("j / k", "Move selection"),
        key("b", "Save or unsave the selected repository"),
        key("Enter", "Open the selected repository in the browser"),
        key("e", "Dismiss the error message"),
        Line::from(""),
        section("Saved"),
        key("s", "Cycle sort mode"),
        key("l", "Cycle language filter"),
        key("d", "Remove the selected repository"),
        key("C", "Clear all (asks for confirmation)"),
        Line::from(""),
        section("Analytics"),
        key("r", "Recompute the snapshot"),
        key("S", "Share & invite panel"),
        key("1-5", "(in panel) Open share link in Email/Twitter/..."),
        key("c / i / x", "(in panel) Copy link / invite by email / clear invites"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Keybindings ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(help, popup);
}
