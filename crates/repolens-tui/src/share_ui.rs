// Share & invite panel
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::{centered_rect, palette};
use crate::{App, InputMode};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.theme);
    let popup = centered_rect(60, 70, area);

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Share & Invite ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(colors.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Share link
            Constraint::Length(7), // Share options
            Constraint::Length(3), // Invite input
            Constraint::Min(3),    // Recent invites
        ])
        .split(inner);

    let share_url = app.share_url();
    let link = Paragraph::new(vec![
        Line::from(Span::styled(
            "Your Analytics Link (c: copy, Enter: open)",
            Style::default().fg(colors.muted),
        )),
        Line::from(Span::styled(
            share_url,
            Style::default().fg(colors.accent).add_modifier(Modifier::UNDERLINED),
        )),
    ]);
    frame.render_widget(link, chunks[0]);

    let options = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Quick Share",
            Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("  [1] Email", Style::default().fg(colors.text))),
        Line::from(Span::styled("  [2] Twitter", Style::default().fg(colors.text))),
        Line::from(Span::styled("  [3] LinkedIn", Style::default().fg(colors.text))),
        Line::from(Span::styled("  [4] Facebook", Style::default().fg(colors.text))),
        Line::from(Span::styled("  [5] WhatsApp", Style::default().fg(colors.text))),
    ]);
    frame.render_widget(options, chunks[1]);

    let invite_border = if app.input_mode == InputMode::EnteringInvite {
        Style::default().fg(colors.accent)
    } else {
        Style::default().fg(colors.muted)
    };
    let invite_hint = if app.input_mode == InputMode::EnteringInvite {
        " Invite via email (Enter: send, Esc: cancel) "
    } else {
        " Invite via email (press i) "
    };
    let invite = Paragraph::new(app.invite_input.as_str())
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(invite_hint)
                .border_style(invite_border),
        );
    frame.render_widget(invite, chunks[2]);

    // Recent invites, newest first; x wipes the lot with no questions asked
    let title = format!(" Recent Invites ({}) (x: clear) ", app.invites.len());
    let items: Vec<ListItem> = if app.invites.is_empty() {
        vec![ListItem::new(Span::styled(
            "No invitations sent yet",
            Style::default().fg(colors.muted),
        ))]
    } else {
        app.invites
            .iter()
            .map(|invite| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        invite.email.clone(),
                        Style::default().fg(colors.text),
                    ),
                    Span::styled(
                        format!("  {}", invite.sent_at.format("%Y-%m-%d %H:%M")),
                        Style::default().fg(colors.muted),
                    ),
                ]))
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(colors.muted)),
    );
    frame.render_widget(list, chunks[3]);
}
