// TUI event loop and terminal management
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::debug;

use repolens_core::{
    share, AnalyticsClient, AnalyticsSnapshot, Config, InviteLog, SavedRepoStore, SearchClient,
    SearchResults, Sequencer, SortField,
};

use crate::app::{FILTER_ORDER, FILTER_SORT};
use crate::{ui, App, InputMode, View};

/// Everything the event loop needs to do real work
pub struct Services {
    pub search: Arc<SearchClient>,
    pub analytics: Arc<AnalyticsClient>,
    pub saved: Arc<SavedRepoStore>,
    pub invites: Arc<InviteLog>,
}

/// Completions of work that ran off the UI task.
///
/// Searches carry the sequence token they were issued with; a completion
/// whose token is no longer current lost the race to a newer request and is
/// dropped instead of overwriting fresher results.
enum AppEvent {
    SearchDone {
        seq: u64,
        result: repolens_core::Result<SearchResults>,
    },
    AnalyticsDone {
        result: repolens_core::Result<AnalyticsSnapshot>,
    },
}

type EventSender = mpsc::UnboundedSender<AppEvent>;

pub async fn run_tui(mut app: App, services: Services) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &services).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    services: &Services,
) -> anyhow::Result<()> {
    let sequencer = Arc::new(Sequencer::new());
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut saved_rx = services.saved.subscribe();

    refresh_saved(app, services);

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Land finished background work before waiting on input
        while let Ok(done) = rx.try_recv() {
            match done {
                AppEvent::SearchDone { seq, result } => {
                    if !sequencer.is_current(seq) {
                        debug!("discarding stale search completion (seq {})", seq);
                        continue;
                    }
                    match result {
                        Ok(results) => app.apply_search(results),
                        Err(e) => app.fail_search(e.to_string()),
                    }
                }
                AppEvent::AnalyticsDone { result } => match result {
                    Ok(snapshot) => app.analytics_ready(snapshot),
                    Err(e) => app.analytics_failed(e.to_string()),
                },
            }
        }

        // Store mutations from any surface update the badge and list
        if saved_rx.has_changed().unwrap_or(false) {
            saved_rx.borrow_and_update();
            refresh_saved(app, services);
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key, services, &tx, &sequencer);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(
    app: &mut App,
    key: KeyEvent,
    services: &Services,
    tx: &EventSender,
    sequencer: &Arc<Sequencer>,
) {
    app.status_message = None;

    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Searching => match key.code {
            KeyCode::Enter => submit_search(app, services, tx, sequencer),
            KeyCode::Char(c) => app.search_input.push(c),
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Esc => app.enter_normal_mode(),
            _ => {}
        },
        InputMode::Filtering => match key.code {
            KeyCode::Esc => {
                app.show_filters = false;
                app.enter_normal_mode();
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => app.next_filter(),
            KeyCode::Up | KeyCode::Char('k') => app.previous_filter(),
            KeyCode::Delete | KeyCode::Char('d') => {
                app.clear_current_filter();
                resubmit_current_query(app, services, tx, sequencer);
            }
            KeyCode::Enter => match app.filter_cursor {
                FILTER_SORT => {
                    app.cycle_sort_filter();
                    resubmit_current_query(app, services, tx, sequencer);
                }
                FILTER_ORDER => {
                    app.toggle_order();
                    resubmit_current_query(app, services, tx, sequencer);
                }
                _ => {
                    app.enter_editing_filter_mode();
                }
            },
            _ => {}
        },
        InputMode::EditingFilter => match key.code {
            KeyCode::Enter => {
                app.save_filter_edit();
                resubmit_current_query(app, services, tx, sequencer);
            }
            KeyCode::Esc => app.cancel_filter_edit(),
            KeyCode::Char(c) => app.filter_edit_buffer.push(c),
            KeyCode::Backspace => {
                app.filter_edit_buffer.pop();
            }
            _ => {}
        },
        InputMode::ConfirmingClear => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Err(e) = services.saved.clear() {
                    app.error_message = Some(format!("Failed to clear bookmarks: {}", e));
                } else {
                    app.status_message = Some("Saved repositories cleared".to_string());
                }
                app.cancel_clear_saved();
                refresh_saved(app, services);
            }
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_clear_saved(),
            // The modal swallows everything else
            _ => {}
        },
        InputMode::EnteringInvite => match key.code {
            KeyCode::Enter => submit_invite(app, services),
            KeyCode::Esc => app.cancel_invite(),
            KeyCode::Char(c) => app.invite_input.push(c),
            KeyCode::Backspace => {
                app.invite_input.pop();
            }
            _ => {}
        },
        InputMode::Normal => handle_normal_key(app, key, services, tx, sequencer),
    }
}

fn handle_normal_key(
    app: &mut App,
    key: KeyEvent,
    services: &Services,
    tx: &EventSender,
    sequencer: &Arc<Sequencer>,
) {
    // The share panel grabs keys while it's open
    if app.show_share {
        handle_share_key(app, key, services);
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return;
        }
        KeyCode::Char('T') => {
            toggle_theme(app);
            return;
        }
        KeyCode::Tab => {
            let next = app.view.next();
            switch_view(app, next, services, tx);
            return;
        }
        KeyCode::Char('1') => {
            switch_view(app, View::Search, services, tx);
            return;
        }
        KeyCode::Char('2') => {
            switch_view(app, View::Saved, services, tx);
            return;
        }
        KeyCode::Char('3') => {
            switch_view(app, View::Analytics, services, tx);
            return;
        }
        _ => {}
    }

    match app.view {
        View::Search => match key.code {
            KeyCode::Char('/') => app.enter_search_mode(),
            KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_filters(),
            KeyCode::Char('s') => {
                // Quick sort: next field, descending, back to page 1
                let next = match app.filters.sort {
                    SortField::Stars => SortField::Forks,
                    SortField::Forks => SortField::Updated,
                    SortField::Updated => SortField::Stars,
                };
                app.quick_sort(next);
                resubmit_current_query(app, services, tx, sequencer);
            }
            KeyCode::Char('o') => {
                app.toggle_order();
                resubmit_current_query(app, services, tx, sequencer);
            }
            KeyCode::Char('n') | KeyCode::Right => {
                if let Some(page) = app.next_page() {
                    let query = app.query.clone();
                    dispatch_search(app, query, page, services, tx, sequencer);
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if let Some(page) = app.previous_page() {
                    let query = app.query.clone();
                    dispatch_search(app, query, page, services, tx, sequencer);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => app.next_result(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_result(),
            KeyCode::Char('b') | KeyCode::Char(' ') => toggle_save_selected(app, services),
            KeyCode::Char('e') | KeyCode::Esc => app.dismiss_error(),
            KeyCode::Enter => open_selected(app),
            _ => {}
        },
        View::Saved => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.next_result(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_result(),
            KeyCode::Char('s') => {
                app.cycle_saved_sort();
                refresh_saved(app, services);
            }
            KeyCode::Char('l') => {
                let languages = services.saved.languages();
                app.cycle_saved_language(&languages);
                refresh_saved(app, services);
            }
            KeyCode::Char('d') => remove_selected(app, services),
            KeyCode::Char('C') => app.request_clear_saved(),
            KeyCode::Enter => open_selected(app),
            _ => {}
        },
        View::Analytics => match key.code {
            KeyCode::Char('r') => spawn_analytics(app, services, tx),
            KeyCode::Char('S') => {
                if app.session.is_some() {
                    app.invites = services.invites.list();
                    app.toggle_share_panel();
                } else {
                    app.status_message = Some("Sign in to share your analytics".to_string());
                }
            }
            _ => {}
        },
    }
}

fn handle_share_key(app: &mut App, key: KeyEvent, services: &Services) {
    // Closing works no matter what state the panel is in
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('S')) {
        app.toggle_share_panel();
        return;
    }

    let (display_name, share_url) = match &app.session {
        Some(session) => (
            session.user.display_name().to_string(),
            app.share_url(),
        ),
        None => return,
    };

    match key.code {
        KeyCode::Char('c') => copy_share_link(app, &share_url),
        KeyCode::Char('i') => app.enter_invite_mode(),
        KeyCode::Char('x') => {
            // No confirmation here, unlike the saved-repo clear
            if let Err(e) = services.invites.clear() {
                app.error_message = Some(format!("Failed to clear invites: {}", e));
            }
            app.invites = services.invites.list();
        }
        KeyCode::Enter => open_url(app, share_url),
        KeyCode::Char('1') => open_url(app, share::email_share_url(&display_name, &share_url)),
        KeyCode::Char('2') => open_url(app, share::twitter_share_url(&display_name, &share_url)),
        KeyCode::Char('3') => open_url(app, share::linkedin_share_url(&share_url)),
        KeyCode::Char('4') => open_url(app, share::facebook_share_url(&share_url)),
        KeyCode::Char('5') => open_url(app, share::whatsapp_share_url(&display_name, &share_url)),
        _ => {}
    }
}

fn switch_view(app: &mut App, view: View, services: &Services, tx: &EventSender) {
    app.switch_view(view);
    match view {
        View::Saved => refresh_saved(app, services),
        // Recomputed on every view entry; snapshots are never reused
        View::Analytics => spawn_analytics(app, services, tx),
        View::Search => {}
    }
}

/// Submit whatever is in the search box as a fresh page-1 search
fn submit_search(
    app: &mut App,
    services: &Services,
    tx: &EventSender,
    sequencer: &Arc<Sequencer>,
) {
    let query = app.search_input.trim().to_string();
    if query.is_empty() {
        // Blank submissions never leave the client
        return;
    }
    if app.loading {
        return;
    }
    app.enter_normal_mode();
    dispatch_search(app, query, 1, services, tx, sequencer);
}

/// Filter or sort changed: re-issue the current query from page 1
fn resubmit_current_query(
    app: &mut App,
    services: &Services,
    tx: &EventSender,
    sequencer: &Arc<Sequencer>,
) {
    if !app.has_query() || app.loading {
        return;
    }
    let query = app.query.clone();
    dispatch_search(app, query, 1, services, tx, sequencer);
}

fn dispatch_search(
    app: &mut App,
    query: String,
    page: u32,
    services: &Services,
    tx: &EventSender,
    sequencer: &Arc<Sequencer>,
) {
    app.begin_search(query.clone(), page);

    let seq = sequencer.issue();
    let filters = app.filters.clone();
    let search = services.search.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = search.search(&query, page, &filters).await;
        let _ = tx.send(AppEvent::SearchDone { seq, result });
    });
}

fn spawn_analytics(app: &mut App, services: &Services, tx: &EventSender) {
    let Some(session) = &app.session else {
        app.analytics_failed("Sign in with GitHub to view analytics".to_string());
        return;
    };
    if !session.user.github_connected {
        app.analytics_failed("Connect your GitHub account to view analytics".to_string());
        return;
    }

    let login = session.user.login.clone();
    app.analytics_loading();

    let analytics = services.analytics.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = analytics.compute_snapshot(&login).await;
        let _ = tx.send(AppEvent::AnalyticsDone { result });
    });
}

fn refresh_saved(app: &mut App, services: &Services) {
    let list = services
        .saved
        .list(app.saved_language.as_deref(), app.saved_sort);
    app.set_saved(list, services.saved.len());
    app.saved_ids = services.saved.ids();
}

fn toggle_save_selected(app: &mut App, services: &Services) {
    let Some(repo) = app.selected_repository().cloned() else {
        return;
    };

    match services.saved.toggle(&repo) {
        Ok(true) => app.status_message = Some(format!("Saved {}", repo.full_name)),
        Ok(false) => app.status_message = Some(format!("Removed {}", repo.full_name)),
        Err(e) => app.error_message = Some(format!("Failed to update bookmarks: {}", e)),
    }
    refresh_saved(app, services);
}

fn remove_selected(app: &mut App, services: &Services) {
    let Some(repo) = app.selected_repository().cloned() else {
        return;
    };

    match services.saved.remove(repo.id) {
        Ok(true) => app.status_message = Some(format!("Removed {}", repo.full_name)),
        Ok(false) => {}
        Err(e) => app.error_message = Some(format!("Failed to update bookmarks: {}", e)),
    }
    refresh_saved(app, services);
}

fn submit_invite(app: &mut App, services: &Services) {
    let email = app.invite_input.trim().to_string();
    if email.is_empty() {
        return;
    }
    let display_name = match &app.session {
        Some(session) => session.user.display_name().to_string(),
        None => return,
    };

    let share_url = app.share_url();
    let mailto = share::invite_mailto(&email, &display_name, &share_url);

    match services.invites.record(&email) {
        Ok(_) => {
            // Fire-and-forget: open the composer, nothing confirms delivery
            let _ = open::that(mailto);
            app.status_message = Some(format!("Invitation recorded for {}", email));
        }
        Err(e) => app.error_message = Some(format!("Failed to record invite: {}", e)),
    }

    app.invites = services.invites.list();
    app.cancel_invite();
}

fn copy_share_link(app: &mut App, share_url: &str) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(share_url)) {
        Ok(()) => app.status_message = Some("Link copied to clipboard".to_string()),
        // Copy failures stay silent, same as the source surface
        Err(_) => {}
    }
}

fn open_url(app: &mut App, url: String) {
    if url.is_empty() {
        return;
    }
    if let Err(e) = open::that(url) {
        app.error_message = Some(format!("Failed to open browser: {}", e));
    }
}

fn open_selected(app: &mut App) {
    if let Some(repo) = app.selected_repository() {
        let url = repo.html_url.clone();
        open_url(app, url);
    }
}

fn toggle_theme(app: &mut App) {
    app.theme = app.theme.toggled();
    // Remember the choice across runs
    let mut config = Config::load().unwrap_or_default();
    config.ui.theme = app.theme;
    if let Err(e) = config.save() {
        debug!("failed to persist theme: {}", e);
    }
}
