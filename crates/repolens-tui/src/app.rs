// TUI application state and event handling
use ratatui::widgets::ListState;
use repolens_core::{
    AnalyticsSnapshot, InviteRecord, RepositorySummary, SavedSortKey, SearchFilters,
    SearchResults, Session, SortField, SortOrder, Theme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Search,
    Saved,
    Analytics,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Search => "Search",
            View::Saved => "Saved",
            View::Analytics => "Analytics",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            View::Search => View::Saved,
            View::Saved => View::Analytics,
            View::Analytics => View::Search,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,         // Navigating results
    Searching,      // Typing in the search box
    Filtering,      // Navigating filter fields
    EditingFilter,  // Actively typing in a filter field
    EnteringInvite, // Typing an invite email in the share panel
    ConfirmingClear, // Clear-all modal is up; only Confirm/Cancel get through
}

/// Lifecycle of the analytics snapshot for the current view entry
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalyticsState {
    #[default]
    Idle,
    Loading,
    Ready(AnalyticsSnapshot),
    Failed(String),
}

/// Filter panel fields, in cursor order
pub const FILTER_LANGUAGE: usize = 0;
pub const FILTER_MIN_STARS: usize = 1;
pub const FILTER_SORT: usize = 2;
pub const FILTER_ORDER: usize = 3;
const FILTER_FIELD_COUNT: usize = 4;

pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub session: Option<Session>,
    /// Public origin used when building analytics share links
    pub share_origin: String,

    // Search view
    pub search_input: String,
    /// Last submitted query; page changes and filter changes re-issue this
    pub query: String,
    pub results: SearchResults,
    pub page: u32,
    pub has_searched: bool,
    pub loading: bool,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub filters: SearchFilters,
    pub show_filters: bool,
    pub filter_cursor: usize,
    pub filter_edit_buffer: String,
    pub list_state: ListState,

    // Saved view
    pub saved_language: Option<String>,
    pub saved_sort: SavedSortKey,
    pub saved_repos: Vec<RepositorySummary>,
    /// All saved ids regardless of the view's filters, for bookmark badges
    pub saved_ids: Vec<u64>,
    pub saved_count: usize,
    pub saved_state: ListState,

    // Analytics view + share panel
    pub analytics: AnalyticsState,
    pub show_share: bool,
    pub invite_input: String,
    pub invites: Vec<InviteRecord>,

    pub show_help: bool,
}

impl App {
    pub fn new(theme: Theme, session: Option<Session>, share_origin: String) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            view: View::Search,
            input_mode: InputMode::Searching,
            theme,
            session,
            share_origin,
            search_input: String::new(),
            query: String::new(),
            results: SearchResults::default(),
            page: 1,
            has_searched: false,
            loading: false,
            error_message: None,
            status_message: None,
            filters: SearchFilters::default(),
            show_filters: false,
            filter_cursor: 0,
            filter_edit_buffer: String::new(),
            list_state,
            saved_language: None,
            saved_sort: SavedSortKey::default(),
            saved_repos: Vec::new(),
            saved_ids: Vec::new(),
            saved_count: 0,
            saved_state: ListState::default(),
            analytics: AnalyticsState::default(),
            show_share: false,
            invite_input: String::new(),
            invites: Vec::new(),
            show_help: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // --- mode and view transitions ---

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn switch_view(&mut self, view: View) {
        self.view = view;
        self.input_mode = InputMode::Normal;
        self.show_share = false;
    }

    // --- search flow ---

    /// Mark a search as in flight. The caller has already issued a sequence
    /// token; the loading flag blocks duplicate submissions until the
    /// matching completion lands.
    pub fn begin_search(&mut self, query: String, page: u32) {
        self.loading = true;
        self.has_searched = true;
        self.error_message = None;
        self.query = query;
        self.page = page;
    }

    pub fn apply_search(&mut self, results: SearchResults) {
        self.loading = false;
        self.results = results;
        self.list_state.select(Some(0));
    }

    /// A failed search clears the result set and surfaces one message
    pub fn fail_search(&mut self, message: String) {
        self.loading = false;
        self.results = SearchResults::default();
        self.error_message = Some(message);
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        self.results.total_pages()
    }

    /// Next page number, if there is one and nothing is in flight
    pub fn next_page(&self) -> Option<u32> {
        if self.loading || !self.has_query() || self.page >= self.total_pages() {
            return None;
        }
        Some(self.page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        if self.loading || !self.has_query() || self.page <= 1 {
            return None;
        }
        Some(self.page - 1)
    }

    /// One action sets sort field and direction, resetting to page 1
    pub fn quick_sort(&mut self, sort: SortField) {
        self.filters.quick_sort(sort, SortOrder::Desc);
        self.page = 1;
    }

    pub fn toggle_order(&mut self) {
        self.filters.order = self.filters.order.toggled();
        self.page = 1;
    }

    pub fn dismiss_error(&mut self) {
        self.error_message = None;
    }

    /// Result info line shown above the list
    pub fn found_message(&self) -> String {
        format!(
            "Found {} repositories for \"{}\"",
            format_count(self.results.total_count),
            self.query
        )
    }

    // --- filter panel ---

    pub fn toggle_filters(&mut self) {
        self.show_filters = !self.show_filters;
        self.input_mode = if self.show_filters {
            InputMode::Filtering
        } else {
            InputMode::Normal
        };
    }

    pub fn next_filter(&mut self) {
        self.filter_cursor = (self.filter_cursor + 1).min(FILTER_FIELD_COUNT - 1);
    }

    pub fn previous_filter(&mut self) {
        self.filter_cursor = self.filter_cursor.saturating_sub(1);
    }

    /// Begin editing the field under the cursor. Sort and order are cycled
    /// directly instead of edited as text; returns false for those.
    pub fn enter_editing_filter_mode(&mut self) -> bool {
        match self.filter_cursor {
            FILTER_LANGUAGE => {
                self.filter_edit_buffer = self.filters.language.clone().unwrap_or_default();
            }
            FILTER_MIN_STARS => {
                self.filter_edit_buffer = self
                    .filters
                    .min_stars
                    .map(|s| s.to_string())
                    .unwrap_or_default();
            }
            _ => return false,
        }
        self.input_mode = InputMode::EditingFilter;
        true
    }

    /// Save the edit buffer into the filter under the cursor.
    ///
    /// Any filter change resets pagination to page 1; the caller re-issues
    /// the current query.
    pub fn save_filter_edit(&mut self) {
        match self.filter_cursor {
            FILTER_LANGUAGE => {
                self.filters.language = if self.filter_edit_buffer.is_empty() {
                    None
                } else {
                    Some(self.filter_edit_buffer.clone())
                };
            }
            FILTER_MIN_STARS => {
                self.filters.min_stars = self.filter_edit_buffer.parse().ok();
            }
            _ => {}
        }
        self.filter_edit_buffer.clear();
        self.input_mode = InputMode::Filtering;
        self.page = 1;
    }

    pub fn cancel_filter_edit(&mut self) {
        self.filter_edit_buffer.clear();
        self.input_mode = InputMode::Filtering;
    }

    pub fn cycle_sort_filter(&mut self) {
        self.filters.sort = match self.filters.sort {
            SortField::Stars => SortField::Forks,
            SortField::Forks => SortField::Updated,
            SortField::Updated => SortField::Stars,
        };
        self.page = 1;
    }

    pub fn clear_current_filter(&mut self) {
        match self.filter_cursor {
            FILTER_LANGUAGE => self.filters.language = None,
            FILTER_MIN_STARS => self.filters.min_stars = None,
            FILTER_SORT => self.filters.sort = SortField::Stars,
            FILTER_ORDER => self.filters.order = SortOrder::Desc,
            _ => {}
        }
        self.page = 1;
    }

    // --- result list navigation ---

    pub fn next_result(&mut self) {
        let (len, state) = self.active_list();
        if len > 0 {
            let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
            state.select(Some(next));
        }
    }

    pub fn previous_result(&mut self) {
        let (_, state) = self.active_list();
        let previous = state.selected().map_or(0, |i| i.saturating_sub(1));
        state.select(Some(previous));
    }

    fn active_list(&mut self) -> (usize, &mut ListState) {
        match self.view {
            View::Saved => (self.saved_repos.len(), &mut self.saved_state),
            _ => (self.results.items.len(), &mut self.list_state),
        }
    }

    /// Repository under the cursor in the active view
    pub fn selected_repository(&self) -> Option<&RepositorySummary> {
        match self.view {
            View::Saved => self
                .saved_state
                .selected()
                .and_then(|i| self.saved_repos.get(i)),
            _ => self
                .list_state
                .selected()
                .and_then(|i| self.results.items.get(i)),
        }
    }

    // --- saved view ---

    pub fn set_saved(&mut self, repos: Vec<RepositorySummary>, total: usize) {
        let selected = self
            .saved_state
            .selected()
            .unwrap_or(0)
            .min(repos.len().saturating_sub(1));
        self.saved_repos = repos;
        self.saved_count = total;
        self.saved_state.select(if self.saved_repos.is_empty() {
            None
        } else {
            Some(selected)
        });
    }

    pub fn cycle_saved_sort(&mut self) {
        self.saved_sort = self.saved_sort.next();
    }

    /// Cycle the language filter: all -> each language -> all
    pub fn cycle_saved_language(&mut self, languages: &[String]) {
        self.saved_language = match &self.saved_language {
            None => languages.first().cloned(),
            Some(current) => {
                let idx = languages.iter().position(|l| l == current);
                match idx {
                    Some(i) if i + 1 < languages.len() => Some(languages[i + 1].clone()),
                    _ => None,
                }
            }
        };
    }

    /// Put up the clear-all modal. Clearing is destructive, so it only ever
    /// happens through the Confirm path; an empty store has nothing to ask
    /// about.
    pub fn request_clear_saved(&mut self) {
        if self.saved_count > 0 {
            self.input_mode = InputMode::ConfirmingClear;
        }
    }

    pub fn cancel_clear_saved(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    // --- analytics + share ---

    pub fn analytics_loading(&mut self) {
        self.analytics = AnalyticsState::Loading;
    }

    pub fn analytics_ready(&mut self, snapshot: AnalyticsSnapshot) {
        self.analytics = AnalyticsState::Ready(snapshot);
    }

    pub fn analytics_failed(&mut self, message: String) {
        self.analytics = AnalyticsState::Failed(message);
    }

    pub fn toggle_share_panel(&mut self) {
        self.show_share = !self.show_share;
        if !self.show_share {
            self.invite_input.clear();
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn enter_invite_mode(&mut self) {
        self.invite_input.clear();
        self.input_mode = InputMode::EnteringInvite;
    }

    /// Public link to the signed-in user's analytics page
    pub fn share_url(&self) -> String {
        match &self.session {
            Some(session) => {
                repolens_core::share::analytics_share_url(&self.share_origin, &session.user.login)
            }
            None => String::new(),
        }
    }

    pub fn cancel_invite(&mut self) {
        self.invite_input.clear();
        self.input_mode = InputMode::Normal;
    }
}

/// Thousands separators, the way the result counter renders them
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Theme::Dark, None, "http://localhost:8000".to_string())
    }

    #[test]
    fn test_quick_sort_resets_to_page_one() {
        let mut app = app();
        app.begin_search("react".to_string(), 3);
        app.apply_search(SearchResults {
            items: Vec::new(),
            total_count: 1000,
        });

        app.quick_sort(SortField::Forks);

        assert_eq!(app.page, 1);
        assert_eq!(app.filters.sort, SortField::Forks);
        assert_eq!(app.filters.order, SortOrder::Desc);
    }

    #[test]
    fn test_filter_edit_resets_to_page_one() {
        let mut app = app();
        app.page = 5;
        app.filter_cursor = FILTER_LANGUAGE;
        app.filter_edit_buffer = "rust".to_string();

        app.save_filter_edit();

        assert_eq!(app.page, 1);
        assert_eq!(app.filters.language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_pagination_respects_the_result_window() {
        let mut app = app();
        app.begin_search("react".to_string(), 1);
        app.apply_search(SearchResults {
            items: Vec::new(),
            total_count: 250_000,
        });

        assert_eq!(app.total_pages(), 34);
        app.page = 34;
        assert_eq!(app.next_page(), None);
        assert_eq!(app.previous_page(), Some(33));
    }

    #[test]
    fn test_no_page_navigation_while_loading() {
        let mut app = app();
        app.begin_search("react".to_string(), 2);
        assert!(app.loading);
        assert_eq!(app.next_page(), None);
        assert_eq!(app.previous_page(), None);
    }

    #[test]
    fn test_failed_search_clears_results() {
        let mut app = app();
        app.begin_search("react".to_string(), 1);
        app.apply_search(SearchResults {
            items: Vec::new(),
            total_count: 900,
        });

        app.begin_search("react".to_string(), 2);
        app.fail_search("Failed to fetch repositories".to_string());

        assert_eq!(app.results.total_count, 0);
        assert_eq!(
            app.error_message.as_deref(),
            Some("Failed to fetch repositories")
        );
    }

    #[test]
    fn test_found_message_formats_the_count() {
        let mut app = app();
        app.begin_search("react".to_string(), 1);
        app.apply_search(SearchResults {
            items: Vec::new(),
            total_count: 12_345,
        });

        assert_eq!(
            app.found_message(),
            "Found 12,345 repositories for \"react\""
        );
    }

    #[test]
    fn test_clear_modal_requires_saved_repos() {
        let mut app = app();
        app.request_clear_saved();
        assert_eq!(app.input_mode, InputMode::Searching);

        app.saved_count = 2;
        app.input_mode = InputMode::Normal;
        app.request_clear_saved();
        assert_eq!(app.input_mode, InputMode::ConfirmingClear);

        app.cancel_clear_saved();
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_saved_language_cycles_back_to_all() {
        let mut app = app();
        let languages = vec!["Python".to_string(), "Rust".to_string()];

        app.cycle_saved_language(&languages);
        assert_eq!(app.saved_language.as_deref(), Some("Python"));
        app.cycle_saved_language(&languages);
        assert_eq!(app.saved_language.as_deref(), Some("Rust"));
        app.cycle_saved_language(&languages);
        assert_eq!(app.saved_language, None);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
