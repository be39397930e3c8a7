// Terminal interface for RepoLens
pub mod analytics_ui;
pub mod app;
pub mod help_ui;
pub mod runner;
pub mod saved_ui;
pub mod share_ui;
pub mod ui;

pub use app::{AnalyticsState, App, InputMode, View};
pub use runner::{run_tui, Services};
