use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repolens_api::{BackendClient, GitHubClient};
use repolens_core::{
    share, AnalyticsClient, AnalyticsSnapshot, AuthGateway, Config, InviteLog,
    ProxySearchBackend, SavedRepoStore, SavedSortKey, SearchClient, SearchFilters, SearchResults,
    SessionStore, SortField, SortOrder,
};
use repolens_tui::{run_tui, App, Services};

#[derive(Parser)]
#[command(name = "repolens")]
#[command(version, about = "Terminal client for GitHub repository search, bookmarks and analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search for repositories
    Search {
        /// Search query
        query: String,
        /// Filter by programming language
        #[arg(long)]
        language: Option<String>,
        /// Minimum number of stars
        #[arg(long)]
        min_stars: Option<u32>,
        /// Sort by: stars, forks or updated
        #[arg(long, default_value = "stars")]
        sort: SortField,
        /// Order: asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        /// Result page, 30 repositories per page
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List saved repositories
    Saved {
        /// Only show repositories in this language
        #[arg(long)]
        language: Option<String>,
        /// recent, stars-desc, stars-asc, forks-desc, forks-asc, name-asc or name-desc
        #[arg(long, default_value = "recent")]
        sort: SavedSortKey,
    },
    /// Show analytics for the signed-in user
    Analytics,
    /// Sign in with a local account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a local account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Print the URL that starts the GitHub OAuth flow
    Connect,
    /// Complete the OAuth flow with the callback URL the browser landed on
    Callback {
        /// Full callback URL, including the token and user parameters
        url: String,
    },
    /// Show the GitHub profile the stored token resolves to
    Whoami,
    /// Sign out and forget the stored session
    Logout,
    /// Record an invitation and print the prefilled mail link
    Invite {
        /// Recipient address
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repolens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    tracing::debug!("using backend {}", config.backend.url);

    let session_store = SessionStore::new(SessionStore::default_path()?);
    let session = session_store.load()?;
    let backend = BackendClient::new(config.backend.url.clone());

    match cli.command {
        Some(Commands::Search {
            query,
            language,
            min_stars,
            sort,
            order,
            page,
        }) => {
            let token = session.as_ref().map(|s| s.access_token.clone());
            let search = SearchClient::new(Box::new(ProxySearchBackend::new(backend, token)));
            let filters = SearchFilters {
                language,
                min_stars,
                sort,
                order,
            };
            let results = search.search(&query, page, &filters).await?;
            print_results(&query, page, &results);
        }
        Some(Commands::Saved { language, sort }) => {
            let saved = SavedRepoStore::open(SavedRepoStore::default_path()?)?;
            let listed = saved.list(language.as_deref(), sort);
            if listed.is_empty() {
                println!("No saved repositories.");
            }
            for repo in listed {
                println!(
                    "{:<40} ★ {:<8} {}",
                    repo.full_name,
                    repo.stars,
                    repo.language.as_deref().unwrap_or("-")
                );
            }
        }
        Some(Commands::Analytics) => {
            let session = session.ok_or_else(|| {
                anyhow::anyhow!("Not signed in. Run `repolens login` or connect GitHub first.")
            })?;
            let github = GitHubClient::with_base_url(
                Some(session.access_token.clone()),
                config.github.api_url.clone(),
            );
            let analytics = AnalyticsClient::new(github);
            let snapshot = analytics.compute_snapshot(&session.user.login).await?;
            print_snapshot(&session.user.login, &snapshot);
        }
        Some(Commands::Login { email, password }) => {
            let gateway = AuthGateway::new(backend, session_store);
            let session = gateway.login(&email, &password).await?;
            println!("Signed in as {}", session.user.login);
        }
        Some(Commands::Register {
            email,
            username,
            password,
        }) => {
            let gateway = AuthGateway::new(backend, session_store);
            gateway.register(&email, &username, &password).await?;
            println!("Account created. Sign in with `repolens login`.");
        }
        Some(Commands::Connect) => {
            let gateway = AuthGateway::new(backend, session_store);
            println!("Open this URL in your browser to connect GitHub:");
            println!("{}", gateway.github_login_url());
            println!("Then run `repolens callback <redirect-url>` with the URL you land on.");
        }
        Some(Commands::Callback { url }) => {
            let gateway = AuthGateway::new(backend, session_store);
            let session = gateway.complete_oauth(&url)?;
            println!("Connected GitHub as {}", session.user.login);
        }
        Some(Commands::Whoami) => {
            let session = session
                .ok_or_else(|| anyhow::anyhow!("Not signed in. Run `repolens login` first."))?;
            let github = GitHubClient::with_base_url(
                Some(session.access_token.clone()),
                config.github.api_url.clone(),
            );
            let user = github.get_authenticated_user().await?;
            println!("@{} (id {})", user.login, user.id);
            if let Some(name) = user.name {
                println!("{}", name);
            }
        }
        Some(Commands::Logout) => {
            session_store.clear()?;
            println!("Signed out.");
        }
        Some(Commands::Invite { email }) => {
            let session =
                session.ok_or_else(|| anyhow::anyhow!("Sign in before sending invitations."))?;
            let invites = InviteLog::open(InviteLog::default_path()?)?;
            let share_url =
                share::analytics_share_url(&config.backend.url, &session.user.login);
            let mailto = share::invite_mailto(&email, session.user.display_name(), &share_url);
            invites.record(&email)?;
            println!("Recorded invitation for {}", email);
            println!("{}", mailto);
        }
        None => {
            // No subcommand: the full TUI
            let token = session.as_ref().map(|s| s.access_token.clone());
            let search = Arc::new(SearchClient::new(Box::new(ProxySearchBackend::new(
                backend,
                token.clone(),
            ))));
            let github = GitHubClient::with_base_url(token, config.github.api_url.clone());
            let analytics = Arc::new(AnalyticsClient::new(github));
            let saved = Arc::new(SavedRepoStore::open(SavedRepoStore::default_path()?)?);
            let invites = Arc::new(InviteLog::open(InviteLog::default_path()?)?);

            let app = App::new(config.ui.theme, session, config.backend.url.clone());
            run_tui(
                app,
                Services {
                    search,
                    analytics,
                    saved,
                    invites,
                },
            )
            .await?;
        }
    }

    Ok(())
}

fn print_results(query: &str, page: u32, results: &SearchResults) {
    println!(
        "Found {} repositories for \"{}\" (page {} of {})",
        results.total_count,
        query,
        page,
        results.total_pages()
    );
    println!();
    for repo in &results.items {
        println!(
            "{:<45} ★ {:<8} ⑂ {:<7} {}",
            repo.full_name,
            repo.stars,
            repo.forks,
            repo.language.as_deref().unwrap_or("-")
        );
        if let Some(description) = &repo.description {
            println!("    {}", description);
        }
    }
}

fn print_snapshot(login: &str, snapshot: &AnalyticsSnapshot) {
    println!("Analytics for @{}", login);
    println!();
    println!(
        "Repositories: {} ({} public, {} private)",
        snapshot.total_repos, snapshot.public_repo_count, snapshot.private_repo_count
    );
    println!(
        "Total stars: {}   Total forks: {}",
        snapshot.total_stars, snapshot.total_forks
    );
    println!(
        "Recent commits: {}   Active days (last 30): {}",
        snapshot.total_commits, snapshot.active_day_count
    );

    if !snapshot.top_languages.is_empty() {
        println!();
        println!("Top languages:");
        for entry in &snapshot.top_languages {
            println!(
                "  {:<14} {:>3} repos ({:.1}%)",
                entry.language,
                entry.count,
                entry.percentage(snapshot.total_repos)
            );
        }
    }

    if !snapshot.top_repos.is_empty() {
        println!();
        println!("Top repositories:");
        for (i, repo) in snapshot.top_repos.iter().enumerate() {
            println!("  #{} {:<40} ★ {}", i + 1, repo.full_name, repo.stars);
        }
    }
}
