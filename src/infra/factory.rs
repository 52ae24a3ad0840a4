use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::api::views::load_templates;
use crate::config::Config;
use crate::domain::services::{
    auth_service::AuthService, event_service::EventService,
    refund_service::RefundService, ticket_service::TicketService,
};
use crate::error::StartupError;
use crate::infra::repositories::{
    sqlite_comment_repo::SqliteCommentRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_rating_repo::SqliteRatingRepo,
    sqlite_refund_repo::SqliteRefundRepo, sqlite_session_repo::SqliteSessionRepo,
    sqlite_ticket_repo::SqliteTicketRepo, sqlite_user_repo::SqliteUserRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> Result<AppState, StartupError> {
    info!("Initializing SQLite connection with WAL Mode...");
    let pool = connect(&config.database_url).await?;
    run_migrations(&pool).await?;

    let templates = load_templates(config.timezone)?;
    Ok(build_state(pool, config.clone(), templates))
}

pub async fn connect(database_url: &str) -> Result<SqlitePool, StartupError> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Wires the SQLite adapters and services into the shared state.
pub fn build_state(pool: SqlitePool, config: Config, templates: Tera) -> AppState {
    let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));
    let event_repo = Arc::new(SqliteEventRepo::new(pool.clone()));
    let ticket_repo = Arc::new(SqliteTicketRepo::new(pool.clone()));
    let refund_repo = Arc::new(SqliteRefundRepo::new(pool.clone()));

    let auth_service = Arc::new(AuthService::new(session_repo.clone(), user_repo.clone(), config.session_ttl_hours));
    let event_service = Arc::new(EventService::new(event_repo.clone(), ticket_repo.clone(), config.timezone));
    let ticket_service = Arc::new(TicketService::new(ticket_repo.clone()));
    let refund_service = Arc::new(RefundService::new(refund_repo.clone(), config.timezone));

    AppState {
        user_repo,
        session_repo,
        event_repo,
        ticket_repo,
        refund_repo,
        comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
        rating_repo: Arc::new(SqliteRatingRepo::new(pool.clone())),
        notification_repo: Arc::new(SqliteNotificationRepo::new(pool)),
        auth_service,
        event_service,
        ticket_service,
        refund_service,
        templates: Arc::new(templates),
        config,
    }
}
