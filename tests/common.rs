use eventhub::{
    api::{router::create_router, views::load_templates},
    config::Config,
    domain::models::{
        event::{Event, NewEvent},
        ticket::{NewTicket, Ticket, TicketType},
        user::User,
    },
    infra::factory::{build_state, connect, run_migrations},
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "s3cret-pass";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

/// A registered user plus the `Cookie` header value of its session.
#[allow(dead_code)]
pub struct Client {
    pub user: User,
    pub cookie: String,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let pool = connect(&db_url).await.expect("Failed to connect to test db");
        run_migrations(&pool).await.expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url,
            port: 0,
            timezone: chrono_tz::UTC,
            session_ttl_hours: 24,
            secure_cookies: false,
        };
        let templates = load_templates(config.timezone).expect("Failed to load templates");

        let state = Arc::new(build_state(pool.clone(), config, templates));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(serde_urlencoded::to_string(fields).unwrap())).unwrap()).await
    }

    /// Registers through the form and keeps the session cookie it sets.
    pub async fn register(&self, username: &str, is_organizer: bool) -> Client {
        let email = format!("{}@example.com", username);
        let mut fields = vec![
            ("email", email.as_str()),
            ("username", username),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ];
        if is_organizer {
            fields.push(("is_organizer", "on"));
        }

        let response = self.post_form("/accounts/register/", None, &fields).await;
        if response.status() != StatusCode::SEE_OTHER {
            panic!("Register failed in test helper: status {}", response.status());
        }
        let token = cookie_value(&response, "session_id").expect("No session_id cookie returned");

        let user = self.state.user_repo.find_by_username(username).await
            .unwrap()
            .expect("Registered user not stored");
        Client {
            user,
            cookie: format!("session_id={}", token),
        }
    }

    pub async fn seed_event(&self, organizer_id: i64, title: &str, days_ahead: i64) -> Event {
        self.state.event_repo.create(&NewEvent {
            title: title.to_string(),
            description: format!("Descripción de {}", title),
            scheduled_at: Utc::now() + Duration::days(days_ahead),
            location: "Estadio Central".to_string(),
            organizer_id,
        }).await.unwrap()
    }

    pub async fn seed_ticket(&self, user_id: i64, event_id: i64, quantity: i64) -> Ticket {
        self.state.ticket_repo
            .create_within_cap(&NewTicket::new(user_id, event_id, quantity, TicketType::General), 4)
            .await
            .unwrap()
            .expect("Seed ticket rejected by cap")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with(&prefix))
        .map(|c| {
            let value = &c[prefix.len()..];
            value.split(';').next().unwrap_or(value).to_string()
        })
        .filter(|v| !v.is_empty())
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response.headers()
        .get(header::LOCATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
