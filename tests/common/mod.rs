#![allow(dead_code)]

use axum::body::{self, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use polls::models::{Choice, Question};
use polls::{create_routes, db, poll, AppState, Config};

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub state: AppState,
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let pool = db::memory_pool().await.expect("failed to open database");
        Self::build(pool, config, None).await
    }

    /// App backed by a database file with a pool of `connections`, so
    /// requests reach SQLite concurrently.
    pub async fn on_disk(connections: u32) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = Config {
            database_url: format!("sqlite://{}", dir.path().join("polls.sqlite3").display()),
            database_max_connections: connections,
            ..Config::default()
        };
        let pool = db::create_pool(&config).await.expect("failed to open database");
        Self::build(pool, config, Some(dir)).await
    }

    async fn build(pool: SqlitePool, config: Config, dir: Option<TempDir>) -> Self {
        db::migrate(&pool).await.expect("failed to migrate");
        let state = AppState::new(pool.clone(), config);
        Self {
            router: create_routes(state.clone()),
            pool,
            state,
            _dir: dir,
        }
    }

    /// Question published `days` from now; negative is in the past.
    pub async fn question(&self, text: &str, days: i64) -> Question {
        self.question_at(text, Utc::now() + Duration::days(days)).await
    }

    pub async fn question_at(&self, text: &str, pub_date: DateTime<Utc>) -> Question {
        poll::create_question(&self.pool, text, pub_date)
            .await
            .expect("failed to create question")
    }

    pub async fn choice(&self, question: &Question, text: &str, votes: u32) -> Choice {
        poll::create_choice(&self.pool, question.id, text, votes)
            .await
            .expect("failed to create choice")
    }

    pub async fn votes(&self, choice: &Choice) -> i64 {
        poll::find_choice(&self.pool, choice.id)
            .await
            .expect("failed to load choice")
            .expect("choice disappeared")
            .votes
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::HOST, "localhost")
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::HOST, "localhost")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not utf-8")
}
