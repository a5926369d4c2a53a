// routes.rs
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{append_slash, enforce_allowed_hosts, render_error_detail};
use crate::state::AppState;

/// Path builder for the poll pages, shared by the router, the redirect after
/// a vote and the page links.
#[derive(Debug, Clone, PartialEq)]
pub struct Urls {
    prefix: String,
    static_url: String,
}

impl Urls {
    /// `prefix` and `static_url` are expected in normalized form: a leading
    /// slash and no trailing slash, or empty for the site root.
    pub fn new(prefix: &str, static_url: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            static_url: static_url.to_string(),
        }
    }

    pub fn index(&self) -> String {
        format!("{}/", self.prefix)
    }

    pub fn detail(&self, question_id: i64) -> String {
        format!("{}/{}/", self.prefix, question_id)
    }

    pub fn results(&self, question_id: i64) -> String {
        format!("{}/{}/results/", self.prefix, question_id)
    }

    pub fn vote(&self, question_id: i64) -> String {
        format!("{}/{}/vote/", self.prefix, question_id)
    }

    pub fn static_asset(&self, path: &str) -> String {
        format!("{}/{}", self.static_url, path.trim_start_matches('/'))
    }

    /// True for `GET`-able page paths missing only their trailing slash:
    /// the index, a detail page or a results page.
    pub fn needs_trailing_slash(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        if rest.is_empty() {
            return !self.prefix.is_empty();
        }
        let Some(rest) = rest.strip_prefix('/') else {
            return false;
        };
        let id = rest.strip_suffix("/results").unwrap_or(rest);
        !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
    }

    fn detail_route(&self) -> String {
        format!("{}/{{question_id}}/", self.prefix)
    }

    fn results_route(&self) -> String {
        format!("{}/{{question_id}}/results/", self.prefix)
    }

    fn vote_route(&self) -> String {
        format!("{}/{{question_id}}/vote/", self.prefix)
    }
}

pub fn create_routes(state: AppState) -> Router {
    let urls = &state.urls;

    let router = Router::new()
        .route(&urls.index(), get(handlers::index))
        .route(&urls.detail_route(), get(handlers::detail))
        .route(&urls.results_route(), get(handlers::results))
        .route(&urls.vote_route(), post(handlers::vote));

    let static_files = ServeDir::new(&state.config.static_root);
    let router = if state.config.static_url.is_empty() {
        router.fallback_service(static_files)
    } else {
        router.nest_service(&state.config.static_url, static_files)
    };

    router
        .layer(middleware::from_fn_with_state(state.clone(), append_slash))
        .layer(middleware::from_fn_with_state(state.clone(), render_error_detail))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_allowed_hosts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
