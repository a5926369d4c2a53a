use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use http::{header, Method, StatusCode};

use crate::error::{AppError, ErrorDetail};
use crate::state::AppState;
use crate::templates;

/// Rejects requests whose `Host` does not match `ALLOWED_HOSTS`.
pub async fn enforce_allowed_hosts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .map(str::to_string);

    if !host_allowed(host.as_deref(), &state.config.allowed_hosts) {
        return Err(AppError::BadRequest(format!("invalid Host header: {:?}", host)));
    }

    Ok(next.run(request).await)
}

/// Sends `GET /polls/3` to `/polls/3/` with a permanent redirect when the
/// slash-less path is not served by anything else.
pub async fn append_slash(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let location = if matches!(*request.method(), Method::GET | Method::HEAD)
        && state.urls.needs_trailing_slash(request.uri().path())
    {
        let path = request.uri().path();
        Some(match request.uri().query() {
            Some(query) => format!("{}/?{}", path, query),
            None => format!("{}/", path),
        })
    } else {
        None
    };

    let response = next.run(request).await;
    match location {
        Some(location) if response.status() == StatusCode::NOT_FOUND => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        _ => response,
    }
}

/// With `DEBUG` on, server errors show what went wrong instead of the
/// generic page.
pub async fn render_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.debug {
        return response;
    }

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(templates::server_error(Some(&detail))),
        )
            .into_response(),
        None => response,
    }
}

/// `*` allows any host, `.example.com` allows `example.com` and every
/// subdomain, anything else must match exactly. Ports are ignored.
pub fn host_allowed(host: Option<&str>, allowed: &[String]) -> bool {
    if allowed.iter().any(|pattern| pattern == "*") {
        return true;
    }

    let Some(host) = host.map(strip_port) else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }

    allowed.iter().any(|pattern| match pattern.strip_prefix('.') {
        Some(domain) => host == domain || host.ends_with(pattern.as_str()),
        None => host == *pattern,
    })
}

fn strip_port(host: &str) -> &str {
    if host.ends_with(']') {
        return host;
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => name,
        Some((name, port)) if name.ends_with(']') && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
