//! Landing page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};

use crate::state::AppState;

/// Template for the landing page.
///
/// Renders `templates/index.html` with a single URL form that posts
/// JSON to `/shorten` and shows the returned short URL.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
struct IndexTemplate {
    version: &'static str,
    base_url: Option<String>,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET /`
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        version: env!("CARGO_PKG_VERSION"),
        base_url: state.base_url.clone(),
    }
}
