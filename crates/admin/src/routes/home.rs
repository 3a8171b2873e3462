//! Embedded admin page.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

/// The discount page with its four cards.
#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub api_key: String,
    pub shop: String,
}

/// Render the admin page.
///
/// The page is public; App Bridge supplies the session token its API calls
/// carry.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let template = HomeTemplate {
        api_key: state.api_key().to_string(),
        shop: state.shop().to_string(),
    };
    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("Template render failed: {e}")))?;
    Ok(Html(html))
}
