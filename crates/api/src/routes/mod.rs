pub mod health;
pub mod versioning;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /versioning/content/{content_type}/{content_id}/...   versioned content (auth required)
/// /versioning/bulk                                      bulk create (auth required)
/// ```
///
/// See [`versioning`] for the full per-key route table.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/versioning", versioning::router())
}
