//! Route definitions for content versioning.
//!
//! ```text
//! KEY-SCOPED (prefix /content/{content_type}/{content_id}):
//! POST   /version                             create_version
//! GET    /current                             get_current_version
//! GET    /published                           get_published_version
//! GET    /history                             get_version_history
//! GET    /timeline                            get_version_timeline
//! GET    /audit                               list_content_audit (?limit, offset)
//! GET    /version/{version}                   get_specific_version
//! DELETE /version/{version}                   delete_version
//! GET    /version/{version}/history           get_version_audit
//! POST   /version/{version}/publish           publish_version
//! POST   /version/{version}/unpublish         unpublish_version
//! POST   /rollback/{target_version}           rollback_to_version
//! GET    /compare                             compare_versions (?version1, version2)
//! GET    /statistics                          get_version_statistics
//!
//! CROSS-KEY:
//! POST   /bulk                                bulk_create_versions
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::versioning;
use crate::state::AppState;

/// Versioning routes, mounted at `/versioning`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/content/{content_type}/{content_id}", content_router())
        .route("/bulk", post(versioning::bulk_create_versions))
}

/// Routes scoped to one content key.
fn content_router() -> Router<AppState> {
    Router::new()
        .route("/version", post(versioning::create_version))
        .route("/current", get(versioning::get_current_version))
        .route("/published", get(versioning::get_published_version))
        .route("/history", get(versioning::get_version_history))
        .route("/timeline", get(versioning::get_version_timeline))
        .route("/audit", get(versioning::list_content_audit))
        .route(
            "/version/{version}",
            get(versioning::get_specific_version).delete(versioning::delete_version),
        )
        .route(
            "/version/{version}/history",
            get(versioning::get_version_audit),
        )
        .route(
            "/version/{version}/publish",
            post(versioning::publish_version),
        )
        .route(
            "/version/{version}/unpublish",
            post(versioning::unpublish_version),
        )
        .route(
            "/rollback/{target_version}",
            post(versioning::rollback_to_version),
        )
        .route("/compare", get(versioning::compare_versions))
        .route("/statistics", get(versioning::get_version_statistics))
}
