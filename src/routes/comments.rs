use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Comment Router Module
///
/// Ordinary CRUD, no uniqueness constraint. Mutations require the `comment`
/// action token, reads require `getComments`.
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        // POST /comments — create (text, postId, userId all required).
        // GET  /comments?text=..&sortBy=..&limit=..&page=..
        .route(
            "/comments",
            post(handlers::create_comment).get(handlers::list_comments),
        )
        // GET    /comments/{id}
        // PATCH  /comments/{id} — text required and non-empty.
        // DELETE /comments/{id}
        .route(
            "/comments/{id}",
            get(handlers::get_comment)
                .patch(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
}
