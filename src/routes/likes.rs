use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Like Router Module
///
/// POST /likes is a toggle: the first call for a (postId, userId) pair creates
/// a Like, the next call removes it. Mutations require the `like` action token,
/// reads require `getLikes`. There is no PATCH: a Like carries no mutable state.
pub fn like_routes() -> Router<AppState> {
    Router::new()
        // POST /likes — toggle for the (postId, userId) pair.
        // GET  /likes?sortBy=..&limit=..&page=..
        .route("/likes", post(handlers::toggle_like).get(handlers::list_likes))
        // GET    /likes/{id}
        // DELETE /likes/{id}
        .route(
            "/likes/{id}",
            get(handlers::get_like).delete(handlers::delete_like),
        )
}
