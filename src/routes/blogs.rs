use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Blog Router Module
///
/// Binds the blog CRUD endpoints to their handlers. Mutating endpoints require
/// the `blog` action token, reads require `getBlogs`; both checks run inside the
/// handlers against the role registry, after the authentication layer above this
/// router has resolved the caller's identity.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        // POST /blogs — create (title must be unique; duplicates yield 409).
        // GET  /blogs?title=..&subject=..&sortBy=..&limit=..&page=..
        .route("/blogs", post(handlers::create_blog).get(handlers::list_blogs))
        // GET    /blogs/{id} — single blog, 404 when absent.
        // PATCH  /blogs/{id} — partial update, at least one field required.
        // DELETE /blogs/{id} — removes the blog, 204 on success.
        .route(
            "/blogs/{id}",
            get(handlers::get_blog)
                .patch(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
}
