use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, normalize_storage_error},
    models::{
        Blog, Comment, CreateBlogRequest, CreateCommentRequest, Like, LikeToggle,
        LikeToggleResponse, ListOptions, Page, ToggleLikeRequest, UpdateBlogRequest,
        UpdateCommentRequest,
    },
    repository::{
        BLOG_SORT_FIELDS, BlogFilter, COMMENT_SORT_FIELDS, CommentFilter, LIKE_SORT_FIELDS,
        parse_sort,
    },
    roles::Action,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// BlogListQuery
///
/// Accepted query parameters for GET /blogs: exact-match filters plus the
/// pass-through pagination options.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    pub title: Option<String>,
    pub subject: Option<String>,
    /// Sort option in the form `field:(asc|desc)`, e.g. `title:asc`.
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// CommentListQuery
///
/// Accepted query parameters for GET /comments.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CommentListQuery {
    pub text: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

/// LikeListQuery
///
/// Accepted query parameters for GET /likes (pagination only, no filter).
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LikeListQuery {
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

// --- Blog Handlers ---

/// create_blog
///
/// Persists a new blog for the authenticated caller. A duplicate title surfaces
/// as 409 Conflict through the storage-error normalization rule.
#[utoipa::path(
    post,
    path = "/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Created", body = Blog),
        (status = 409, description = "Duplicate title")
    )
)]
pub async fn create_blog(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    state.roles.authorize(&user, Action::Blog)?;
    let payload = payload.validate()?;

    let blog = state
        .repo
        .create_blog(&payload, user.id)
        .await
        .map_err(|e| normalize_storage_error("Blog", e))?;
    Ok((StatusCode::CREATED, Json(blog)))
}

/// list_blogs
///
/// Returns a page of blogs matching the filter, wrapped in the standard
/// `{results, page, limit, totalPages, totalResults}` envelope.
#[utoipa::path(
    get,
    path = "/blogs",
    params(BlogListQuery),
    responses((status = 200, description = "Filtered blogs", body = Page<Blog>))
)]
pub async fn list_blogs(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> Result<Json<Page<Blog>>, ApiError> {
    state.roles.authorize(&user, Action::GetBlogs)?;

    let sort = parse_sort(query.sort_by.as_deref(), BLOG_SORT_FIELDS)?;
    let options = ListOptions::new(query.sort_by, query.limit, query.page);
    let filter = BlogFilter {
        title: query.title,
        subject: query.subject,
    };

    let (results, total) = state
        .repo
        .list_blogs(&filter, &options, sort)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(Page::new(results, total, &options)))
}

/// get_blog
#[utoipa::path(
    get,
    path = "/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_blog(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Blog>, ApiError> {
    state.roles.authorize(&user, Action::GetBlogs)?;

    let blog = state
        .repo
        .get_blog(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    Ok(Json(blog))
}

/// update_blog
///
/// Merges the present fields into the existing record and stamps the caller as
/// the last updater. The payload must carry at least one field (validated before
/// the repository is touched).
#[utoipa::path(
    patch,
    path = "/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 404, description = "Not found"),
        (status = 409, description = "Duplicate title")
    )
)]
pub async fn update_blog(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<Json<Blog>, ApiError> {
    state.roles.authorize(&user, Action::Blog)?;
    let payload = payload.validate()?;

    let blog = state
        .repo
        .update_blog(id, &payload, user.id)
        .await
        .map_err(|e| normalize_storage_error("Blog", e))?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    Ok(Json(blog))
}

/// delete_blog
#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_blog(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.roles.authorize(&user, Action::Blog)?;

    state
        .repo
        .delete_blog(id)
        .await
        .map_err(|e| normalize_storage_error("Blog", e))?
        .ok_or_else(|| ApiError::not_found("Blog"))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Comment Handlers ---

/// create_comment
#[utoipa::path(
    post,
    path = "/comments",
    request_body = CreateCommentRequest,
    responses((status = 201, description = "Created", body = Comment))
)]
pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    state.roles.authorize(&user, Action::Comment)?;
    let payload = payload.validate()?;

    let comment = state
        .repo
        .create_comment(&payload)
        .await
        .map_err(|e| normalize_storage_error("Comment", e))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// list_comments
#[utoipa::path(
    get,
    path = "/comments",
    params(CommentListQuery),
    responses((status = 200, description = "Filtered comments", body = Page<Comment>))
)]
pub async fn list_comments(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Page<Comment>>, ApiError> {
    state.roles.authorize(&user, Action::GetComments)?;

    let sort = parse_sort(query.sort_by.as_deref(), COMMENT_SORT_FIELDS)?;
    let options = ListOptions::new(query.sort_by, query.limit, query.page);
    let filter = CommentFilter { text: query.text };

    let (results, total) = state
        .repo
        .list_comments(&filter, &options, sort)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(Page::new(results, total, &options)))
}

/// get_comment
#[utoipa::path(
    get,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Found", body = Comment),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Comment>, ApiError> {
    state.roles.authorize(&user, Action::GetComments)?;

    let comment = state
        .repo
        .get_comment(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    Ok(Json(comment))
}

/// update_comment
///
/// Replaces the comment text; `text` is required and non-empty.
#[utoipa::path(
    patch,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    state.roles.authorize(&user, Action::Comment)?;
    let payload = payload.validate()?;

    let comment = state
        .repo
        .update_comment(id, &payload.text)
        .await
        .map_err(|e| normalize_storage_error("Comment", e))?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    Ok(Json(comment))
}

/// delete_comment
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.roles.authorize(&user, Action::Comment)?;

    state
        .repo
        .delete_comment(id)
        .await
        .map_err(|e| normalize_storage_error("Comment", e))?
        .ok_or_else(|| ApiError::not_found("Comment"))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Like Handlers ---

/// toggle_like
///
/// The one notable piece of logic: a toggle, not a pure insert. The first call
/// for a (post, user) pair creates a Like, the next removes it, and so on.
/// Succeeds either way; the body reports which way the toggle went.
#[utoipa::path(
    post,
    path = "/likes",
    request_body = ToggleLikeRequest,
    responses((status = 201, description = "Toggled", body = LikeToggleResponse))
)]
pub async fn toggle_like(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ToggleLikeRequest>,
) -> Result<(StatusCode, Json<LikeToggleResponse>), ApiError> {
    state.roles.authorize(&user, Action::Like)?;

    let outcome = state
        .repo
        .toggle_like(payload.post_id, payload.user_id)
        .await
        .map_err(|e| normalize_storage_error("Like", e))?;

    let liked = matches!(outcome, LikeToggle::Created(_));
    Ok((StatusCode::CREATED, Json(LikeToggleResponse { liked })))
}

/// list_likes
#[utoipa::path(
    get,
    path = "/likes",
    params(LikeListQuery),
    responses((status = 200, description = "Likes", body = Page<Like>))
)]
pub async fn list_likes(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LikeListQuery>,
) -> Result<Json<Page<Like>>, ApiError> {
    state.roles.authorize(&user, Action::GetLikes)?;

    let sort = parse_sort(query.sort_by.as_deref(), LIKE_SORT_FIELDS)?;
    let options = ListOptions::new(query.sort_by, query.limit, query.page);

    let (results, total) = state
        .repo
        .list_likes(&options, sort)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(Page::new(results, total, &options)))
}

/// get_like
#[utoipa::path(
    get,
    path = "/likes/{id}",
    params(("id" = Uuid, Path, description = "Like id")),
    responses(
        (status = 200, description = "Found", body = Like),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_like(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Like>, ApiError> {
    state.roles.authorize(&user, Action::GetLikes)?;

    let like = state
        .repo
        .get_like(id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Like"))?;
    Ok(Json(like))
}

/// delete_like
#[utoipa::path(
    delete,
    path = "/likes/{id}",
    params(("id" = Uuid, Path, description = "Like id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_like(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.roles.authorize(&user, Action::Like)?;

    state
        .repo
        .delete_like(id)
        .await
        .map_err(|e| normalize_storage_error("Like", e))?
        .ok_or_else(|| ApiError::not_found("Like"))?;
    Ok(StatusCode::NO_CONTENT)
}
