use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The caller's canonical identity record in the `users` table. Resolved during
/// authentication; the `role` field feeds the role registry check.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // The RBAC field: 'user' or 'admin'.
    pub role: String,
}

/// Blog
///
/// A blog record from the `blogs` table. The title is unique across all blogs,
/// enforced at write time by the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: String,
    // FK to users.id (creator).
    pub created_by: Uuid,
    // Set on every successful partial update.
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// A comment record from the `comments` table. No uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub post_id: Uuid,
    pub user_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Like
///
/// A like record from the `likes` table. At most one may exist per
/// (post, user) pair, backed by a composite unique index.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Like {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// Trims a required field, rejecting it when empty after trimming.
fn required_trimmed(field: &str, value: String) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::BadRequest(format!("\"{field}\" is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims an optional field, rejecting it when present but empty after trimming.
fn optional_trimmed(field: &str, value: Option<String>) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(ApiError::BadRequest(format!(
                    "\"{field}\" is not allowed to be empty"
                )))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

/// CreateBlogRequest
///
/// Input payload for POST /blogs. All three fields are required and trimmed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateBlogRequest {
    pub title: String,
    pub subject: String,
    pub description: String,
}

impl CreateBlogRequest {
    /// Shape-check before any repository logic runs.
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            title: required_trimmed("title", self.title)?,
            subject: required_trimmed("subject", self.subject)?,
            description: required_trimmed("description", self.description)?,
        })
    }
}

/// UpdateBlogRequest
///
/// Partial update payload for PATCH /blogs/{id}. At least one field must be
/// present; present fields must be non-empty after trimming.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateBlogRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateBlogRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        if self.title.is_none() && self.subject.is_none() && self.description.is_none() {
            return Err(ApiError::BadRequest(
                "\"body\" must have at least 1 key".to_string(),
            ));
        }
        Ok(Self {
            title: optional_trimmed("title", self.title)?,
            subject: optional_trimmed("subject", self.subject)?,
            description: optional_trimmed("description", self.description)?,
        })
    }
}

/// CreateCommentRequest
///
/// Input payload for POST /comments.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCommentRequest {
    pub text: String,
    pub post_id: Uuid,
    pub user_id: Uuid,
}

impl CreateCommentRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            text: required_trimmed("text", self.text)?,
            ..self
        })
    }
}

/// UpdateCommentRequest
///
/// Update payload for PATCH /comments/{id}. `text` is required and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateCommentRequest {
    pub text: String,
}

impl UpdateCommentRequest {
    pub fn validate(self) -> Result<Self, ApiError> {
        Ok(Self {
            text: required_trimmed("text", self.text)?,
        })
    }
}

/// ToggleLikeRequest
///
/// Input payload for POST /likes. The operation is a toggle, not a pure insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ToggleLikeRequest {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

// --- Pagination ---

/// ListOptions
///
/// Pass-through pagination configuration shared by every list endpoint:
/// `sortBy` is `field:(asc|desc)`, `limit` caps the page size, `page` is 1-based.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort_by: Option<String>,
    pub limit: i64,
    pub page: i64,
}

impl ListOptions {
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Clamps raw query values to sane bounds (limit >= 1, page >= 1).
    pub fn new(sort_by: Option<String>, limit: Option<i64>, page: Option<i64>) -> Self {
        Self {
            sort_by,
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).max(1),
            page: page.unwrap_or(1).max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Page
///
/// The response envelope for every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_results: i64,
}

impl<T> Page<T> {
    /// Assembles an envelope; `total_pages` is the ceiling of total/limit.
    pub fn new(results: Vec<T>, total_results: i64, options: &ListOptions) -> Self {
        let total_pages = if total_results == 0 {
            0
        } else {
            (total_results + options.limit - 1) / options.limit
        };
        Self {
            results,
            page: options.page,
            limit: options.limit,
            total_pages,
            total_results,
        }
    }
}

// --- Like toggle outcome ---

/// LikeToggle
///
/// Repository-level outcome of the toggle: either a Like was created for the
/// (post, user) pair, or the pre-existing one was removed.
#[derive(Debug, Clone)]
pub enum LikeToggle {
    Created(Like),
    Removed,
}

/// LikeToggleResponse
///
/// Wire shape for POST /likes: success either way, with the resulting state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LikeToggleResponse {
    /// true when the call created a Like, false when it removed the prior one.
    pub liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_blog_request_trims_fields() {
        let req = CreateBlogRequest {
            title: "  T1  ".to_string(),
            subject: " S ".to_string(),
            description: " D ".to_string(),
        };
        let req = req.validate().unwrap();
        assert_eq!(req.title, "T1");
        assert_eq!(req.subject, "S");
        assert_eq!(req.description, "D");
    }

    #[test]
    fn create_blog_request_rejects_blank_required_field() {
        let req = CreateBlogRequest {
            title: "   ".to_string(),
            subject: "S".to_string(),
            description: "D".to_string(),
        };
        assert!(matches!(req.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn update_blog_request_requires_at_least_one_field() {
        let req = UpdateBlogRequest::default();
        assert!(matches!(req.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn update_blog_request_accepts_single_field() {
        let req = UpdateBlogRequest {
            title: Some("New".to_string()),
            ..UpdateBlogRequest::default()
        };
        let req = req.validate().unwrap();
        assert_eq!(req.title.as_deref(), Some("New"));
        assert!(req.subject.is_none());
    }

    #[test]
    fn update_blog_request_rejects_present_but_empty_field() {
        let req = UpdateBlogRequest {
            subject: Some("  ".to_string()),
            ..UpdateBlogRequest::default()
        };
        assert!(matches!(req.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn update_comment_request_requires_text() {
        let req = UpdateCommentRequest {
            text: "".to_string(),
        };
        assert!(matches!(req.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn page_envelope_math() {
        let options = ListOptions::new(None, Some(10), Some(1));
        let page: Page<Blog> = Page::new(vec![], 0, &options);
        assert_eq!(page.total_pages, 0);

        let page: Page<Blog> = Page::new(vec![], 10, &options);
        assert_eq!(page.total_pages, 1);

        let page: Page<Blog> = Page::new(vec![], 11, &options);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn list_options_clamp_defaults() {
        let options = ListOptions::new(None, None, None);
        assert_eq!(options.limit, 10);
        assert_eq!(options.page, 1);
        assert_eq!(options.offset(), 0);

        let options = ListOptions::new(None, Some(0), Some(-3));
        assert_eq!(options.limit, 1);
        assert_eq!(options.page, 1);

        let options = ListOptions::new(None, Some(5), Some(3));
        assert_eq!(options.offset(), 10);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let like = Like::default();
        let json = serde_json::to_string(&like).unwrap();
        assert!(json.contains(r#""postId""#));
        assert!(json.contains(r#""userId""#));
        assert!(json.contains(r#""createdAt""#));

        let page: Page<Like> = Page::default();
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains(r#""totalPages""#));
        assert!(json.contains(r#""totalResults""#));
    }
}
