use crate::{
    error::ApiError,
    models::{
        Blog, Comment, CreateBlogRequest, CreateCommentRequest, Like, LikeToggle, ListOptions,
        UpdateBlogRequest, User,
    },
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

// --- Sorting ---

/// Sort
///
/// A validated sort specification: a whitelisted column plus direction. Built
/// exclusively through `parse_sort`, so raw query strings never reach the SQL text.
#[derive(Debug, Clone, Copy)]
pub struct Sort {
    pub column: &'static str,
    pub descending: bool,
}

impl Sort {
    fn direction(&self) -> &'static str {
        if self.descending { "DESC" } else { "ASC" }
    }
}

/// Wire-name to column mappings accepted by each resource's `sortBy` option.
pub const BLOG_SORT_FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("subject", "subject"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];
pub const COMMENT_SORT_FIELDS: &[(&str, &str)] = &[
    ("text", "text"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];
pub const LIKE_SORT_FIELDS: &[(&str, &str)] =
    &[("createdAt", "created_at"), ("updatedAt", "updated_at")];

/// parse_sort
///
/// Parses the `field:(asc|desc)` option against a per-resource whitelist.
/// Absent input falls back to newest-first. Unknown fields or directions are a
/// validation failure, not a silent default.
pub fn parse_sort(sort_by: Option<&str>, allowed: &'static [(&str, &str)]) -> Result<Sort, ApiError> {
    let Some(raw) = sort_by else {
        return Ok(Sort {
            column: "created_at",
            descending: true,
        });
    };

    let (field, direction) = raw.split_once(':').unwrap_or((raw, "asc"));

    let column = allowed
        .iter()
        .find(|(wire, _)| *wire == field)
        .map(|(_, column)| *column)
        .ok_or_else(|| ApiError::BadRequest(format!("cannot sort by \"{field}\"")))?;

    let descending = match direction {
        "asc" => false,
        "desc" => true,
        other => {
            return Err(ApiError::BadRequest(format!(
                "sort direction must be asc or desc, got \"{other}\""
            )));
        }
    };

    Ok(Sort { column, descending })
}

// --- Filters ---

/// Exact-match filter for the blog listing (by title and/or subject).
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub title: Option<String>,
    pub subject: Option<String>,
}

/// Exact-match filter for the comment listing (by text).
#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub text: Option<String>,
}

// --- Repository trait ---

/// Repository
///
/// The abstract contract for all persistence operations, letting handlers interact
/// with the data layer without knowing the concrete store (Postgres, in-memory mock).
/// Methods return raw `sqlx::Error` so the conflict-normalization rule stays an
/// explicit, separately testable mapping at the transport boundary.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// safely shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users (auth lookup) ---
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    // --- Blogs ---
    async fn create_blog(
        &self,
        req: &CreateBlogRequest,
        created_by: Uuid,
    ) -> Result<Blog, sqlx::Error>;
    // Returns the page of rows plus the total count matching the filter.
    async fn list_blogs(
        &self,
        filter: &BlogFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Blog>, i64), sqlx::Error>;
    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error>;
    // Merges present fields into the existing record; None when no such blog.
    async fn update_blog(
        &self,
        id: Uuid,
        req: &UpdateBlogRequest,
        updated_by: Uuid,
    ) -> Result<Option<Blog>, sqlx::Error>;
    // Removes and returns the record; None when no such blog.
    async fn delete_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error>;

    // --- Comments ---
    async fn create_comment(&self, req: &CreateCommentRequest) -> Result<Comment, sqlx::Error>;
    async fn list_comments(
        &self,
        filter: &CommentFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Comment>, i64), sqlx::Error>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error>;
    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Option<Comment>, sqlx::Error>;
    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error>;

    // --- Likes ---
    // Atomic find-or-create followed by a conditional delete: the toggle.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, sqlx::Error>;
    async fn list_likes(
        &self,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Like>, i64), sqlx::Error>;
    async fn get_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error>;
    async fn delete_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // --- BLOGS ---

    async fn create_blog(
        &self,
        req: &CreateBlogRequest,
        created_by: Uuid,
    ) -> Result<Blog, sqlx::Error> {
        sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, title, subject, description, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.title)
        .bind(&req.subject)
        .bind(&req.description)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    /// Implements filtering with QueryBuilder for safe parameterization; the sort
    /// column is already whitelisted by `parse_sort`, never raw user input.
    async fn list_blogs(
        &self,
        filter: &BlogFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Blog>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM blogs WHERE TRUE");
        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM blogs WHERE TRUE");

        if let Some(title) = &filter.title {
            builder.push(" AND title = ").push_bind(title);
            count.push(" AND title = ").push_bind(title);
        }
        if let Some(subject) = &filter.subject {
            builder.push(" AND subject = ").push_bind(subject);
            count.push(" AND subject = ").push_bind(subject);
        }

        builder.push(format!(" ORDER BY {} {}", sort.column, sort.direction()));
        builder.push(" LIMIT ").push_bind(options.limit);
        builder.push(" OFFSET ").push_bind(options.offset());

        let rows = builder.build_query_as::<Blog>().fetch_all(&self.pool).await?;
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        Ok((rows, total))
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>("SELECT * FROM blogs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Uses COALESCE so only the fields present in the request replace existing
    /// column values, mirroring the partial-update contract.
    async fn update_blog(
        &self,
        id: Uuid,
        req: &UpdateBlogRequest,
        updated_by: Uuid,
    ) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET title = COALESCE($2, title),
                subject = COALESCE($3, subject),
                description = COALESCE($4, description),
                updated_by = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.subject)
        .bind(&req.description)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>("DELETE FROM blogs WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // --- COMMENTS ---

    async fn create_comment(&self, req: &CreateCommentRequest) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, text, post_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&req.text)
        .bind(req.post_id)
        .bind(req.user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_comments(
        &self,
        filter: &CommentFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Comment>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM comments WHERE TRUE");
        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM comments WHERE TRUE");

        if let Some(text) = &filter.text {
            builder.push(" AND text = ").push_bind(text);
            count.push(" AND text = ").push_bind(text);
        }

        builder.push(format!(" ORDER BY {} {}", sort.column, sort.direction()));
        builder.push(" LIMIT ").push_bind(options.limit);
        builder.push(" OFFSET ").push_bind(options.offset());

        let rows = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        Ok((rows, total))
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET text = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>("DELETE FROM comments WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // --- LIKES ---

    /// The toggle's critical section. `ON CONFLICT DO NOTHING RETURNING *` is the
    /// atomic find-or-create: a returned row means this call inserted the Like;
    /// no row means the (post, user) pair already had one, which we then delete.
    /// Two concurrent toggles cannot both insert thanks to the composite unique
    /// index on (post_id, user_id).
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, sqlx::Error> {
        let inserted = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (id, post_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(like) => Ok(LikeToggle::Created(like)),
            None => {
                sqlx::query("DELETE FROM likes WHERE post_id = $1 AND user_id = $2")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
                Ok(LikeToggle::Removed)
            }
        }
    }

    async fn list_likes(
        &self,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Like>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM likes");
        builder.push(format!(" ORDER BY {} {}", sort.column, sort.direction()));
        builder.push(" LIMIT ").push_bind(options.limit);
        builder.push(" OFFSET ").push_bind(options.offset());

        let rows = builder.build_query_as::<Like>().fetch_all(&self.pool).await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes")
            .fetch_one(&self.pool)
            .await?;
        Ok((rows, total))
    }

    async fn get_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error> {
        sqlx::query_as::<_, Like>("SELECT * FROM likes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error> {
        sqlx::query_as::<_, Like>("DELETE FROM likes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
