#![allow(dead_code)]

use async_trait::async_trait;
use blog_api::{
    AppState, RoleRegistry,
    config::AppConfig,
    models::{
        Blog, Comment, CreateBlogRequest, CreateCommentRequest, Like, LikeToggle, ListOptions,
        UpdateBlogRequest, User,
    },
    repository::{BlogFilter, CommentFilter, Repository, Sort},
};
use chrono::Utc;
use sqlx::error::{DatabaseError, ErrorKind};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// --- Mock unique-violation error ---

/// Stand-in for the store's uniqueness-conflict error, carrying the violated
/// constraint name exactly as Postgres would.
#[derive(Debug)]
pub struct MockUniqueViolation {
    constraint: &'static str,
}

impl fmt::Display for MockUniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate key value violates unique constraint \"{}\"", self.constraint)
    }
}

impl StdError for MockUniqueViolation {}

impl DatabaseError for MockUniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }
}

fn unique_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(MockUniqueViolation { constraint }))
}

// --- MOCK REPOSITORY IMPLEMENTATION ---

/// In-memory repository. Handlers rely on the `Repository` trait, so tests drive
/// them through this stateful implementation: the unique-title rule and the
/// like-toggle parity behave exactly as the real store's constraints make them.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub blogs: Mutex<HashMap<Uuid, Blog>>,
    pub comments: Mutex<HashMap<Uuid, Comment>>,
    pub likes: Mutex<HashMap<Uuid, Like>>,
}

impl MockRepo {
    pub fn seed_user(&self, id: Uuid, role: &str) {
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                email: format!("{}@example.com", role),
                role: role.to_string(),
            },
        );
    }

    pub fn like_count(&self, post_id: Uuid, user_id: Uuid) -> usize {
        self.likes
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.post_id == post_id && l.user_id == user_id)
            .count()
    }
}

fn page<T: Clone>(mut rows: Vec<T>, options: &ListOptions) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let rows = rows
        .drain(..)
        .skip(options.offset() as usize)
        .take(options.limit as usize)
        .collect();
    (rows, total)
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    // --- Blogs ---

    async fn create_blog(
        &self,
        req: &CreateBlogRequest,
        created_by: Uuid,
    ) -> Result<Blog, sqlx::Error> {
        let mut blogs = self.blogs.lock().unwrap();
        if blogs.values().any(|b| b.title == req.title) {
            return Err(unique_violation("blogs_title_key"));
        }
        let now = Utc::now();
        let blog = Blog {
            id: Uuid::new_v4(),
            title: req.title.clone(),
            subject: req.subject.clone(),
            description: req.description.clone(),
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        blogs.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn list_blogs(
        &self,
        filter: &BlogFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Blog>, i64), sqlx::Error> {
        let mut rows: Vec<Blog> = self
            .blogs
            .lock()
            .unwrap()
            .values()
            .filter(|b| filter.title.as_ref().is_none_or(|t| &b.title == t))
            .filter(|b| filter.subject.as_ref().is_none_or(|s| &b.subject == s))
            .cloned()
            .collect();
        match sort.column {
            "title" => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            "subject" => rows.sort_by(|a, b| a.subject.cmp(&b.subject)),
            "updated_at" => rows.sort_by_key(|r| r.updated_at),
            _ => rows.sort_by_key(|r| r.created_at),
        }
        if sort.descending {
            rows.reverse();
        }
        Ok(page(rows, options))
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        Ok(self.blogs.lock().unwrap().get(&id).cloned())
    }

    async fn update_blog(
        &self,
        id: Uuid,
        req: &UpdateBlogRequest,
        updated_by: Uuid,
    ) -> Result<Option<Blog>, sqlx::Error> {
        let mut blogs = self.blogs.lock().unwrap();
        if let Some(title) = &req.title {
            if blogs.values().any(|b| b.id != id && &b.title == title) {
                return Err(unique_violation("blogs_title_key"));
            }
        }
        Ok(blogs.get_mut(&id).map(|blog| {
            if let Some(title) = &req.title {
                blog.title = title.clone();
            }
            if let Some(subject) = &req.subject {
                blog.subject = subject.clone();
            }
            if let Some(description) = &req.description {
                blog.description = description.clone();
            }
            blog.updated_by = Some(updated_by);
            blog.updated_at = Utc::now();
            blog.clone()
        }))
    }

    async fn delete_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        Ok(self.blogs.lock().unwrap().remove(&id))
    }

    // --- Comments ---

    async fn create_comment(&self, req: &CreateCommentRequest) -> Result<Comment, sqlx::Error> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            text: req.text.clone(),
            post_id: req.post_id,
            user_id: req.user_id,
            created_at: now,
            updated_at: now,
        };
        self.comments
            .lock()
            .unwrap()
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn list_comments(
        &self,
        filter: &CommentFilter,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Comment>, i64), sqlx::Error> {
        let mut rows: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .values()
            .filter(|c| filter.text.as_ref().is_none_or(|t| &c.text == t))
            .cloned()
            .collect();
        match sort.column {
            "text" => rows.sort_by(|a, b| a.text.cmp(&b.text)),
            "updated_at" => rows.sort_by_key(|r| r.updated_at),
            _ => rows.sort_by_key(|r| r.created_at),
        }
        if sort.descending {
            rows.reverse();
        }
        Ok(page(rows, options))
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.comments.lock().unwrap().get(&id).cloned())
    }

    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.comments.lock().unwrap().get_mut(&id).map(|comment| {
            comment.text = text.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.comments.lock().unwrap().remove(&id))
    }

    // --- Likes ---

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, sqlx::Error> {
        let mut likes = self.likes.lock().unwrap();
        let existing = likes
            .values()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .map(|l| l.id);
        match existing {
            Some(id) => {
                likes.remove(&id);
                Ok(LikeToggle::Removed)
            }
            None => {
                let now = Utc::now();
                let like = Like {
                    id: Uuid::new_v4(),
                    post_id,
                    user_id,
                    created_at: now,
                    updated_at: now,
                };
                likes.insert(like.id, like.clone());
                Ok(LikeToggle::Created(like))
            }
        }
    }

    async fn list_likes(
        &self,
        options: &ListOptions,
        sort: Sort,
    ) -> Result<(Vec<Like>, i64), sqlx::Error> {
        let mut rows: Vec<Like> = self.likes.lock().unwrap().values().cloned().collect();
        match sort.column {
            "updated_at" => rows.sort_by_key(|r| r.updated_at),
            _ => rows.sort_by_key(|r| r.created_at),
        }
        if sort.descending {
            rows.reverse();
        }
        Ok(page(rows, options))
    }

    async fn get_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error> {
        Ok(self.likes.lock().unwrap().get(&id).cloned())
    }

    async fn delete_like(&self, id: Uuid) -> Result<Option<Like>, sqlx::Error> {
        Ok(self.likes.lock().unwrap().remove(&id))
    }
}

// --- TEST UTILITIES ---

pub const USER_ID: Uuid = Uuid::from_u128(123);
pub const ADMIN_ID: Uuid = Uuid::from_u128(456);

/// Creates an AppState around a shared mock repository, seeded with one 'user'
/// and one 'admin' identity.
pub fn test_state(repo: Arc<MockRepo>) -> AppState {
    repo.seed_user(USER_ID, "user");
    repo.seed_user(ADMIN_ID, "admin");
    AppState {
        repo,
        roles: RoleRegistry::new(),
        config: AppConfig::default(),
    }
}

pub fn regular_user() -> blog_api::auth::AuthUser {
    blog_api::auth::AuthUser {
        id: USER_ID,
        role: "user".to_string(),
    }
}

pub fn admin_user() -> blog_api::auth::AuthUser {
    blog_api::auth::AuthUser {
        id: ADMIN_ID,
        role: "admin".to_string(),
    }
}
