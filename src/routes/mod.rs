/// Router Module Index
///
/// Organizes the application's routing logic into per-resource modules mirroring
/// the external API contract. Every module's router is wrapped by the
/// authentication middleware in `create_router`; authorization (action tokens)
/// is then enforced per handler through the role registry.
/// Blog management and retrieval routes.
pub mod blogs;

/// Comment management and retrieval routes.
pub mod comments;

/// Like toggle and retrieval routes.
pub mod likes;
