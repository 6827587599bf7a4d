use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{auth::AuthUser, error::ApiError};

/// Action
///
/// A typed permission token. Each resource endpoint requires exactly one of these;
/// adding a new capability means adding one token here and referencing it at the
/// endpoint, instead of scattering permission strings through route logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Blog,
    GetBlogs,
    Comment,
    GetComments,
    Like,
    GetLikes,
    GetUsers,
    ManageUsers,
}

impl Action {
    /// The wire name of the token, as it appears in role configuration and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Blog => "blog",
            Action::GetBlogs => "getBlogs",
            Action::Comment => "comment",
            Action::GetComments => "getComments",
            Action::Like => "like",
            Action::GetLikes => "getLikes",
            Action::GetUsers => "getUsers",
            Action::ManageUsers => "manageUsers",
        }
    }
}

/// RoleRegistry
///
/// Immutable mapping from role name to the set of permitted action tokens.
/// Built once at startup and carried in the shared application state, so the
/// authorization check stays a pure function over static configuration and is
/// testable in isolation (no ambient globals).
#[derive(Clone)]
pub struct RoleRegistry {
    rights: Arc<HashMap<&'static str, HashSet<Action>>>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleRegistry {
    /// Builds the static role configuration.
    ///
    /// `admin` intentionally carries only the user-management tokens: administrative
    /// users manage accounts, they do not author content.
    pub fn new() -> Self {
        let mut rights: HashMap<&'static str, HashSet<Action>> = HashMap::new();
        rights.insert(
            "user",
            HashSet::from([
                Action::Blog,
                Action::GetBlogs,
                Action::Comment,
                Action::GetComments,
                Action::Like,
                Action::GetLikes,
            ]),
        );
        rights.insert(
            "admin",
            HashSet::from([Action::GetUsers, Action::ManageUsers]),
        );
        Self {
            rights: Arc::new(rights),
        }
    }

    /// is_allowed
    ///
    /// Returns true iff `action` is a member of the role's permitted set.
    /// An unknown role has no permitted set and therefore denies every action.
    pub fn is_allowed(&self, role: &str, action: Action) -> bool {
        self.rights
            .get(role)
            .map(|set| set.contains(&action))
            .unwrap_or(false)
    }

    /// authorize
    ///
    /// The per-request gate: invoked at the top of every handler, before any
    /// repository logic executes. On denial the request short-circuits with 403.
    pub fn authorize(&self, user: &AuthUser, action: Action) -> Result<(), ApiError> {
        if self.is_allowed(&user.role, action) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "role '{}' is not permitted to perform '{}'",
                user.role,
                action.as_str()
            )))
        }
    }
}
