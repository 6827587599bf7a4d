use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::{ApiError, SESSION_EXPIRED_MESSAGE},
    repository::RepositoryState,
};

/// Claims
///
/// The payload structure expected inside a JSON Web Token (JWT). These claims
/// are signed by the server's secret and validated upon every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user, used to fetch the user's role.
    pub sub: Uuid,
    /// Expiration Time (exp): timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers use it for the
/// role registry check and to record the creator/updater of a resource.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// The caller's role ('user' or 'admin'), input to the authorization check.
    pub role: String,
}

/// AuthUser extractor
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any protected handler. Authentication (this extractor) stays cleanly
/// separated from authorization (the role registry check in the handler).
///
/// The flow:
/// 1. Dependency resolution: repository and config pulled from application state.
/// 2. Local bypass: development-time access via the 'x-user-id' header.
/// 3. Token validation: Bearer token extraction and JWT decoding.
/// 4. DB lookup: the user's current role and existence.
///
/// Rejection: 401 Unauthorized on any failure, with a dedicated message when the
/// token is merely expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass: authenticate by providing a known user id in
        // the 'x-user-id' header. Guarded by the Env check; the id must still map
        // to an actual user row so roles are correctly loaded.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        if let Ok(Some(user)) = repo.get_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                role: user.role,
                            });
                        }
                    }
                }
            }
        }
        // In Production, or when the bypass did not resolve a user, fall through
        // to the standard JWT validation flow.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_string()))?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                // The most common failure for a valid-but-old token; callers get a
                // message telling them to log in again rather than a generic denial.
                ErrorKind::ExpiredSignature => {
                    ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.to_string())
                }
                _ => ApiError::Unauthorized("invalid token".to_string()),
            }
        })?;

        let user_id = token_data.claims.sub;

        // Final verification: the token may be valid while the user no longer exists.
        let user = repo
            .get_user(user_id)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
