use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    db::userdb::UserExt,
    error::{ErrorMessage, HttpError},
    models::usermodel::User,
    utils::token,
    AppState,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddleware {
    pub user: User,
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let cookies = cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|token| token.to_owned())
                })
        });

    let token = cookies
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let token_details = token::decode_token(token, app_state.env.jwt_secret.as_bytes())?;

    let user_id = uuid::Uuid::parse_str(&token_details)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = resolve_user(app_state.db_client.get_user(user_id).await)?;

    req.extensions_mut().insert(JWTAuthMiddleware { user });

    Ok(next.run(req).await)
}

/// A lookup failure is a server fault, not a credentials problem; only a
/// genuinely absent row reads as 401.
fn resolve_user(lookup: Result<Option<User>, sqlx::Error>) -> Result<User, HttpError> {
    match lookup {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(HttpError::unauthorized(
            ErrorMessage::UserNoLongerExist.to_string(),
        )),
        Err(e) => {
            tracing::error!("user lookup failed during auth: {}", e);
            Err(HttpError::server_error(
                ErrorMessage::InternalServerError.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tiermodels::SubscriptionTier;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn some_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            subscription_tier: SubscriptionTier::Free,
            subscription_expires_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn a_present_user_passes_through() {
        let user = some_user();
        let resolved = resolve_user(Ok(Some(user.clone()))).unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[test]
    fn a_missing_user_is_unauthorized() {
        let err = resolve_user(Ok(None)).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn a_database_failure_is_a_server_error_not_a_401() {
        let err = resolve_user(Err(sqlx::Error::PoolTimedOut)).unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
