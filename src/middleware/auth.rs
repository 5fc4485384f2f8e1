use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::utils::token::{verify_session, SESSION_COOKIE};
use crate::AppState;

/// The signed-in caller, inserted as a request extension by
/// [`require_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn resolve_session(jar: &CookieJar, headers: &HeaderMap, secret: &str) -> Result<AuthUser> {
    let token = session_token(jar, headers)
        .ok_or_else(|| Error::Unauthorized("Unauthorized".to_string()))?;
    let claims = verify_session(&token, secret)?;
    Ok(AuthUser {
        id: claims.user_id()?,
        email: claims.email,
    })
}

pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let user = resolve_session(&jar, req.headers(), &state.config.jwt_secret).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), error = %e, "session rejected");
        Error::Unauthorized("Unauthorized".to_string())
    })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::token::sign_session;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;
    use chrono::{Duration, Utc};

    const SECRET: &str = "test-secret";

    #[test]
    fn cookie_wins_over_bearer() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&jar, &headers).as_deref(), Some("from-cookie"));
        assert_eq!(
            session_token(&CookieJar::new(), &headers).as_deref(),
            Some("from-header")
        );
        assert_eq!(session_token(&CookieJar::new(), &HeaderMap::new()), None);
    }

    #[test]
    fn valid_token_resolves_user() {
        let id = Uuid::new_v4();
        let token = sign_session(id, "a@b.co", Utc::now(), Duration::days(7), SECRET).unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        let user = resolve_session(&jar, &HeaderMap::new(), SECRET).unwrap();
        assert_eq!(user, AuthUser { id, email: "a@b.co".into() });
    }

    #[test]
    fn wrong_secret_or_expired_token_is_rejected() {
        let id = Uuid::new_v4();
        let token = sign_session(id, "a@b.co", Utc::now(), Duration::days(7), "other").unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert!(resolve_session(&jar, &HeaderMap::new(), SECRET).is_err());

        let stale = sign_session(
            id,
            "a@b.co",
            Utc::now() - Duration::days(30),
            Duration::days(7),
            SECRET,
        )
        .unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, stale));
        assert!(resolve_session(&jar, &HeaderMap::new(), SECRET).is_err());
    }
}
