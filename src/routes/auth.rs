use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::auth_dto::{
        AuthResponse, AuthUserDto, LoginPayload, MeResponse, OkResponse, RegisterPayload,
    },
    error::{AppJson, Result},
    middleware::auth::resolve_session,
    models::user::User,
    utils::token::{expired_session_cookie, session_cookie, sign_session},
    AppState,
};

/// Adds a fresh session cookie for `user` to the jar.
fn issue_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar> {
    let ttl = state.config.session_ttl();
    let token = sign_session(
        user.id,
        &user.email,
        state.clock.now(),
        ttl,
        &state.config.jwt_secret,
    )?;
    Ok(jar.add(session_cookie(token, ttl, state.config.cookie_secure)))
}

fn auth_response(user: User) -> Json<AuthResponse> {
    Json(AuthResponse {
        ok: true,
        user: AuthUserDto {
            id: user.id,
            email: user.email,
        },
    })
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created, session cookie set", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Throttled")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.register(payload).await?;
    let jar = issue_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, auth_response(user)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Throttled")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.login(payload).await?;
    let jar = issue_session(&state, jar, &user)?;
    tracing::info!(user_id = %user.id, "signed in");
    Ok((jar, auth_response(user)))
}

/// Never fails on a missing or bad session; the caller just gets `user: null`.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses((status = 200, description = "Current user or null", body = MeResponse))
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let user = match resolve_session(&jar, &headers, &state.config.jwt_secret) {
        Ok(session) => state.auth_service.me(session.id).await?,
        Err(_) => None,
    };
    Ok(Json(MeResponse { user }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cookie cleared", body = OkResponse))
)]
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(expired_session_cookie(state.config.cookie_secure)),
        Json(OkResponse { ok: true }),
    )
}
