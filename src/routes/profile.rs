use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::profile_dto::{AvatarResponse, ProfileResponse, UpdateProfilePayload, UpdateProfileResponse},
    error::{AppJson, Error, Result},
    middleware::auth::AuthUser,
    services::avatar_store::{check_avatar, AvatarStore},
    AppState,
};

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Caller and their profile", body = ProfileResponse),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let user = state.profile_service.get(user.id).await?;
    Ok(Json(ProfileResponse { user }))
}

#[utoipa::path(
    patch,
    path = "/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    let user = state.profile_service.update(user.id, payload).await?;
    Ok(Json(UpdateProfileResponse { ok: true, user }))
}

#[utoipa::path(
    post,
    path = "/profile/avatar",
    request_body(content = String, content_type = "multipart/form-data", description = "Image in field `file`"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing file, wrong type or too large"),
        (status = 500, description = "Object store failure")
    )
)]
#[axum::debug_handler]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        let ext = check_avatar(&content_type, data.len())?;

        let key = AvatarStore::object_key(user.id, state.clock.now(), ext);
        let avatar_url = state.avatar_store.put(&key, &data).await?;
        state.profile_service.set_avatar(user.id, &avatar_url).await?;

        tracing::info!(user_id = %user.id, %key, "avatar uploaded");
        return Ok(Json(AvatarResponse {
            ok: true,
            avatar_url,
        }));
    }
    Err(Error::BadRequest(
        "File is required (field name: file)".to_string(),
    ))
}
