use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::{
    dto::dashboard_dto::DashboardResponse, error::Result, middleware::auth::AuthUser, AppState,
};

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Pipeline counts and the coming week", body = DashboardResponse),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let summary = state.dashboard_service.summary(user.id).await?;
    Ok(Json(summary))
}
