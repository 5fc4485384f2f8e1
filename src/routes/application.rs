use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::application_dto::{
        AdvanceStagePayload, AdvanceStageResponse, ApplicationDetail, ApplicationDetailResponse,
        ApplicationListResponse, ApplicationSummary, CreateApplicationPayload,
        CreateApplicationResponse, CreatedApplicationRef, TimelineEventDto,
    },
    error::{AppJson, Result},
    middleware::auth::AuthUser,
    routes::parse_id,
    AppState,
};

#[utoipa::path(
    get,
    path = "/applications",
    responses(
        (status = 200, description = "Caller's applications, most recently updated first", body = ApplicationListResponse),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let items = state.application_service.list(user.id).await?;
    Ok(Json(ApplicationListResponse {
        items: items.into_iter().map(ApplicationSummary::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application created", body = CreateApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "No session")
    )
)]
#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateApplicationPayload>,
) -> Result<impl IntoResponse> {
    let id = state.application_service.create(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateApplicationResponse {
            application: CreatedApplicationRef { id },
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = String, Path, description = "Application ID (UUID)")),
    responses(
        (status = 200, description = "Application with its timeline", body = ApplicationDetailResponse),
        (status = 404, description = "Unknown or not owned")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let application = state.application_service.get_owned(user.id, id).await?;
    let timeline = state.application_service.timeline(id).await?;
    Ok(Json(ApplicationDetailResponse {
        application: ApplicationDetail::from(application),
        timeline: timeline.into_iter().map(TimelineEventDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/applications/{id}/timeline",
    params(("id" = String, Path, description = "Application ID (UUID)")),
    request_body = AdvanceStagePayload,
    responses(
        (status = 200, description = "Stage recorded", body = AdvanceStageResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown or not owned")
    )
)]
#[axum::debug_handler]
pub async fn advance_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AdvanceStagePayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (application, event) = state
        .application_service
        .advance_stage(user.id, id, payload)
        .await?;
    Ok(Json(AdvanceStageResponse {
        application: ApplicationDetail::from(application),
        event: TimelineEventDto::from(event),
    }))
}
