use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::{
        auth_dto::OkResponse,
        calendar_dto::{
            CalendarEventDto, CalendarEventListResponse, CalendarEventResponse,
            CalendarRangeQuery, CreateCalendarEventPayload, UpdateCalendarEventPayload,
        },
    },
    error::{AppJson, Result},
    middleware::auth::AuthUser,
    routes::parse_id,
    AppState,
};

#[utoipa::path(
    get,
    path = "/calendar-events",
    params(
        ("start" = Option<String>, Query, description = "Range start (ISO 8601)"),
        ("end" = Option<String>, Query, description = "Range end, exclusive (ISO 8601)")
    ),
    responses((status = 200, description = "Events starting in range", body = CalendarEventListResponse))
)]
#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CalendarRangeQuery>,
) -> Result<impl IntoResponse> {
    let items = state.calendar_service.list(user.id, &query).await?;
    Ok(Json(CalendarEventListResponse {
        items: items.into_iter().map(CalendarEventDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/calendar-events/{id}",
    params(("id" = String, Path, description = "Calendar event ID (UUID)")),
    responses(
        (status = 200, description = "Calendar event", body = CalendarEventResponse),
        (status = 404, description = "Unknown or not owned")
    )
)]
#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let event = state.calendar_service.get_owned(user.id, id).await?;
    Ok(Json(CalendarEventResponse {
        item: CalendarEventDto::from(event),
    }))
}

#[utoipa::path(
    post,
    path = "/calendar-events",
    request_body = CreateCalendarEventPayload,
    responses(
        (status = 201, description = "Calendar event created", body = CalendarEventResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(payload): AppJson<CreateCalendarEventPayload>,
) -> Result<impl IntoResponse> {
    let event = state.calendar_service.create(user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CalendarEventResponse {
            item: CalendarEventDto::from(event),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/calendar-events/{id}",
    params(("id" = String, Path, description = "Calendar event ID (UUID)")),
    request_body = UpdateCalendarEventPayload,
    responses(
        (status = 200, description = "Calendar event updated", body = CalendarEventResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown or not owned")
    )
)]
#[axum::debug_handler]
pub async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateCalendarEventPayload>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let event = state.calendar_service.update(user.id, id, payload).await?;
    Ok(Json(CalendarEventResponse {
        item: CalendarEventDto::from(event),
    }))
}

#[utoipa::path(
    delete,
    path = "/calendar-events/{id}",
    params(("id" = String, Path, description = "Calendar event ID (UUID)")),
    responses(
        (status = 200, description = "Calendar event deleted", body = OkResponse),
        (status = 404, description = "Unknown or not owned")
    )
)]
#[axum::debug_handler]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    state.calendar_service.delete(user.id, id).await?;
    Ok(Json(OkResponse { ok: true }))
}
