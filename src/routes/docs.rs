use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{
    application_dto::{
        AdvanceStagePayload, AdvanceStageResponse, ApplicationDetail, ApplicationDetailResponse,
        ApplicationListResponse, ApplicationSummary, CreateApplicationPayload,
        CreateApplicationResponse, CreatedApplicationRef, TimelineEventDto,
    },
    auth_dto::{
        AuthResponse, AuthUserDto, LoginPayload, MeResponse, MeUser, OkResponse, ProfileBrief,
        RegisterPayload,
    },
    calendar_dto::{
        CalendarEventDto, CalendarEventListResponse, CalendarEventResponse,
        CreateCalendarEventPayload, UpdateCalendarEventPayload,
    },
    dashboard_dto::{DashboardResponse, UpcomingItem, UpcomingSource},
    profile_dto::{
        AvatarResponse, ProfileDto, ProfileResponse, ProfileUserDto, UpdateProfilePayload,
        UpdateProfileResponse,
    },
};
use crate::models::{
    application::{AppStatus, WorkSetup},
    calendar_event::{EventType, LocationMode},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health::health,
        super::auth::register,
        super::auth::login,
        super::auth::me,
        super::auth::logout,
        super::application::list_applications,
        super::application::create_application,
        super::application::get_application,
        super::application::advance_stage,
        super::calendar::list_events,
        super::calendar::get_event,
        super::calendar::create_event,
        super::calendar::update_event,
        super::calendar::delete_event,
        super::profile::get_profile,
        super::profile::update_profile,
        super::profile::upload_avatar,
        super::dashboard::get_dashboard,
    ),
    components(schemas(
        AppStatus,
        WorkSetup,
        EventType,
        LocationMode,
        RegisterPayload,
        LoginPayload,
        AuthUserDto,
        AuthResponse,
        ProfileBrief,
        MeUser,
        MeResponse,
        OkResponse,
        CreateApplicationPayload,
        AdvanceStagePayload,
        ApplicationSummary,
        ApplicationDetail,
        TimelineEventDto,
        ApplicationListResponse,
        ApplicationDetailResponse,
        CreatedApplicationRef,
        CreateApplicationResponse,
        AdvanceStageResponse,
        CreateCalendarEventPayload,
        UpdateCalendarEventPayload,
        CalendarEventDto,
        CalendarEventListResponse,
        CalendarEventResponse,
        UpdateProfilePayload,
        ProfileDto,
        ProfileUserDto,
        ProfileResponse,
        UpdateProfileResponse,
        AvatarResponse,
        UpcomingSource,
        UpcomingItem,
        DashboardResponse,
    )),
    tags((name = "job-tracker", description = "Job application tracker API"))
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/api-docs/openapi.json",
    responses((status = 200, description = "OpenAPI document"))
)]
#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/auth/register",
            "/auth/me",
            "/applications",
            "/applications/{id}/timeline",
            "/calendar-events/{id}",
            "/profile/avatar",
            "/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
