//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{
        AnswerRequest, CatalogQuery, CatalogResponse, CourseResponse, DashboardResponse,
        DifficultyPayload, LessonResponse, NavigateRequest, PlayerResponse, PreferenceKeyPayload,
        PreferencesResponse, QuizPhasePayload, QuizQuestionResponse, QuizStateResponse,
        RecommendationResponse, RecommendationsResponse, RefreshRecommendationsRequest,
        SelectCourseRequest, SelectLessonRequest, SettingsResponse, TogglePreferenceRequest,
        UserResponse, ViewPayload,
    },
    quiz_task::quiz_generation_process,
    recommendation_task::spawn_recommendation_refresh,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use learning_core::{CourseSelection, Navigator, QuizError};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard_handler,
        catalog_handler,
        navigate_handler,
        select_course_handler,
        select_lesson_handler,
        player_handler,
        toggle_lesson_handler,
        quiz_state_handler,
        start_quiz_handler,
        answer_handler,
        submit_quiz_handler,
        continue_quiz_handler,
        close_quiz_handler,
        recommendations_handler,
        refresh_recommendations_handler,
        settings_handler,
        toggle_preference_handler,
    ),
    components(schemas(
        AnswerRequest,
        CatalogResponse,
        CourseResponse,
        DashboardResponse,
        DifficultyPayload,
        LessonResponse,
        NavigateRequest,
        PlayerResponse,
        PreferenceKeyPayload,
        PreferencesResponse,
        QuizPhasePayload,
        QuizQuestionResponse,
        QuizStateResponse,
        RecommendationResponse,
        RecommendationsResponse,
        RefreshRecommendationsRequest,
        SelectCourseRequest,
        SelectLessonRequest,
        SettingsResponse,
        TogglePreferenceRequest,
        UserResponse,
        ViewPayload,
    )),
    tags(
        (name = "Learning Portal API", description = "Courses, lesson progress, AI quizzes and recommendations.")
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

/// Maps a rejected quiz transition onto an HTTP status.
fn quiz_rejection(e: QuizError) -> HandlerError {
    let status = match e {
        QuizError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
        QuizError::OptionOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        QuizError::NoActiveLesson
        | QuizError::AlreadyGenerating
        | QuizError::InvalidTransition { .. }
        | QuizError::Incomplete { .. } => StatusCode::CONFLICT,
    };
    (status, e.to_string())
}

fn player_view(navigator: &Navigator) -> PlayerResponse {
    PlayerResponse {
        view: navigator.view().into(),
        course: navigator.active_course().map(CourseResponse::from),
        lesson: navigator.active_lesson().map(LessonResponse::from),
        quiz: QuizStateResponse::from(navigator.quiz()),
    }
}

//=========================================================================================
// Dashboard and Catalog
//=========================================================================================

/// The dashboard: learner summary, enrolled courses and AI recommendations.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard data", body = DashboardResponse))
)]
pub async fn dashboard_handler(State(app_state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let courses = {
        let navigator = app_state.navigator.lock().await;
        navigator
            .store()
            .courses()
            .iter()
            .map(CourseResponse::from)
            .collect()
    };
    let recommendations = RecommendationsResponse::from(&*app_state.recommendations.lock().await);
    Json(DashboardResponse {
        user: UserResponse::from(&app_state.user),
        courses,
        recommendations,
    })
}

/// The course catalog, optionally filtered by category.
#[utoipa::path(
    get,
    path = "/courses",
    params(CatalogQuery),
    responses((status = 200, description = "Catalog", body = CatalogResponse))
)]
pub async fn catalog_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse> {
    let navigator = app_state.navigator.lock().await;
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    Json(CatalogResponse {
        categories: navigator
            .store()
            .categories()
            .into_iter()
            .map(String::from)
            .collect(),
        courses: navigator
            .courses_in_category(category)
            .into_iter()
            .map(CourseResponse::from)
            .collect(),
    })
}

//=========================================================================================
// Navigation
//=========================================================================================

#[utoipa::path(
    post,
    path = "/navigation/view",
    request_body = NavigateRequest,
    responses((status = 200, description = "Navigation applied", body = PlayerResponse))
)]
pub async fn navigate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NavigateRequest>,
) -> Json<PlayerResponse> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.navigate(payload.view.into());
    Json(player_view(&navigator))
}

/// Selects a course, or the whole catalog with `"all"`.
#[utoipa::path(
    post,
    path = "/navigation/course",
    request_body = SelectCourseRequest,
    responses((status = 200, description = "Selection applied", body = PlayerResponse))
)]
pub async fn select_course_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SelectCourseRequest>,
) -> Json<PlayerResponse> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.select_course(CourseSelection::from(payload.course_id.as_str()));
    Json(player_view(&navigator))
}

#[utoipa::path(
    post,
    path = "/navigation/lesson",
    request_body = SelectLessonRequest,
    responses((status = 200, description = "Lesson focused", body = PlayerResponse))
)]
pub async fn select_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SelectLessonRequest>,
) -> Json<PlayerResponse> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.select_lesson(&payload.lesson_id);
    Json(player_view(&navigator))
}

/// The course player: active course, focused lesson and quiz state.
#[utoipa::path(
    get,
    path = "/player",
    responses((status = 200, description = "Player state", body = PlayerResponse))
)]
pub async fn player_handler(State(app_state): State<Arc<AppState>>) -> Json<PlayerResponse> {
    let navigator = app_state.navigator.lock().await;
    Json(player_view(&navigator))
}

/// Flips a lesson's completion flag in the selected course.
#[utoipa::path(
    post,
    path = "/lessons/{lesson_id}/toggle",
    params(("lesson_id" = String, Path, description = "Lesson within the selected course")),
    responses(
        (status = 200, description = "Updated course", body = CourseResponse),
        (status = 409, description = "No course is selected")
    )
)]
pub async fn toggle_lesson_handler(
    State(app_state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<CourseResponse>, HandlerError> {
    let mut navigator = app_state.navigator.lock().await;
    navigator
        .toggle_lesson(&lesson_id)
        .map(|course| Json(CourseResponse::from(course)))
        .ok_or_else(|| (StatusCode::CONFLICT, "No course is selected".to_string()))
}

//=========================================================================================
// Quiz Session
//=========================================================================================

#[utoipa::path(
    get,
    path = "/quiz",
    responses((status = 200, description = "Quiz state", body = QuizStateResponse))
)]
pub async fn quiz_state_handler(State(app_state): State<Arc<AppState>>) -> Json<QuizStateResponse> {
    let navigator = app_state.navigator.lock().await;
    Json(QuizStateResponse::from(navigator.quiz()))
}

/// Starts generating a quiz for the focused lesson. Poll `GET /quiz` for the result.
#[utoipa::path(
    post,
    path = "/quiz/start",
    responses(
        (status = 202, description = "Generation started", body = QuizStateResponse),
        (status = 409, description = "Already generating, or no lesson to quiz on")
    )
)]
pub async fn start_quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let (ticket, topic, state) = {
        let mut navigator = app_state.navigator.lock().await;
        let (ticket, topic) = navigator.start_quiz().map_err(quiz_rejection)?;
        (ticket, topic, QuizStateResponse::from(navigator.quiz()))
    };
    info!(lesson_id = %ticket.lesson_id, %topic, "spawning quiz generation");
    tokio::spawn(quiz_generation_process(app_state.clone(), ticket, topic));
    Ok((StatusCode::ACCEPTED, Json(state)))
}

/// Selects or changes the answer to one question.
#[utoipa::path(
    put,
    path = "/quiz/answers",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = QuizStateResponse),
        (status = 404, description = "Unknown question"),
        (status = 409, description = "Quiz is not accepting answers"),
        (status = 422, description = "Option out of range")
    )
)]
pub async fn answer_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<QuizStateResponse>, HandlerError> {
    let mut navigator = app_state.navigator.lock().await;
    navigator
        .quiz_mut()
        .select_answer(payload.question_id, payload.option)
        .map_err(quiz_rejection)?;
    Ok(Json(QuizStateResponse::from(navigator.quiz())))
}

#[utoipa::path(
    post,
    path = "/quiz/submit",
    responses(
        (status = 200, description = "Quiz graded", body = QuizStateResponse),
        (status = 409, description = "Unanswered questions or nothing to grade")
    )
)]
pub async fn submit_quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<QuizStateResponse>, HandlerError> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.quiz_mut().submit().map_err(quiz_rejection)?;
    Ok(Json(QuizStateResponse::from(navigator.quiz())))
}

#[utoipa::path(
    post,
    path = "/quiz/continue",
    responses(
        (status = 200, description = "Back to the lesson", body = QuizStateResponse),
        (status = 409, description = "Quiz is not graded")
    )
)]
pub async fn continue_quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<QuizStateResponse>, HandlerError> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.quiz_mut().continue_lesson().map_err(quiz_rejection)?;
    Ok(Json(QuizStateResponse::from(navigator.quiz())))
}

#[utoipa::path(
    post,
    path = "/quiz/close",
    responses(
        (status = 200, description = "Quiz dismissed", body = QuizStateResponse),
        (status = 409, description = "Nothing to close")
    )
)]
pub async fn close_quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<QuizStateResponse>, HandlerError> {
    let mut navigator = app_state.navigator.lock().await;
    navigator.quiz_mut().close().map_err(quiz_rejection)?;
    Ok(Json(QuizStateResponse::from(navigator.quiz())))
}

//=========================================================================================
// Recommendations
//=========================================================================================

#[utoipa::path(
    get,
    path = "/recommendations",
    responses((status = 200, description = "Recommendation feed", body = RecommendationsResponse))
)]
pub async fn recommendations_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<RecommendationsResponse> {
    Json(RecommendationsResponse::from(&*app_state.recommendations.lock().await))
}

#[utoipa::path(
    post,
    path = "/recommendations/refresh",
    request_body = RefreshRecommendationsRequest,
    responses(
        (status = 202, description = "Refresh started", body = RecommendationsResponse),
        (status = 409, description = "A refresh is already running")
    )
)]
pub async fn refresh_recommendations_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRecommendationsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let interests = payload
        .interests
        .unwrap_or_else(|| app_state.config.refresh_interests.clone());
    spawn_recommendation_refresh(app_state.clone(), interests)
        .await
        .map_err(|e| {
            warn!("Rejected recommendation refresh: {}", e);
            (StatusCode::CONFLICT, e.to_string())
        })?;
    let feed = RecommendationsResponse::from(&*app_state.recommendations.lock().await);
    Ok((StatusCode::ACCEPTED, Json(feed)))
}

//=========================================================================================
// Settings
//=========================================================================================

#[utoipa::path(
    get,
    path = "/settings",
    responses((status = 200, description = "Profile and preferences", body = SettingsResponse))
)]
pub async fn settings_handler(State(app_state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    let preferences = *app_state.preferences.lock().await;
    Json(SettingsResponse {
        user: UserResponse::from(&app_state.user),
        preferences: preferences.into(),
    })
}

#[utoipa::path(
    post,
    path = "/settings/toggle",
    request_body = TogglePreferenceRequest,
    responses((status = 200, description = "Updated preferences", body = PreferencesResponse))
)]
pub async fn toggle_preference_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<TogglePreferenceRequest>,
) -> Json<PreferencesResponse> {
    let mut preferences = app_state.preferences.lock().await;
    preferences.toggle(payload.key.into());
    Json((*preferences).into())
}
