pub mod protocol;
pub mod quiz_task;
pub mod recommendation_task;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use recommendation_task::spawn_recommendation_refresh;

/// Builds the complete portal router, including the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/dashboard", get(rest::dashboard_handler))
        .route("/courses", get(rest::catalog_handler))
        .route("/navigation/view", post(rest::navigate_handler))
        .route("/navigation/course", post(rest::select_course_handler))
        .route("/navigation/lesson", post(rest::select_lesson_handler))
        .route("/player", get(rest::player_handler))
        .route("/lessons/{lesson_id}/toggle", post(rest::toggle_lesson_handler))
        .route("/quiz", get(rest::quiz_state_handler))
        .route("/quiz/start", post(rest::start_quiz_handler))
        .route("/quiz/answers", put(rest::answer_handler))
        .route("/quiz/submit", post(rest::submit_quiz_handler))
        .route("/quiz/continue", post(rest::continue_quiz_handler))
        .route("/quiz/close", post(rest::close_quiz_handler))
        .route("/recommendations", get(rest::recommendations_handler))
        .route(
            "/recommendations/refresh",
            post(rest::refresh_recommendations_handler),
        )
        .route("/settings", get(rest::settings_handler))
        .route("/settings/toggle", post(rest::toggle_preference_handler))
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
