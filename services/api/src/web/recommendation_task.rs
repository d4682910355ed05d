//! services/api/src/web/recommendation_task.rs
//!
//! Background refresh of the dashboard's AI recommendations.

use crate::web::state::AppState;
use learning_core::{RecommendationError, RecommendationTicket};
use std::sync::Arc;
use tracing::info;

/// Marks the feed as loading and spawns the request.
///
/// Fails without spawning anything if a refresh is already in flight.
pub async fn spawn_recommendation_refresh(
    app_state: Arc<AppState>,
    interests: Vec<String>,
) -> Result<(), RecommendationError> {
    let ticket = app_state.recommendations.lock().await.refresh(interests)?;
    tokio::spawn(recommendation_process(app_state, ticket));
    Ok(())
}

async fn recommendation_process(app_state: Arc<AppState>, ticket: RecommendationTicket) {
    let items = app_state
        .gateway
        .get_recommendations(ticket.interests.as_slice())
        .await;
    let count = items.len();
    if app_state.recommendations.lock().await.resolve(&ticket, items) {
        info!(count, interests = ?ticket.interests, "recommendations updated");
    }
}
