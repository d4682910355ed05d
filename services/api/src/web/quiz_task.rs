//! services/api/src/web/quiz_task.rs
//!
//! This module contains the asynchronous "worker" responsible for generating a
//! quiz and handing the result back to the quiz session.

use crate::web::state::AppState;
use learning_core::{QuizTicket, Resolution};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Generates questions for `topic` and resolves them against `ticket`.
///
/// The navigator lock is not held while the request is in flight, so the learner
/// can keep navigating. If the lesson changed in the meantime the result is stale
/// and the session ignores it.
pub async fn quiz_generation_process(app_state: Arc<AppState>, ticket: QuizTicket, topic: String) {
    let start_time = Instant::now();
    let questions = app_state
        .gateway
        .generate_quiz(&topic, app_state.config.quiz_difficulty)
        .await;
    info!(
        lesson_id = %ticket.lesson_id,
        count = questions.len(),
        "⏱️ Quiz generation took: {:?}",
        start_time.elapsed()
    );

    let mut navigator = app_state.navigator.lock().await;
    match navigator.quiz_mut().resolve(&ticket, questions) {
        Resolution::Ready => info!(lesson_id = %ticket.lesson_id, "quiz ready"),
        Resolution::Failed => warn!(lesson_id = %ticket.lesson_id, "quiz unavailable"),
        Resolution::Stale => {}
    }
}
