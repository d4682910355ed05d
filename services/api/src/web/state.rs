//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use learning_core::{
    ContentGateway, CourseStore, Course, Navigator, NotificationPreferences, RecommendationFeed,
    User,
};
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// There is a single learner, so the portal state lives here rather than per connection.
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: ContentGateway,
    pub user: User,
    /// View, course selection, course store and the quiz session.
    pub navigator: Mutex<Navigator>,
    pub recommendations: Mutex<RecommendationFeed>,
    pub preferences: Mutex<NotificationPreferences>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        gateway: ContentGateway,
        user: User,
        courses: Vec<Course>,
    ) -> Self {
        Self {
            config,
            gateway,
            user,
            navigator: Mutex::new(Navigator::new(CourseStore::new(courses))),
            recommendations: Mutex::new(RecommendationFeed::new()),
            preferences: Mutex::new(NotificationPreferences::default()),
        }
    }
}
