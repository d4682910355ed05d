pub mod domain;
pub mod gateway;
pub mod navigation;
pub mod ports;
pub mod progress;
pub mod quiz;
pub mod recommendations;
pub mod store;

pub use domain::{
    Course, CourseDetails, CourseSelection, Difficulty, Lesson, NotificationPreferences,
    PreferenceKey, QuizQuestion, Recommendation, User, View, ALL_COURSES,
};
pub use gateway::{ContentGateway, GatewayError};
pub use navigation::Navigator;
pub use ports::{PortError, PortResult, StructuredGenerationService, StructuredRequest};
pub use progress::toggle_lesson;
pub use quiz::{QuizError, QuizPhase, QuizReport, QuizSession, QuizTicket, Resolution};
pub use recommendations::{RecommendationError, RecommendationFeed, RecommendationTicket};
pub use store::CourseStore;
