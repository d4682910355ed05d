//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser UI and the portal API.
//! Domain types stay serialization-free; everything on the wire is declared here.

use chrono::NaiveDate;
use learning_core::{
    Course, Difficulty, Lesson, NotificationPreferences, PreferenceKey, QuizPhase, QuizQuestion,
    QuizSession, Recommendation, RecommendationFeed, User, View,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Enums mirrored on the wire
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewPayload {
    Dashboard,
    Courses,
    Player,
    Settings,
}

impl From<ViewPayload> for View {
    fn from(value: ViewPayload) -> Self {
        match value {
            ViewPayload::Dashboard => View::Dashboard,
            ViewPayload::Courses => View::Courses,
            ViewPayload::Player => View::Player,
            ViewPayload::Settings => View::Settings,
        }
    }
}

impl From<View> for ViewPayload {
    fn from(value: View) -> Self {
        match value {
            View::Dashboard => ViewPayload::Dashboard,
            View::Courses => ViewPayload::Courses,
            View::Player => ViewPayload::Player,
            View::Settings => ViewPayload::Settings,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum DifficultyPayload {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<Difficulty> for DifficultyPayload {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Beginner => DifficultyPayload::Beginner,
            Difficulty::Intermediate => DifficultyPayload::Intermediate,
            Difficulty::Advanced => DifficultyPayload::Advanced,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhasePayload {
    Idle,
    Generating,
    Ready,
    Failed,
    Graded,
}

impl From<QuizPhase> for QuizPhasePayload {
    fn from(value: QuizPhase) -> Self {
        match value {
            QuizPhase::Idle => QuizPhasePayload::Idle,
            QuizPhase::Generating => QuizPhasePayload::Generating,
            QuizPhase::Ready => QuizPhasePayload::Ready,
            QuizPhase::Failed => QuizPhasePayload::Failed,
            QuizPhase::Graded => QuizPhasePayload::Graded,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PreferenceKeyPayload {
    EmailNotifications,
    PushNotifications,
    MarketingEmails,
    TwoFactor,
    DarkMode,
}

impl From<PreferenceKeyPayload> for PreferenceKey {
    fn from(value: PreferenceKeyPayload) -> Self {
        match value {
            PreferenceKeyPayload::EmailNotifications => PreferenceKey::EmailNotifications,
            PreferenceKeyPayload::PushNotifications => PreferenceKey::PushNotifications,
            PreferenceKeyPayload::MarketingEmails => PreferenceKey::MarketingEmails,
            PreferenceKeyPayload::TwoFactor => PreferenceKey::TwoFactor,
            PreferenceKeyPayload::DarkMode => PreferenceKey::DarkMode,
        }
    }
}

//=========================================================================================
// Requests FROM the Client
//=========================================================================================

#[derive(Deserialize, Debug, ToSchema)]
pub struct NavigateRequest {
    pub view: ViewPayload,
}

/// `course_id` may be `"all"` to open the full catalog.
#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectCourseRequest {
    pub course_id: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectLessonRequest {
    pub lesson_id: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: i64,
    pub option: usize,
}

/// Omitting `interests` falls back to the configured refresh interests.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct RefreshRecommendationsRequest {
    pub interests: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct TogglePreferenceRequest {
    pub key: PreferenceKeyPayload,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

//=========================================================================================
// Responses TO the Client
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: String,
    pub title: String,
    pub duration: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub is_completed: bool,
}

impl From<&Lesson> for LessonResponse {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id.clone(),
            title: lesson.title.clone(),
            duration: lesson.duration.clone(),
            video_url: lesson.video_url.clone(),
            content: lesson.content.clone(),
            is_completed: lesson.is_completed(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub thumbnail: String,
    pub instructor: String,
    pub enrolled_at: NaiveDate,
    pub progress: u8,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub lessons: Vec<LessonResponse>,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            thumbnail: course.thumbnail.clone(),
            instructor: course.instructor.clone(),
            enrolled_at: course.enrolled_at,
            progress: course.progress(),
            total_lessons: course.total_lessons(),
            completed_lessons: course.completed_lessons(),
            lessons: course.lessons().iter().map(LessonResponse::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub streak_days: u32,
    pub total_points: u32,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            streak_days: user.streak_days,
            total_points: user.total_points,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct RecommendationResponse {
    pub topic: String,
    pub reason: String,
    pub difficulty: DifficultyPayload,
}

impl From<&Recommendation> for RecommendationResponse {
    fn from(rec: &Recommendation) -> Self {
        Self {
            topic: rec.topic.clone(),
            reason: rec.reason.clone(),
            difficulty: rec.difficulty.into(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub loading: bool,
    /// Interests the listed items were generated for.
    pub interests: Vec<String>,
    /// Interests of the refresh in flight.
    pub pending_interests: Option<Vec<String>>,
    pub items: Vec<RecommendationResponse>,
}

impl From<&RecommendationFeed> for RecommendationsResponse {
    fn from(feed: &RecommendationFeed) -> Self {
        Self {
            loading: feed.is_loading(),
            interests: feed.interests().to_vec(),
            pending_interests: feed.pending_interests().map(<[String]>::to_vec),
            items: feed.items().iter().map(RecommendationResponse::from).collect(),
        }
    }
}

/// A question as shown to the learner. The answer key is withheld until grading.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionResponse {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: Option<usize>,
    pub explanation: Option<String>,
}

impl QuizQuestionResponse {
    fn new(question: &QuizQuestion, reveal: bool) -> Self {
        Self {
            id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            correct_answer: reveal.then_some(question.correct_answer),
            explanation: reveal.then(|| question.explanation.clone()),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizStateResponse {
    pub lesson_id: Option<String>,
    pub phase: QuizPhasePayload,
    pub questions: Vec<QuizQuestionResponse>,
    /// Question id to selected option index.
    pub answers: BTreeMap<i64, usize>,
    pub can_submit: bool,
    pub score: Option<usize>,
    pub total: usize,
    pub is_perfect: Option<bool>,
}

impl From<&QuizSession> for QuizStateResponse {
    fn from(session: &QuizSession) -> Self {
        let report = session.report();
        let reveal = report.is_some();
        Self {
            lesson_id: session.lesson_id().map(String::from),
            phase: session.phase().into(),
            questions: session
                .questions()
                .iter()
                .map(|q| QuizQuestionResponse::new(q, reveal))
                .collect(),
            answers: session.answers().clone(),
            can_submit: session.can_submit(),
            score: session.score(),
            total: session.questions().len(),
            is_perfect: report.as_ref().map(|r| r.is_perfect()),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub view: ViewPayload,
    pub course: Option<CourseResponse>,
    pub lesson: Option<LessonResponse>,
    pub quiz: QuizStateResponse,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DashboardResponse {
    pub user: UserResponse,
    pub courses: Vec<CourseResponse>,
    pub recommendations: RecommendationsResponse,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CatalogResponse {
    pub categories: Vec<String>,
    pub courses: Vec<CourseResponse>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub two_factor: bool,
    pub dark_mode: bool,
}

impl From<NotificationPreferences> for PreferencesResponse {
    fn from(prefs: NotificationPreferences) -> Self {
        Self {
            email_notifications: prefs.email_notifications,
            push_notifications: prefs.push_notifications,
            marketing_emails: prefs.marketing_emails,
            two_factor: prefs.two_factor,
            dark_mode: prefs.dark_mode,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SettingsResponse {
    pub user: UserResponse,
    pub preferences: PreferencesResponse,
}
