//! crates/learning_core/src/domain.rs
//!
//! Defines the pure, core data structures for the learning portal.
//! These structs are independent of any transport or serialization format.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Selector value that stands for "the whole catalog" rather than a single course.
pub const ALL_COURSES: &str = "all";

//=========================================================================================
// Courses and Lessons
//=========================================================================================

/// An atomic unit of course content with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Display label such as `"15:30"`.
    pub duration: String,
    pub video_url: Option<String>,
    pub content: Option<String>,
    pub(crate) is_completed: bool,
}

impl Lesson {
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration: duration.into(),
            video_url: None,
            content: None,
            is_completed: false,
        }
    }

    pub fn with_video(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = Some(video_url.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Marks the lesson as completed at load time. After load the flag only
    /// changes through [`crate::progress::toggle_lesson`].
    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}

/// The descriptive part of a course, everything except its lessons and the
/// summary fields derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub thumbnail: String,
    pub instructor: String,
    pub enrolled_at: NaiveDate,
}

/// A structured collection of lessons with aggregate progress.
///
/// `completed_lessons` and `progress` are always derived from the lesson list,
/// so they can only be read, never set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub thumbnail: String,
    pub instructor: String,
    pub enrolled_at: NaiveDate,
    pub(crate) lessons: Vec<Lesson>,
    pub(crate) completed_lessons: usize,
    pub(crate) progress: u8,
}

impl Course {
    /// Builds a course and derives its summary fields from `lessons`.
    pub fn new(details: CourseDetails, lessons: Vec<Lesson>) -> Self {
        let mut course = Self {
            id: details.id,
            title: details.title,
            description: details.description,
            category: details.category,
            thumbnail: details.thumbnail,
            instructor: details.instructor,
            enrolled_at: details.enrolled_at,
            lessons,
            completed_lessons: 0,
            progress: 0,
        };
        crate::progress::recompute(&mut course);
        course
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    pub fn completed_lessons(&self) -> usize {
        self.completed_lessons
    }

    /// Completion percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        self.progress
    }
}

//=========================================================================================
// Learner
//=========================================================================================

/// The learner profile. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub streak_days: u32,
    pub total_points: u32,
}

/// The switches shown on the account settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPreferences {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub two_factor: bool,
    pub dark_mode: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            marketing_emails: true,
            two_factor: false,
            dark_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    EmailNotifications,
    PushNotifications,
    MarketingEmails,
    TwoFactor,
    DarkMode,
}

impl NotificationPreferences {
    /// Flips one switch and returns its new value.
    pub fn toggle(&mut self, key: PreferenceKey) -> bool {
        let flag = match key {
            PreferenceKey::EmailNotifications => &mut self.email_notifications,
            PreferenceKey::PushNotifications => &mut self.push_notifications,
            PreferenceKey::MarketingEmails => &mut self.marketing_emails,
            PreferenceKey::TwoFactor => &mut self.two_factor,
            PreferenceKey::DarkMode => &mut self.dark_mode,
        };
        *flag = !*flag;
        *flag
    }
}

//=========================================================================================
// AI-generated content
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not one of Beginner, Intermediate, Advanced")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    /// Matches the exact tag only. Generated content with any other spelling is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// A single multiple-choice question produced by the content gateway.
///
/// `id` is unique within one generated quiz only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub topic: String,
    pub reason: String,
    pub difficulty: Difficulty,
}

//=========================================================================================
// Navigation
//=========================================================================================

/// The top-level screens of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Courses,
    Player,
    Settings,
}

/// What the learner picked from a course list: one course, or the full catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseSelection {
    AllCourses,
    Course(String),
}

impl From<&str> for CourseSelection {
    fn from(value: &str) -> Self {
        if value == ALL_COURSES {
            CourseSelection::AllCourses
        } else {
            CourseSelection::Course(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_exact_tags_only() {
        assert_eq!("Advanced".parse::<Difficulty>(), Ok(Difficulty::Advanced));
        assert!("advanced".parse::<Difficulty>().is_err());
        assert!("Expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn sentinel_selects_whole_catalog() {
        assert_eq!(CourseSelection::from("all"), CourseSelection::AllCourses);
        assert_eq!(
            CourseSelection::from("c1"),
            CourseSelection::Course("c1".to_string())
        );
    }

    #[test]
    fn toggling_a_preference_reports_new_value() {
        let mut prefs = NotificationPreferences::default();
        assert!(prefs.toggle(PreferenceKey::DarkMode));
        assert!(!prefs.toggle(PreferenceKey::DarkMode));
        assert!(!prefs.toggle(PreferenceKey::EmailNotifications));
    }
}
