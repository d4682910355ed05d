//! crates/learning_core/src/navigation.rs
//!
//! Top-level navigation and selection state. The navigator owns the course store
//! and the quiz session so that lesson changes and quiz resets can never drift apart.

use crate::domain::{Course, CourseSelection, Lesson, View};
use crate::quiz::{QuizError, QuizSession, QuizTicket};
use crate::store::CourseStore;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: View,
    selected_course: Option<String>,
    active_lesson: Option<String>,
    store: CourseStore,
    quiz: QuizSession,
}

impl Navigator {
    pub fn new(store: CourseStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected_course_id(&self) -> Option<&str> {
        self.selected_course.as_deref()
    }

    pub fn store(&self) -> &CourseStore {
        &self.store
    }

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizSession {
        &mut self.quiz
    }

    /// Switches screens. Leaving the player drops the course selection and its quiz.
    pub fn navigate(&mut self, view: View) {
        self.view = view;
        if view != View::Player {
            self.selected_course = None;
            self.focus_lesson(None);
        }
    }

    pub fn select_course(&mut self, selection: CourseSelection) {
        match selection {
            CourseSelection::AllCourses => self.navigate(View::Courses),
            CourseSelection::Course(course_id) => {
                self.selected_course = Some(course_id);
                self.view = View::Player;
                let first = self
                    .active_course()
                    .and_then(|c| c.lessons().first())
                    .map(|l| l.id.clone());
                // Lesson ids repeat across courses, so reset even if the id is unchanged.
                self.active_lesson = first.clone();
                self.quiz.change_lesson(first);
            }
        }
    }

    /// The course on display: the selected one, or the first course when the
    /// selection is absent or unknown. `None` only for an empty catalog.
    pub fn active_course(&self) -> Option<&Course> {
        self.selected_course
            .as_deref()
            .and_then(|id| self.store.get(id))
            .or_else(|| self.store.first())
    }

    /// The focused lesson of the active course, falling back to its first lesson.
    pub fn active_lesson(&self) -> Option<&Lesson> {
        let course = self.active_course()?;
        self.active_lesson
            .as_deref()
            .and_then(|id| course.lesson(id))
            .or_else(|| course.lessons().first())
    }

    /// Focuses a lesson of the active course. Moving to a different lesson resets the quiz.
    pub fn select_lesson(&mut self, lesson_id: &str) {
        let resolved = self.active_course().and_then(|course| {
            course
                .lesson(lesson_id)
                .or_else(|| course.lessons().first())
                .map(|l| l.id.clone())
        });
        self.focus_lesson(resolved);
    }

    fn focus_lesson(&mut self, lesson_id: Option<String>) {
        if self.quiz.lesson_id() != lesson_id.as_deref() {
            self.quiz.change_lesson(lesson_id.clone());
        }
        self.active_lesson = lesson_id;
    }

    /// Flips a lesson of the active course. Does nothing when no course is selected.
    pub fn toggle_lesson(&mut self, lesson_id: &str) -> Option<&Course> {
        if self.selected_course.is_none() {
            debug!(lesson_id, "toggle ignored, no course selected");
            return None;
        }
        let course_id = self.active_course()?.id.clone();
        self.store.toggle_lesson(&course_id, lesson_id)
    }

    pub fn courses_in_category<'a>(&'a self, category: Option<&'a str>) -> Vec<&'a Course> {
        self.store.in_category(category).collect()
    }

    /// Starts a quiz for the active lesson, returning the ticket and the topic to ask about.
    ///
    /// Quizzes live in the player, so a course must be selected.
    pub fn start_quiz(&mut self) -> Result<(QuizTicket, String), QuizError> {
        if self.selected_course.is_none() {
            debug!("quiz start ignored, no course selected");
            return Err(QuizError::NoActiveLesson);
        }
        let topic = self
            .active_lesson()
            .map(|l| l.title.clone())
            .ok_or(QuizError::NoActiveLesson)?;
        let lesson_id = self.active_lesson().map(|l| l.id.clone());
        if self.quiz.lesson_id() != lesson_id.as_deref() {
            self.quiz.change_lesson(lesson_id);
        }
        let ticket = self.quiz.start()?;
        Ok((ticket, topic))
    }
}
