//! crates/learning_core/src/store.rs
//!
//! The in-memory repository that owns the course collection. Lesson toggling is
//! the only mutation it allows.

use crate::domain::Course;
use crate::progress;

#[derive(Debug, Clone, Default)]
pub struct CourseStore {
    courses: Vec<Course>,
}

impl CourseStore {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn first(&self) -> Option<&Course> {
        self.courses.first()
    }

    /// Courses in `category`, or all of them when no category is given.
    pub fn in_category<'a>(&'a self, category: Option<&'a str>) -> impl Iterator<Item = &'a Course> + 'a {
        self.courses
            .iter()
            .filter(move |c| category.map_or(true, |cat| c.category.eq_ignore_ascii_case(cat)))
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for course in &self.courses {
            if !seen.contains(&course.category.as_str()) {
                seen.push(&course.category);
            }
        }
        seen
    }

    /// Toggles a lesson of one course. Unknown course or lesson ids change nothing.
    pub fn toggle_lesson(&mut self, course_id: &str, lesson_id: &str) -> Option<&Course> {
        let course = self.courses.iter_mut().find(|c| c.id == course_id)?;
        progress::toggle_lesson_in_place(course, lesson_id);
        Some(&*course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseDetails, Lesson};
    use chrono::NaiveDate;

    fn course(id: &str, category: &str, lessons: Vec<Lesson>) -> Course {
        Course::new(
            CourseDetails {
                id: id.to_string(),
                title: format!("Course {id}"),
                description: String::new(),
                category: category.to_string(),
                thumbnail: String::new(),
                instructor: "Prof. John Doe".to_string(),
                enrolled_at: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            },
            lessons,
        )
    }

    fn store() -> CourseStore {
        CourseStore::new(vec![
            course("c1", "Backend", vec![Lesson::new("l1", "a", "1:00"), Lesson::new("l2", "b", "2:00")]),
            course("c2", "Frontend", vec![Lesson::new("l1", "c", "3:00")]),
            course("c3", "Backend", vec![]),
        ])
    }

    #[test]
    fn toggle_only_touches_the_named_course() {
        let mut store = store();
        let updated = store.toggle_lesson("c1", "l1").unwrap();
        assert_eq!(updated.progress(), 50);
        assert_eq!(store.get("c2").unwrap().completed_lessons(), 0);
    }

    #[test]
    fn unknown_course_changes_nothing() {
        let mut store = store();
        assert!(store.toggle_lesson("c9", "l1").is_none());
        assert!(store.courses().iter().all(|c| c.completed_lessons() == 0));
    }

    #[test]
    fn filters_by_category() {
        let store = store();
        let backend: Vec<_> = store.in_category(Some("backend")).map(|c| c.id.as_str()).collect();
        assert_eq!(backend, vec!["c1", "c3"]);
        assert_eq!(store.in_category(None).count(), 3);
        assert_eq!(store.categories(), vec!["Backend", "Frontend"]);
    }
}
