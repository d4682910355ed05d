//! crates/learning_core/src/progress.rs
//!
//! The completion/progress engine. A course's summary fields are recomputed
//! from its lesson list on every change and never carried forward.

use crate::domain::Course;
use tracing::debug;

/// Flips the completion flag of `lesson_id` and returns the updated course.
///
/// An identifier that matches no lesson leaves the course untouched.
pub fn toggle_lesson(mut course: Course, lesson_id: &str) -> Course {
    toggle_lesson_in_place(&mut course, lesson_id);
    course
}

/// In-place form of [`toggle_lesson`]. Returns whether a lesson was flipped.
pub fn toggle_lesson_in_place(course: &mut Course, lesson_id: &str) -> bool {
    let Some(lesson) = course.lessons.iter_mut().find(|l| l.id == lesson_id) else {
        debug!(course_id = %course.id, lesson_id, "toggle ignored, lesson not in course");
        return false;
    };
    lesson.is_completed = !lesson.is_completed;
    recompute(course);
    true
}

/// Derives `completed_lessons` and `progress` from the current lesson flags.
pub(crate) fn recompute(course: &mut Course) {
    let completed = course.lessons.iter().filter(|l| l.is_completed).count();
    course.completed_lessons = completed;
    course.progress = percentage(completed, course.lessons.len());
}

/// `round(100 * completed / total)` with halves rounded up, `0` for an empty course.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseDetails, Lesson};
    use chrono::NaiveDate;

    fn course_with(lessons: Vec<Lesson>) -> Course {
        Course::new(
            CourseDetails {
                id: "c1".to_string(),
                title: "Spring Boot".to_string(),
                description: String::new(),
                category: "Backend".to_string(),
                thumbnail: String::new(),
                instructor: "Dr. Sarah Smith".to_string(),
                enrolled_at: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            },
            lessons,
        )
    }

    fn three_lessons() -> Vec<Lesson> {
        vec![
            Lesson::new("l1", "Intro", "15:30").completed(),
            Lesson::new("l2", "REST", "22:15"),
            Lesson::new("l3", "MySQL", "18:45"),
        ]
    }

    fn assert_consistent(course: &Course) {
        let expected = course.lessons().iter().filter(|l| l.is_completed()).count();
        assert_eq!(course.completed_lessons(), expected);
        assert_eq!(
            course.progress(),
            percentage(expected, course.total_lessons())
        );
    }

    #[test]
    fn empty_course_has_zero_progress() {
        let course = course_with(vec![]);
        assert_eq!(course.progress(), 0);
        assert_eq!(course.completed_lessons(), 0);

        let course = toggle_lesson(course, "l1");
        assert_eq!(course.progress(), 0);
    }

    #[test]
    fn construction_derives_summary_from_flags() {
        let course = course_with(three_lessons());
        assert_eq!(course.completed_lessons(), 1);
        assert_eq!(course.progress(), 33);
    }

    #[test]
    fn every_toggle_keeps_summary_consistent() {
        let mut course = course_with(three_lessons());
        for id in ["l2", "l3", "l1", "l2", "l1", "l3", "l2"] {
            course = toggle_lesson(course, id);
            assert_consistent(&course);
        }
        // l1 and l3 toggled twice, l2 three times: only l1 (start) and l2 are done.
        assert_eq!(course.completed_lessons(), 2);
        assert_eq!(course.progress(), 67);
    }

    #[test]
    fn toggling_twice_restores_the_course() {
        let original = course_with(three_lessons());
        let once = toggle_lesson(original.clone(), "l2");
        assert_ne!(once, original);
        assert_eq!(once.progress(), 67);
        let twice = toggle_lesson(once, "l2");
        assert_eq!(twice, original);
    }

    #[test]
    fn unknown_lesson_is_a_no_op() {
        let original = course_with(three_lessons());
        let after = toggle_lesson(original.clone(), "l99");
        assert_eq!(after, original);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 0), 0);
    }
}
