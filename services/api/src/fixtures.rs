//! services/api/src/fixtures.rs
//!
//! The seeded learner and course catalog served by the in-memory portal.

use chrono::NaiveDate;
use learning_core::{Course, CourseDetails, Lesson, User};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn details(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    seed: &str,
    instructor: &str,
    enrolled_at: NaiveDate,
) -> CourseDetails {
    CourseDetails {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        thumbnail: format!("https://picsum.photos/seed/{seed}/800/600"),
        instructor: instructor.to_string(),
        enrolled_at,
    }
}

pub fn seed_user() -> User {
    User {
        id: "u1".to_string(),
        name: "Alex Johnson".to_string(),
        email: "alex@example.com".to_string(),
        avatar: "https://picsum.photos/seed/alex/100/100".to_string(),
        streak_days: 12,
        total_points: 2450,
    }
}

pub fn seed_courses() -> Vec<Course> {
    vec![
        Course::new(
            details(
                "c1",
                "Full Stack Java Development with Spring Boot",
                "Master enterprise application development using Java, Spring Boot, and React. Learn to build scalable microservices.",
                "Backend",
                "java",
                "Dr. Sarah Smith",
                date(2024, 8, 15),
            ),
            vec![
                Lesson::new("l1", "Introduction to Spring Boot", "15:30")
                    .with_video("mock")
                    .with_content("Spring Boot makes it easy to create stand-alone, production-grade Spring based Applications that you can \"just run\".")
                    .completed(),
                Lesson::new("l2", "Building RESTful APIs", "22:15")
                    .with_video("mock")
                    .with_content("Learn how to design and implement RESTful APIs using Spring MVC, handling HTTP methods and status codes."),
                Lesson::new("l3", "Connecting to MySQL Database", "18:45")
                    .with_video("mock")
                    .with_content("Integrate JPA and Hibernate to perform CRUD operations on a MySQL database."),
            ],
        ),
        Course::new(
            details(
                "c2",
                "Advanced React Patterns & Performance",
                "Take your React skills to the next level. Learn hooks, context, higher-order components, and performance optimization.",
                "Frontend",
                "react",
                "Prof. John Doe",
                date(2024, 9, 1),
            ),
            vec![
                Lesson::new("l1", "React Hooks Deep Dive", "20:00")
                    .with_video("mock")
                    .with_content("Understanding the lifecycle of hooks and how to build custom hooks.")
                    .completed(),
                Lesson::new("l2", "Context API vs Redux", "25:10")
                    .with_video("mock")
                    .with_content("When to use Context API for state management and when to reach for Redux."),
            ],
        ),
        Course::new(
            details(
                "c3",
                "Machine Learning with Python",
                "A comprehensive guide to ML algorithms, data preprocessing, and model deployment.",
                "Data Science",
                "ml",
                "Dr. Alan Turing",
                date(2024, 9, 10),
            ),
            vec![Lesson::new("l1", "Intro to Neural Networks", "12:00")
                .with_video("mock")
                .with_content("Basics of how neural networks function.")],
        ),
        Course::new(
            details(
                "c4",
                "DevOps & CI/CD Pipelines",
                "Automate your deployment workflow with Jenkins, Docker, and Kubernetes.",
                "DevOps",
                "devops",
                "Jane Engineer",
                date(2024, 7, 20),
            ),
            Vec::new(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_progress_is_derived_from_lessons() {
        let courses = seed_courses();
        let progress: Vec<u8> = courses.iter().map(|c| c.progress()).collect();
        assert_eq!(progress, vec![33, 50, 0, 0]);
        assert_eq!(courses[0].enrolled_at, date(2024, 8, 15));
    }
}
