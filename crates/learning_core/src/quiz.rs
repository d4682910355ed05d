//! crates/learning_core/src/quiz.rs
//!
//! The quiz session state machine for one lesson at a time.
//!
//! ```text
//! Idle ──start──▶ Generating ──resolve(non-empty)──▶ Ready ──submit──▶ Graded
//!                      │                              │  ▲               │
//!                      └──resolve(empty)──▶ Failed    └──┘ answer        │
//!   ▲                                       │                            │
//!   └────────────── close (Ready/Failed) ───┴────────── continue ────────┘
//! ```
//!
//! Changing lessons resets to `Idle` from any phase. Each generation request is
//! tagged with a [`QuizTicket`]; a response carrying any other ticket is dropped.

use crate::domain::QuizQuestion;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Idle,
    Generating,
    Ready,
    Failed,
    Graded,
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizPhase::Idle => "idle",
            QuizPhase::Generating => "generating",
            QuizPhase::Ready => "ready",
            QuizPhase::Failed => "failed",
            QuizPhase::Graded => "graded",
        };
        f.write_str(name)
    }
}

/// Identifies one in-flight generation request and the lesson it was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizTicket {
    pub lesson_id: String,
    pub request_id: Uuid,
}

/// What happened to a generation result handed to [`QuizSession::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Ready,
    Failed,
    /// The ticket no longer matches the session; the result was discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("No lesson is active")]
    NoActiveLesson,
    #[error("A quiz is already being generated")]
    AlreadyGenerating,
    #[error("Cannot {action} while the quiz is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: QuizPhase,
    },
    #[error("Question {0} is not part of this quiz")]
    UnknownQuestion(i64),
    #[error("Question {question_id} has {options} options, {option} is out of range")]
    OptionOutOfRange {
        question_id: i64,
        option: usize,
        options: usize,
    },
    #[error("{answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
}

/// Per-question outcome shown once a quiz is graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionFeedback {
    pub question_id: i64,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuestionFeedback {
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.correct_answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub feedback: Vec<QuestionFeedback>,
}

impl QuizReport {
    pub fn is_perfect(&self) -> bool {
        self.score == self.total
    }
}

//=========================================================================================
// QuizSession
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    lesson_id: Option<String>,
    phase: QuizPhase,
    questions: Vec<QuizQuestion>,
    /// Question id to selected option. Keys are always ids of `questions`.
    answers: BTreeMap<i64, usize>,
    score: Option<usize>,
    pending: Option<QuizTicket>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_lesson(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: Some(lesson_id.into()),
            ..Self::default()
        }
    }

    pub fn lesson_id(&self) -> Option<&str> {
        self.lesson_id.as_deref()
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<i64, usize> {
        &self.answers
    }

    pub fn score(&self) -> Option<usize> {
        self.score
    }

    pub fn pending(&self) -> Option<&QuizTicket> {
        self.pending.as_ref()
    }

    /// Scopes the session to another lesson, discarding everything including any
    /// in-flight request.
    pub fn change_lesson(&mut self, lesson_id: Option<String>) {
        if self.pending.is_some() {
            debug!(from = ?self.lesson_id, to = ?lesson_id, "dropping in-flight quiz request");
        }
        *self = Self {
            lesson_id,
            ..Self::default()
        };
    }

    /// Begins generation for the active lesson and returns the ticket the result
    /// must be resolved with.
    pub fn start(&mut self) -> Result<QuizTicket, QuizError> {
        let lesson_id = self.lesson_id.clone().ok_or(QuizError::NoActiveLesson)?;
        if self.phase == QuizPhase::Generating {
            return Err(QuizError::AlreadyGenerating);
        }
        let ticket = QuizTicket {
            lesson_id,
            request_id: Uuid::new_v4(),
        };
        self.phase = QuizPhase::Generating;
        self.questions.clear();
        self.answers.clear();
        self.score = None;
        self.pending = Some(ticket.clone());
        info!(lesson_id = %ticket.lesson_id, request_id = %ticket.request_id, "quiz generation started");
        Ok(ticket)
    }

    /// Applies a generation result if `ticket` is still the one being waited on.
    pub fn resolve(&mut self, ticket: &QuizTicket, questions: Vec<QuizQuestion>) -> Resolution {
        if self.phase != QuizPhase::Generating || self.pending.as_ref() != Some(ticket) {
            info!(
                lesson_id = %ticket.lesson_id,
                request_id = %ticket.request_id,
                "discarding stale quiz response"
            );
            return Resolution::Stale;
        }
        self.pending = None;
        if questions.is_empty() {
            self.phase = QuizPhase::Failed;
            Resolution::Failed
        } else {
            self.questions = questions;
            self.phase = QuizPhase::Ready;
            Resolution::Ready
        }
    }

    /// Records or replaces the answer to one question.
    pub fn select_answer(&mut self, question_id: i64, option: usize) -> Result<(), QuizError> {
        self.expect_phase(QuizPhase::Ready, "answer")?;
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(QuizError::UnknownQuestion(question_id))?;
        if option >= question.options.len() {
            return Err(QuizError::OptionOutOfRange {
                question_id,
                option,
                options: question.options.len(),
            });
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == QuizPhase::Ready && self.unanswered() == 0
    }

    fn unanswered(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| !self.answers.contains_key(&q.id))
            .count()
    }

    /// Grades the quiz. Requires every loaded question to be answered.
    pub fn submit(&mut self) -> Result<usize, QuizError> {
        self.expect_phase(QuizPhase::Ready, "submit")?;
        let missing = self.unanswered();
        if missing > 0 {
            return Err(QuizError::Incomplete {
                answered: self.questions.len() - missing,
                total: self.questions.len(),
            });
        }
        let score = self
            .questions
            .iter()
            .filter(|q| {
                self.answers
                    .get(&q.id)
                    .is_some_and(|&selected| q.is_correct(selected))
            })
            .count();
        self.score = Some(score);
        self.phase = QuizPhase::Graded;
        info!(score, total = self.questions.len(), "quiz graded");
        Ok(score)
    }

    /// Leaves a graded quiz and returns to the lesson.
    pub fn continue_lesson(&mut self) -> Result<(), QuizError> {
        self.expect_phase(QuizPhase::Graded, "continue")?;
        self.reset_keeping_lesson();
        Ok(())
    }

    /// Dismisses a loaded or failed quiz.
    pub fn close(&mut self) -> Result<(), QuizError> {
        match self.phase {
            QuizPhase::Ready | QuizPhase::Failed => {
                self.reset_keeping_lesson();
                Ok(())
            }
            phase => Err(QuizError::InvalidTransition {
                action: "close",
                phase,
            }),
        }
    }

    /// The graded view, available only in [`QuizPhase::Graded`].
    pub fn report(&self) -> Option<QuizReport> {
        let score = self.score.filter(|_| self.phase == QuizPhase::Graded)?;
        let feedback = self
            .questions
            .iter()
            .map(|q| QuestionFeedback {
                question_id: q.id,
                selected: self.answers.get(&q.id).copied(),
                correct_answer: q.correct_answer,
                explanation: q.explanation.clone(),
            })
            .collect();
        Some(QuizReport {
            score,
            total: self.questions.len(),
            feedback,
        })
    }

    fn reset_keeping_lesson(&mut self) {
        let lesson_id = self.lesson_id.take();
        self.change_lesson(lesson_id);
    }

    fn expect_phase(&self, expected: QuizPhase, action: &'static str) -> Result<(), QuizError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                action,
                phase: self.phase,
            })
        }
    }
}
