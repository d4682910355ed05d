//! crates/learning_core/src/gateway.rs
//!
//! The AI content gateway: builds prompts and output schemas for quiz generation
//! and topic recommendations, then validates whatever comes back before it is
//! allowed to become a domain value.
//!
//! The upstream model is an untrusted data source. Every failure, whether transport,
//! decoding or schema, is a [`GatewayError`] internally and collapses to an empty
//! sequence at the public boundary.

use crate::domain::{Difficulty, QuizQuestion, Recommendation};
use crate::ports::{PortError, StructuredGenerationService, StructuredRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of questions requested per quiz.
pub const QUIZ_LENGTH: usize = 3;
/// Number of topics requested per recommendation call.
pub const RECOMMENDATION_COUNT: usize = 3;

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Upstream failure: {0}")]
    Upstream(#[from] PortError),
    #[error("Payload does not match the schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

impl GatewayError {
    fn kind(&self) -> &'static str {
        match self {
            GatewayError::Upstream(PortError::Timeout(_)) => "timeout",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Malformed(_) => "malformed",
            GatewayError::SchemaViolation(_) => "schema_violation",
        }
    }
}

//=========================================================================================
// Wire records
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizQuestionRecord {
    id: i64,
    question: String,
    options: Vec<String>,
    correct_answer: i64,
    explanation: String,
}

impl QuizQuestionRecord {
    fn into_domain(self) -> Result<QuizQuestion, GatewayError> {
        if self.options.len() < 2 {
            return Err(GatewayError::SchemaViolation(format!(
                "question {} has {} option(s), at least 2 required",
                self.id,
                self.options.len()
            )));
        }
        let correct_answer = usize::try_from(self.correct_answer)
            .ok()
            .filter(|index| *index < self.options.len())
            .ok_or_else(|| {
                GatewayError::SchemaViolation(format!(
                    "question {} has correctAnswer {} outside 0..{}",
                    self.id,
                    self.correct_answer,
                    self.options.len()
                ))
            })?;
        Ok(QuizQuestion {
            id: self.id,
            question: self.question,
            options: self.options,
            correct_answer,
            explanation: self.explanation,
        })
    }
}

#[derive(Deserialize)]
struct RecommendationRecord {
    topic: String,
    reason: String,
    difficulty: String,
}

impl RecommendationRecord {
    fn into_domain(self) -> Result<Recommendation, GatewayError> {
        if self.topic.trim().is_empty() {
            return Err(GatewayError::SchemaViolation(
                "recommendation with a blank topic".to_string(),
            ));
        }
        let difficulty = self
            .difficulty
            .parse::<Difficulty>()
            .map_err(|e| GatewayError::SchemaViolation(e.to_string()))?;
        Ok(Recommendation {
            topic: self.topic,
            reason: self.reason,
            difficulty,
        })
    }
}

//=========================================================================================
// Schemas and prompts
//=========================================================================================

pub fn quiz_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": { "type": "integer" },
                "question": { "type": "string" },
                "options": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "correctAnswer": {
                    "type": "integer",
                    "description": "The zero-based index of the correct answer in the options array."
                },
                "explanation": { "type": "string" }
            },
            "required": ["id", "question", "options", "correctAnswer", "explanation"],
            "additionalProperties": false
        }
    })
}

pub fn recommendation_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "topic": { "type": "string" },
                "reason": { "type": "string" },
                "difficulty": {
                    "type": "string",
                    "enum": Difficulty::ALL.map(Difficulty::as_str)
                }
            },
            "required": ["topic", "reason", "difficulty"],
            "additionalProperties": false
        }
    })
}

pub fn quiz_request(topic: &str, difficulty: Difficulty) -> StructuredRequest {
    StructuredRequest {
        name: "quiz_questions".to_string(),
        prompt: format!(
            "Generate a multiple-choice quiz with {QUIZ_LENGTH} questions about \"{topic}\". \
             The difficulty should be {difficulty}.\n\
             Ensure the output is strictly valid JSON matching the schema."
        ),
        schema: quiz_schema(),
    }
}

pub fn recommendation_request<S: AsRef<str>>(interests: &[S]) -> StructuredRequest {
    let listed: Vec<&str> = interests
        .iter()
        .map(|i| i.as_ref().trim())
        .filter(|i| !i.is_empty())
        .collect();
    let interests = if listed.is_empty() {
        "no particular interests yet".to_string()
    } else {
        listed.join(", ")
    };
    StructuredRequest {
        name: "topic_recommendations".to_string(),
        prompt: format!(
            "Based on the user's interests: {interests}, recommend {RECOMMENDATION_COUNT} new learning topics or modules."
        ),
        schema: recommendation_schema(),
    }
}

//=========================================================================================
// Parsing
//=========================================================================================

/// Validates a quiz payload. Any non-conformant question rejects the whole quiz.
pub fn parse_quiz(payload: Value) -> Result<Vec<QuizQuestion>, GatewayError> {
    let records: Vec<QuizQuestionRecord> = serde_json::from_value(payload)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut questions = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(GatewayError::SchemaViolation(format!(
                "duplicate question id {}",
                record.id
            )));
        }
        questions.push(record.into_domain()?);
    }
    if questions.len() > QUIZ_LENGTH {
        debug!(received = questions.len(), "truncating quiz to {QUIZ_LENGTH} questions");
        questions.truncate(QUIZ_LENGTH);
    }
    Ok(questions)
}

/// Validates a recommendation payload. Any out-of-enum difficulty rejects the whole batch.
pub fn parse_recommendations(payload: Value) -> Result<Vec<Recommendation>, GatewayError> {
    let records: Vec<RecommendationRecord> = serde_json::from_value(payload)?;
    let mut recommendations = records
        .into_iter()
        .map(RecommendationRecord::into_domain)
        .collect::<Result<Vec<_>, _>>()?;
    if recommendations.len() > RECOMMENDATION_COUNT {
        debug!(
            received = recommendations.len(),
            "truncating recommendations to {RECOMMENDATION_COUNT}"
        );
        recommendations.truncate(RECOMMENDATION_COUNT);
    }
    Ok(recommendations)
}

//=========================================================================================
// The Gateway
//=========================================================================================

/// Validated request/response boundary to the generative text service.
#[derive(Clone)]
pub struct ContentGateway {
    service: Arc<dyn StructuredGenerationService>,
}

impl ContentGateway {
    pub fn new(service: Arc<dyn StructuredGenerationService>) -> Self {
        Self { service }
    }

    /// Requests a quiz for `topic`. An empty result means the quiz is unavailable.
    pub async fn generate_quiz(&self, topic: &str, difficulty: Difficulty) -> Vec<QuizQuestion> {
        match self.try_generate_quiz(topic, difficulty).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!(topic, kind = e.kind(), error = %e, "quiz generation failed");
                Vec::new()
            }
        }
    }

    /// Like [`Self::generate_quiz`] but keeps "no questions" and "failure" apart.
    pub async fn try_generate_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<QuizQuestion>, GatewayError> {
        let payload = self
            .service
            .generate_structured(quiz_request(topic, difficulty))
            .await?;
        let questions = parse_quiz(payload)?;
        info!(topic, %difficulty, count = questions.len(), "quiz generated");
        Ok(questions)
    }

    /// Requests new topics for the given interests. Never fails; errors yield an empty list.
    pub async fn get_recommendations<S: AsRef<str> + Sync>(
        &self,
        interests: &[S],
    ) -> Vec<Recommendation> {
        match self.try_get_recommendations(interests).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "recommendation request failed");
                Vec::new()
            }
        }
    }

    pub async fn try_get_recommendations<S: AsRef<str> + Sync>(
        &self,
        interests: &[S],
    ) -> Result<Vec<Recommendation>, GatewayError> {
        let request = recommendation_request(interests);
        let payload = self.service.generate_structured(request).await?;
        let recommendations = parse_recommendations(payload)?;
        info!(count = recommendations.len(), "recommendations received");
        Ok(recommendations)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays one canned response and records every request it sees.
    pub(crate) struct ScriptedService {
        response: Mutex<Option<PortResult<Value>>>,
        pub(crate) requests: Mutex<Vec<StructuredRequest>>,
    }

    impl ScriptedService {
        pub(crate) fn replying(response: PortResult<Value>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StructuredGenerationService for ScriptedService {
        async fn generate_structured(&self, request: StructuredRequest) -> PortResult<Value> {
            self.requests.lock().unwrap().push(request);
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(PortError::Unexpected("script exhausted".to_string())))
        }
    }

    pub(crate) fn three_questions() -> Value {
        json!([
            { "id": 0, "question": "What does @SpringBootApplication enable?", "options": ["Nothing", "Auto-configuration", "Logging"], "correctAnswer": 1, "explanation": "It turns on auto-configuration and component scanning." },
            { "id": 1, "question": "Default embedded server?", "options": ["Tomcat", "Jetty", "Undertow"], "correctAnswer": 0, "explanation": "Spring Boot starter-web ships Tomcat." },
            { "id": 2, "question": "Where do properties live?", "options": ["pom.xml", "main.java", "application.properties"], "correctAnswer": 2, "explanation": "application.properties holds configuration." }
        ])
    }

    fn gateway(service: Arc<ScriptedService>) -> ContentGateway {
        ContentGateway::new(service)
    }

    #[tokio::test]
    async fn valid_quiz_is_returned_in_order() {
        let service = ScriptedService::replying(Ok(three_questions()));
        let questions = gateway(service.clone())
            .generate_quiz("Introduction to Spring Boot", Difficulty::Intermediate)
            .await;
        assert_eq!(questions.len(), 3);
        assert_eq!(
            questions.iter().map(|q| q.correct_answer).collect::<Vec<_>>(),
            vec![1, 0, 2]
        );

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("\"Introduction to Spring Boot\""));
        assert!(requests[0].prompt.contains("Intermediate"));
        assert_eq!(requests[0].schema, quiz_schema());
    }

    #[tokio::test]
    async fn out_of_range_answer_rejects_quiz() {
        let payload = json!([
            { "id": 1, "question": "Q", "options": ["a", "b", "c"], "correctAnswer": 5, "explanation": "e" }
        ]);
        let service = ScriptedService::replying(Ok(payload.clone()));
        let questions = gateway(service)
            .generate_quiz("Topic", Difficulty::Beginner)
            .await;
        assert!(questions.is_empty());
        assert!(matches!(
            parse_quiz(payload),
            Err(GatewayError::SchemaViolation(_))
        ));
    }

    #[test]
    fn negative_answer_index_is_a_violation() {
        let payload = json!([
            { "id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": -1, "explanation": "e" }
        ]);
        assert!(matches!(
            parse_quiz(payload),
            Err(GatewayError::SchemaViolation(_))
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let payload = json!([
            { "id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 0 }
        ]);
        assert!(matches!(parse_quiz(payload), Err(GatewayError::Malformed(_))));
    }

    #[test]
    fn one_bad_question_rejects_all() {
        let mut payload = three_questions();
        payload[2]["options"] = json!(["only one"]);
        payload[2]["correctAnswer"] = json!(0);
        assert!(parse_quiz(payload).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut payload = three_questions();
        payload[1]["id"] = json!(0);
        assert!(matches!(
            parse_quiz(payload),
            Err(GatewayError::SchemaViolation(_))
        ));
    }

    #[test]
    fn object_payload_is_malformed() {
        assert!(matches!(
            parse_quiz(json!({ "questions": [] })),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn empty_array_is_not_a_failure() {
        assert_eq!(parse_quiz(json!([])).unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn upstream_error_collapses_to_empty() {
        let service = ScriptedService::replying(Err(PortError::Timeout(30)));
        let gateway = gateway(service);
        assert!(gateway.generate_quiz("Topic", Difficulty::Advanced).await.is_empty());
    }

    #[tokio::test]
    async fn try_variant_surfaces_the_failure() {
        let service = ScriptedService::replying(Err(PortError::Unexpected("boom".to_string())));
        let result = gateway(service)
            .try_generate_quiz("Topic", Difficulty::Advanced)
            .await;
        assert!(matches!(result, Err(GatewayError::Upstream(_))));
    }

    #[tokio::test]
    async fn recommendations_with_no_interests_still_request() {
        let payload = json!([
            { "topic": "Kubernetes Operators", "reason": "Builds on DevOps", "difficulty": "Advanced" },
            { "topic": "GraphQL", "reason": "Pairs with React", "difficulty": "Intermediate" },
            { "topic": "SQL Basics", "reason": "Foundation", "difficulty": "Beginner" },
            { "topic": "Extra", "reason": "Over the limit", "difficulty": "Beginner" }
        ]);
        let service = ScriptedService::replying(Ok(payload));
        let no_interests: [&str; 0] = [];
        let recs = gateway(service.clone())
            .get_recommendations(&no_interests)
            .await;

        assert!(recs.len() <= RECOMMENDATION_COUNT);
        assert!(recs.iter().all(|r| Difficulty::ALL.contains(&r.difficulty)));

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "topic_recommendations");
        assert!(requests[0].prompt.contains("no particular interests yet"));
        assert_eq!(requests[0].schema, recommendation_schema());
    }

    #[tokio::test]
    async fn unknown_difficulty_rejects_recommendations() {
        let payload = json!([
            { "topic": "Rust", "reason": "Systems", "difficulty": "Expert" }
        ]);
        let service = ScriptedService::replying(Ok(payload));
        let recs = gateway(service).get_recommendations(&["React"]).await;
        assert!(recs.is_empty());
    }

    #[test]
    fn interests_are_joined_as_a_list() {
        let request = recommendation_request(&["React", " Java Spring Boot ", "", "Machine Learning"]);
        assert!(request
            .prompt
            .contains("interests: React, Java Spring Boot, Machine Learning, recommend 3"));
    }

    #[test]
    fn recommendation_schema_declares_the_enum() {
        let schema = recommendation_schema();
        assert_eq!(
            schema["items"]["properties"]["difficulty"]["enum"],
            json!(["Beginner", "Intermediate", "Advanced"])
        );
    }
}
