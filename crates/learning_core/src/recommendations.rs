//! crates/learning_core/src/recommendations.rs
//!
//! Dashboard state for AI topic recommendations. A refresh is tagged with the
//! interest set it was requested for; results for anything but the pending
//! request are ignored.

use crate::domain::Recommendation;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationTicket {
    pub interests: Vec<String>,
    pub request_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecommendationError {
    #[error("Recommendations are already being refreshed")]
    AlreadyLoading,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationFeed {
    interests: Vec<String>,
    items: Vec<Recommendation>,
    pending: Option<RecommendationTicket>,
}

impl RecommendationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn items(&self) -> &[Recommendation] {
        &self.items
    }

    /// The interest set the current items were generated for.
    pub fn interests(&self) -> &[String] {
        &self.interests
    }

    /// The interest set of the request in flight, if any.
    pub fn pending_interests(&self) -> Option<&[String]> {
        self.pending.as_ref().map(|t| t.interests.as_slice())
    }

    pub fn refresh(&mut self, interests: Vec<String>) -> Result<RecommendationTicket, RecommendationError> {
        if self.pending.is_some() {
            return Err(RecommendationError::AlreadyLoading);
        }
        let ticket = RecommendationTicket {
            interests,
            request_id: Uuid::new_v4(),
        };
        self.pending = Some(ticket.clone());
        Ok(ticket)
    }

    /// Stores `items` if `ticket` is the pending request. Returns whether they were applied.
    pub fn resolve(&mut self, ticket: &RecommendationTicket, items: Vec<Recommendation>) -> bool {
        if self.pending.as_ref() != Some(ticket) {
            info!(request_id = %ticket.request_id, "discarding stale recommendations");
            return false;
        }
        self.pending = None;
        self.interests = ticket.interests.clone();
        self.items = items;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Difficulty;

    fn rec(topic: &str) -> Recommendation {
        Recommendation {
            topic: topic.to_string(),
            reason: "fits".to_string(),
            difficulty: Difficulty::Beginner,
        }
    }

    #[test]
    fn refresh_is_exclusive_while_loading() {
        let mut feed = RecommendationFeed::new();
        let ticket = feed.refresh(vec!["React".to_string()]).unwrap();
        assert!(feed.is_loading());
        assert_eq!(
            feed.refresh(vec!["DevOps".to_string()]),
            Err(RecommendationError::AlreadyLoading)
        );

        assert!(feed.resolve(&ticket, vec![rec("Next.js")]));
        assert!(!feed.is_loading());
        assert_eq!(feed.items().len(), 1);
        assert_eq!(feed.interests(), ["React".to_string()]);
    }

    #[test]
    fn items_keep_their_interests_while_loading() {
        let mut feed = RecommendationFeed::new();
        let first = feed.refresh(vec!["React".to_string()]).unwrap();
        feed.resolve(&first, vec![rec("Next.js")]);

        let second = feed.refresh(vec!["DevOps".to_string()]).unwrap();
        assert_eq!(feed.interests(), ["React".to_string()]);
        assert_eq!(feed.pending_interests(), Some(&["DevOps".to_string()][..]));
        assert_eq!(feed.items()[0].topic, "Next.js");

        feed.resolve(&second, vec![rec("Terraform")]);
        assert_eq!(feed.interests(), ["DevOps".to_string()]);
        assert_eq!(feed.pending_interests(), None);
    }

    #[test]
    fn mismatched_ticket_is_ignored() {
        let mut feed = RecommendationFeed::new();
        let ticket = feed.refresh(vec!["React".to_string()]).unwrap();
        let forged = RecommendationTicket {
            request_id: Uuid::new_v4(),
            ..ticket.clone()
        };
        assert!(!feed.resolve(&forged, vec![rec("stale")]));
        assert!(feed.is_loading());
        assert!(feed.items().is_empty());
    }

    #[test]
    fn empty_result_clears_previous_items() {
        let mut feed = RecommendationFeed::new();
        let first = feed.refresh(Vec::new()).unwrap();
        feed.resolve(&first, vec![rec("a"), rec("b")]);
        let second = feed.refresh(vec!["Cloud".to_string()]).unwrap();
        feed.resolve(&second, Vec::new());
        assert!(feed.items().is_empty());
    }
}
