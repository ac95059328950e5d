//! Source seam for the collection pipeline
//!
//! A [`QuestionSource`] is anything that can produce questions for a query
//! and answers for a question id: the live Stack Exchange client or the
//! offline mock generator. Failures never cross this boundary as errors;
//! a source logs the reason and returns [`FetchOutcome::Degraded`].

use async_trait::async_trait;

use crate::types::{Answer, Question};

use super::QuestionQuery;

/// Outcome of a fetch that degrades to empty on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The remote call succeeded (the list may still be empty).
    Fetched(Vec<T>),
    /// The call failed; the reason was already logged by the source.
    Degraded,
}

impl<T> FetchOutcome<T> {
    /// Unwrap into records, treating a degraded fetch as empty.
    pub fn into_items(self) -> Vec<T> {
        match self {
            FetchOutcome::Fetched(items) => items,
            FetchOutcome::Degraded => Vec::new(),
        }
    }

    /// True if the fetch failed and degraded to empty.
    pub fn is_degraded(&self) -> bool {
        matches!(self, FetchOutcome::Degraded)
    }
}

/// A provider of questions and answers.
///
/// Implementations own their failure handling: a fetch either succeeds or
/// degrades to empty, never propagates.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch questions matching `query`, newest first, truncated to
    /// `query.max_count`.
    async fn fetch_questions(&self, query: &QuestionQuery) -> FetchOutcome<Question>;

    /// Fetch the answers for one question, sorted by vote score descending.
    async fn fetch_answers(&self, question_id: u64) -> FetchOutcome<Answer>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_into_items() {
        let outcome = FetchOutcome::Fetched(vec![1, 2, 3]);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn test_degraded_into_empty() {
        let outcome: FetchOutcome<i32> = FetchOutcome::Degraded;
        assert!(outcome.is_degraded());
        assert!(outcome.into_items().is_empty());
    }
}
