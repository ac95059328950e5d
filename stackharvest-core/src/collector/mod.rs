//! Collection pipeline
//!
//! Orchestrates a [`QuestionSource`] into a persisted data set:
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌────────────────────┐
//! │  /questions  │ ──► │   Collector   │ ──► │  JSON checkpoints  │
//! │  /answers    │     │ (merge loop)  │     │  + final output    │
//! └──────────────┘     └───────────────┘     └────────────────────┘
//! ```
//!
//! The pipeline is strictly sequential: one question listing (paginated),
//! then one answer fetch per question in listing order. A failed answer
//! fetch degrades that single question to empty answers; a failed question
//! listing terminates the run with an empty result. Every tenth merged
//! question (and the last one) is checkpointed to disk, so a killed run
//! loses at most nine questions. Checkpoints are a loss-limiting safeguard,
//! not resumability: a restarted run starts from scratch.

mod client;
mod mock;
mod rate;
mod source;

pub use client::StackApiSource;
pub use mock::MockSource;
pub use rate::RateLimiter;
pub use source::{FetchOutcome, QuestionSource};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::storage;
use crate::types::Question;

/// Questions merged between checkpoint writes.
const CHECKPOINT_INTERVAL: usize = 10;

/// Filter for the question listing.
#[derive(Debug, Clone)]
pub struct QuestionQuery {
    /// Tag every returned question must carry
    pub tag: String,
    /// Minimum number of answers
    pub min_answers: u32,
    /// Inclusive lower creation-date bound
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper creation-date bound
    pub to_date: Option<DateTime<Utc>>,
    /// Minimum question score
    pub min_score: i64,
    /// Hard cap on returned questions
    pub max_count: usize,
}

impl QuestionQuery {
    /// Query for `tag` with the remaining filters wide open.
    pub fn new(tag: impl Into<String>, max_count: usize) -> Self {
        Self {
            tag: tag.into(),
            min_answers: 1,
            from_date: None,
            to_date: None,
            min_score: 0,
            max_count,
        }
    }
}

/// Drives question and answer collection against one source.
///
/// Mock and live mode are fixed at construction; a collector never mixes
/// them within its lifetime.
pub struct Collector {
    source: Box<dyn QuestionSource>,
    output_dir: PathBuf,
}

impl Collector {
    /// Build a collector from configuration.
    ///
    /// Selects the mock generator when `use_mock_data` is set, otherwise
    /// the live API client. Construction fails on invalid configuration or
    /// if the HTTP client cannot be built.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        config.validate()?;

        let source: Box<dyn QuestionSource> = if config.use_mock_data {
            tracing::warn!("mock data mode enabled, no live API requests will be issued");
            match config.mock_seed {
                Some(seed) => Box::new(MockSource::with_seed(seed)),
                None => Box::new(MockSource::new()),
            }
        } else {
            if config.api_key.is_none() {
                tracing::warn!("no API key provided, unauthenticated request quota applies");
            }
            Box::new(StackApiSource::new(config)?)
        };

        Ok(Self {
            source,
            output_dir: config.resolved_output_dir(),
        })
    }

    /// Build a collector over a custom source (used by tests).
    pub fn with_source(config: &CollectorConfig, source: Box<dyn QuestionSource>) -> Self {
        Self {
            source,
            output_dir: config.resolved_output_dir(),
        }
    }

    /// Directory receiving checkpoint and output files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Collect questions matching `query` and merge each question's
    /// answers into it.
    ///
    /// Output order equals the order questions were returned by the
    /// source: creation-date descending live, generation order in mock
    /// mode. Only checkpoint I/O failures escape this call.
    pub async fn collect(&self, query: &QuestionQuery) -> Result<Vec<Question>> {
        self.collect_with_progress(query, |_, _, _| {}).await
    }

    /// Collect with a progress callback.
    ///
    /// The callback receives `(current_index, total, question_id)` before
    /// each answer fetch. This allows callers to display progress
    /// indicators.
    pub async fn collect_with_progress<F>(
        &self,
        query: &QuestionQuery,
        mut on_progress: F,
    ) -> Result<Vec<Question>>
    where
        F: FnMut(usize, usize, u64),
    {
        let questions = self.source.fetch_questions(query).await.into_items();

        if questions.is_empty() {
            tracing::warn!(tag = %query.tag, "No questions matched the query");
            return Ok(Vec::new());
        }

        let total = questions.len();
        let mut collected = Vec::with_capacity(total);

        for (index, mut question) in questions.into_iter().enumerate() {
            on_progress(index, total, question.question_id);

            let outcome = self.source.fetch_answers(question.question_id).await;
            if outcome.is_degraded() {
                tracing::warn!(
                    question_id = question.question_id,
                    "Answer fetch degraded, keeping question with no answers"
                );
            }
            question.answers = outcome.into_items();

            tracing::info!(
                current = index + 1,
                total,
                question_id = question.question_id,
                answers = question.answers.len(),
                "Merged answers"
            );

            collected.push(question);

            if (index + 1) % CHECKPOINT_INTERVAL == 0 || index + 1 == total {
                let path =
                    storage::checkpoint_path(&self.output_dir, &query.tag, collected.len());
                storage::save_json(&collected, &path)?;
                tracing::info!(
                    path = %path.display(),
                    count = collected.len(),
                    "Checkpoint written"
                );
            }
        }

        Ok(collected)
    }
}

/// Blocking wrapper around [`Collector`].
///
/// Owns a current-thread tokio runtime so synchronous callers (the CLI)
/// can drive the async pipeline without a runtime of their own.
pub struct SyncCollector {
    inner: Collector,
    runtime: tokio::runtime::Runtime,
}

impl SyncCollector {
    /// Build a blocking collector from configuration.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Collector(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: Collector::new(config)?,
            runtime,
        })
    }

    /// Collect questions with answers (blocking).
    pub fn collect(&self, query: &QuestionQuery) -> Result<Vec<Question>> {
        self.runtime.block_on(self.inner.collect(query))
    }

    /// Collect with a progress callback (blocking).
    pub fn collect_with_progress<F>(
        &self,
        query: &QuestionQuery,
        on_progress: F,
    ) -> Result<Vec<Question>>
    where
        F: FnMut(usize, usize, u64),
    {
        self.runtime
            .block_on(self.inner.collect_with_progress(query, on_progress))
    }

    /// Directory receiving checkpoint and output files.
    pub fn output_dir(&self) -> &Path {
        self.inner.output_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = QuestionQuery::new("nlp", 10);
        assert_eq!(query.tag, "nlp");
        assert_eq!(query.max_count, 10);
        assert_eq!(query.min_answers, 1);
        assert_eq!(query.min_score, 0);
        assert!(query.from_date.is_none());
        assert!(query.to_date.is_none());
    }

    #[test]
    fn test_collector_rejects_invalid_config() {
        let config = CollectorConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(Collector::new(&config).is_err());
    }

    #[test]
    fn test_mock_collector_builds() {
        let config = CollectorConfig {
            use_mock_data: true,
            ..Default::default()
        };
        assert!(Collector::new(&config).is_ok());
    }
}
