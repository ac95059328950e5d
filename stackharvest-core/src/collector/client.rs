//! Live Stack Exchange API source
//!
//! Implements [`QuestionSource`] against the public Stack Exchange 2.3 API:
//! a paginated `/questions` listing filtered by tag, and a per-question
//! `/questions/{id}/answers` listing sorted by votes. The `withbody` filter
//! asks the API to include post bodies, which the default filter omits.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::types::{Answer, Question};

use super::rate::RateLimiter;
use super::source::{FetchOutcome, QuestionSource};
use super::QuestionQuery;

/// Built-in API filter that includes post bodies in the response.
const FILTER_WITH_BODY: &str = "withbody";

/// Remaining-quota level below which a warning is logged.
const LOW_QUOTA_THRESHOLD: i64 = 10;

/// Response envelope common to all Stack Exchange API endpoints.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ResponseWrapper<T> {
    #[serde(default)]
    items: Vec<T>,
    #[serde(default)]
    has_more: bool,
    /// Remaining request quota for this key/IP
    quota_remaining: Option<i64>,
    /// Server-mandated pause before the next request, in seconds
    backoff: Option<u64>,
}

/// HTTP client for the Stack Exchange API.
pub struct StackApiSource {
    http_client: reqwest::Client,
    base_url: String,
    site: String,
    api_key: Option<String>,
    page_size: usize,
    max_pages: usize,
    limiter: RateLimiter,
}

impl StackApiSource {
    /// Create a live source from configuration.
    ///
    /// Returns an error if the HTTP client cannot be constructed; a
    /// collector with a broken client is unusable.
    pub fn new(config: &CollectorConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Collector(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            site: config.site.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            limiter: RateLimiter::new(config.rate_limit),
        })
    }

    /// Fetch one page of the question listing.
    async fn fetch_question_page(
        &self,
        query: &QuestionQuery,
        page: usize,
    ) -> Result<ResponseWrapper<Question>> {
        let url = format!("{}/questions", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("site", self.site.clone()),
            ("page", page.to_string()),
            ("pagesize", self.page_size.to_string()),
            ("tagged", query.tag.clone()),
            ("sort", "creation".to_string()),
            ("order", "desc".to_string()),
            ("min", query.min_answers.to_string()),
            ("min_score", query.min_score.to_string()),
            ("filter", FILTER_WITH_BODY.to_string()),
        ];
        if let Some(from) = query.from_date {
            params.push(("fromdate", from.timestamp().to_string()));
        }
        if let Some(to) = query.to_date {
            params.push(("todate", to.timestamp().to_string()));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        self.get_wrapper(&url, &params).await
    }

    /// Fetch the answers for one question, votes descending.
    async fn fetch_answer_page(&self, question_id: u64) -> Result<ResponseWrapper<Answer>> {
        let url = format!("{}/questions/{}/answers", self.base_url, question_id);

        let mut params: Vec<(&str, String)> = vec![
            ("site", self.site.clone()),
            ("sort", "votes".to_string()),
            ("order", "desc".to_string()),
            ("filter", FILTER_WITH_BODY.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        self.get_wrapper(&url, &params).await
    }

    /// Issue a GET and decode the response envelope.
    async fn get_wrapper<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<ResponseWrapper<T>> {
        let response = self
            .http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Collector(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let wrapper: ResponseWrapper<T> = response
                .json()
                .await
                .map_err(|e| Error::Collector(format!("failed to parse response: {}", e)))?;

            // The API signals throttling in the envelope; we log and keep
            // going, there is no retry policy in this pipeline.
            if let Some(backoff) = wrapper.backoff {
                tracing::warn!(backoff_secs = backoff, "API requested backoff");
            }
            if let Some(quota) = wrapper.quota_remaining {
                if quota < LOW_QUOTA_THRESHOLD {
                    tracing::warn!(quota_remaining = quota, "API quota running low");
                }
            }

            Ok(wrapper)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Collector(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    /// Fetch the question listing across as many pages as `max_count`
    /// requires, truncating the tail of the last page.
    async fn request_questions(&self, query: &QuestionQuery) -> Result<Vec<Question>> {
        let pages = pages_needed(query.max_count, self.page_size, self.max_pages);
        let mut questions = Vec::new();

        for page in 1..=pages {
            let wrapper = self.fetch_question_page(query, page).await?;
            questions.extend(wrapper.items);

            if !wrapper.has_more || questions.len() >= query.max_count {
                break;
            }
        }

        questions.truncate(query.max_count);
        Ok(questions)
    }
}

#[async_trait]
impl QuestionSource for StackApiSource {
    async fn fetch_questions(&self, query: &QuestionQuery) -> FetchOutcome<Question> {
        tracing::info!(
            site = %self.site,
            tag = %query.tag,
            max_count = query.max_count,
            "Fetching questions"
        );

        match self.request_questions(query).await {
            Ok(items) => {
                tracing::info!(count = items.len(), "Fetched questions");
                FetchOutcome::Fetched(items)
            }
            Err(e) => {
                tracing::error!(
                    tag = %query.tag,
                    error = %e,
                    "Question fetch failed, degrading to empty"
                );
                FetchOutcome::Degraded
            }
        }
    }

    async fn fetch_answers(&self, question_id: u64) -> FetchOutcome<Answer> {
        // Fixed delay before every answer request
        self.limiter.wait().await;

        match self.fetch_answer_page(question_id).await {
            Ok(wrapper) => FetchOutcome::Fetched(wrapper.items),
            Err(e) => {
                tracing::error!(
                    question_id,
                    error = %e,
                    "Answer fetch failed, degrading to empty"
                );
                FetchOutcome::Degraded
            }
        }
    }
}

/// Pages required to satisfy `max_count`, capped at `max_pages`.
///
/// Never fetches more pages than the cap requires.
fn pages_needed(max_count: usize, page_size: usize, max_pages: usize) -> usize {
    let needed = (max_count + page_size - 1) / page_size;
    needed.clamp(1, max_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_needed() {
        assert_eq!(pages_needed(10, 100, 5), 1);
        assert_eq!(pages_needed(100, 100, 5), 1);
        assert_eq!(pages_needed(101, 100, 5), 2);
        assert_eq!(pages_needed(250, 100, 5), 3);
        assert_eq!(pages_needed(1000, 100, 5), 5);
        assert_eq!(pages_needed(7, 3, 5), 3);
    }

    #[test]
    fn test_source_builds_from_default_config() {
        let config = CollectorConfig::default();
        assert!(StackApiSource::new(&config).is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = CollectorConfig {
            base_url: "https://api.stackexchange.com/2.3/".to_string(),
            ..Default::default()
        };
        let source = StackApiSource::new(&config).unwrap();
        assert_eq!(source.base_url, "https://api.stackexchange.com/2.3");
    }

    #[test]
    fn test_wrapper_deserialization() {
        let json = r#"{
            "items": [{
                "question_id": 1,
                "title": "Test Question 1",
                "body": "Test Body 1",
                "score": 10,
                "answer_count": 2,
                "creation_date": 1617235200,
                "tags": ["nlp", "python"],
                "accepted_answer_id": 2
            }],
            "has_more": true,
            "quota_remaining": 297
        }"#;

        let wrapper: ResponseWrapper<Question> = serde_json::from_str(json).unwrap();
        assert_eq!(wrapper.items.len(), 1);
        assert!(wrapper.has_more);
        assert_eq!(wrapper.quota_remaining, Some(297));
        assert_eq!(wrapper.backoff, None);
    }

    #[test]
    fn test_wrapper_defaults_for_sparse_envelope() {
        let wrapper: ResponseWrapper<Question> = serde_json::from_str(r#"{"backoff": 30}"#).unwrap();
        assert!(wrapper.items.is_empty());
        assert!(!wrapper.has_more);
        assert_eq!(wrapper.backoff, Some(30));
    }
}
