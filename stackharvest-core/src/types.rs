//! Core domain types for stackharvest
//!
//! These types mirror the wire shapes of the Stack Exchange API
//! (`/questions` and `/questions/{id}/answers` with the `withbody` filter).
//! The collection pipeline enriches each [`Question`] with its [`Answer`]s
//! before anything is persisted, so the on-disk shape is the wire shape
//! plus a populated `answers` array.

use serde::{Deserialize, Serialize};

/// A question thread as returned by the questions endpoint.
///
/// `answers` is not part of the wire shape. It stays empty until the
/// pipeline merges the per-question answer fetch into the record, and it
/// is always present (possibly empty) in persisted output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Site-unique question identifier
    pub question_id: u64,
    /// Question title
    pub title: String,
    /// Question body (HTML)
    pub body: String,
    /// Net vote score
    pub score: i64,
    /// Number of answers reported by the remote
    pub answer_count: u32,
    /// Creation time, epoch seconds
    pub creation_date: i64,
    /// Topic tags
    pub tags: Vec<String>,
    /// Identifier of the accepted answer, if any
    #[serde(default)]
    pub accepted_answer_id: Option<u64>,
    /// Answers merged in by the pipeline
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// A single answer, sorted by vote score descending on fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Site-unique answer identifier
    pub answer_id: u64,
    /// Answer body (HTML)
    pub body: String,
    /// Net vote score
    pub score: i64,
    /// Whether the question author accepted this answer
    pub is_accepted: bool,
    /// Creation time, epoch seconds
    pub creation_date: i64,
    /// Answer author
    #[serde(default)]
    pub owner: AnswerOwner,
}

/// Answer author.
///
/// Deleted accounts come back on the wire without a `user_id`, so both
/// fields fall back to defaults on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerOwner {
    /// Site-unique user identifier
    #[serde(default)]
    pub user_id: u64,
    /// Display name at the time of the fetch
    #[serde(default)]
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_deserializes_without_answers() {
        let json = r#"{
            "question_id": 1,
            "title": "Test Question 1",
            "body": "Test Body 1",
            "score": 10,
            "answer_count": 2,
            "creation_date": 1617235200,
            "tags": ["nlp", "python"],
            "accepted_answer_id": 2
        }"#;

        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.question_id, 1);
        assert_eq!(question.tags, vec!["nlp", "python"]);
        assert_eq!(question.accepted_answer_id, Some(2));
        assert!(question.answers.is_empty());
    }

    #[test]
    fn test_answer_deserializes_with_owner() {
        let json = r#"{
            "answer_id": 101,
            "body": "Test Answer 1",
            "score": 5,
            "is_accepted": true,
            "creation_date": 1617235300,
            "owner": {"user_id": 1001, "display_name": "Test User 1"}
        }"#;

        let answer: Answer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.answer_id, 101);
        assert!(answer.is_accepted);
        assert_eq!(answer.owner.user_id, 1001);
        assert_eq!(answer.owner.display_name, "Test User 1");
    }

    #[test]
    fn test_answer_without_owner_defaults() {
        // Deleted accounts: no owner record on the wire
        let json = r#"{
            "answer_id": 102,
            "body": "orphaned",
            "score": 0,
            "is_accepted": false,
            "creation_date": 1617235400
        }"#;

        let answer: Answer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.owner, AnswerOwner::default());
    }

    #[test]
    fn test_question_serializes_answers_field() {
        let question = Question {
            question_id: 7,
            title: "t".to_string(),
            body: "b".to_string(),
            score: 0,
            answer_count: 0,
            creation_date: 0,
            tags: vec![],
            accepted_answer_id: None,
            answers: vec![],
        };

        let json = serde_json::to_string(&question).unwrap();
        assert!(json.contains("\"answers\":[]"));
    }
}
