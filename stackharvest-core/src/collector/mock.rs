//! Offline mock source
//!
//! Generates synthetic question/answer records so the pipeline and storage
//! layers can run without network access. The field set is identical to
//! live records; content is drawn from a seedable RNG so tests can pin
//! exact output for a fixed seed.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::{Answer, AnswerOwner, Question};

use super::source::{FetchOutcome, QuestionSource};
use super::QuestionQuery;

/// Candidate topic tags attached to generated questions.
const TOPICS: [&str; 10] = [
    "tokenization",
    "word-embeddings",
    "named-entity-recognition",
    "sentiment-analysis",
    "text-classification",
    "machine-translation",
    "question-answering",
    "summarization",
    "speech-recognition",
    "bert",
];

/// Libraries referenced in generated bodies.
const LIBRARIES: [&str; 6] = [
    "NLTK",
    "spaCy",
    "Transformers",
    "TensorFlow",
    "PyTorch",
    "Gensim",
];

const DAY_SECS: i64 = 24 * 60 * 60;

/// Synthetic question/answer generator.
pub struct MockSource {
    rng: Mutex<StdRng>,
}

impl MockSource {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministic generator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Generate exactly `count` questions, each tagged with `tag` plus
    /// 1-3 random topics. Scores land in [0, 50] and creation dates within
    /// the past 30 days.
    pub fn generate_questions(&self, tag: &str, count: usize) -> Vec<Question> {
        let mut rng = self.rng.lock().expect("mock rng poisoned");
        let now = Utc::now().timestamp();

        (1..=count as u64)
            .map(|id| {
                let topic = TOPICS.choose(&mut *rng).expect("TOPICS is non-empty");
                let library = LIBRARIES.choose(&mut *rng).expect("LIBRARIES is non-empty");
                let extra = rng.gen_range(1..=3);

                let mut tags = vec![tag.to_string()];
                tags.extend(
                    TOPICS
                        .choose_multiple(&mut *rng, extra)
                        .map(|t| t.to_string()),
                );

                Question {
                    question_id: id,
                    title: format!("How do I implement {} in an NLP project?", topic),
                    body: format!(
                        "I am trying to build {} with {} but the results are off...",
                        topic, library
                    ),
                    score: rng.gen_range(0..=50),
                    answer_count: rng.gen_range(1..=5),
                    creation_date: now - rng.gen_range(0..30 * DAY_SECS),
                    tags,
                    accepted_answer_id: Some(id * 100 + 1),
                    answers: Vec::new(),
                }
            })
            .collect()
    }

    /// Generate 1-5 answers for a question; the first one is accepted.
    ///
    /// Answer ids are `question_id * 100 + index`, which collides once a
    /// question id grows past ~10^7. Mock ids are small sequential
    /// integers, so the scheme is left unguarded.
    pub fn generate_answers(&self, question_id: u64) -> Vec<Answer> {
        let mut rng = self.rng.lock().expect("mock rng poisoned");
        let now = Utc::now().timestamp();
        let count = rng.gen_range(1..=5u64);

        (1..=count)
            .map(|index| {
                let library = LIBRARIES.choose(&mut *rng).expect("LIBRARIES is non-empty");
                Answer {
                    answer_id: question_id * 100 + index,
                    body: format!(
                        "You can solve this with {}:\n```python\nimport {}\n```",
                        library,
                        library.to_lowercase()
                    ),
                    score: rng.gen_range(0..=30),
                    is_accepted: index == 1,
                    creation_date: now - rng.gen_range(0..15 * DAY_SECS),
                    owner: AnswerOwner {
                        user_id: rng.gen_range(1000..=9999),
                        display_name: format!("nlp_expert_{}", rng.gen_range(1..=100)),
                    },
                }
            })
            .collect()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    async fn fetch_questions(&self, query: &QuestionQuery) -> FetchOutcome<Question> {
        tracing::info!(
            tag = %query.tag,
            count = query.max_count,
            "Generating mock questions"
        );
        FetchOutcome::Fetched(self.generate_questions(&query.tag, query.max_count))
    }

    async fn fetch_answers(&self, question_id: u64) -> FetchOutcome<Answer> {
        FetchOutcome::Fetched(self.generate_answers(question_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_exact_count_with_base_tag() {
        let source = MockSource::with_seed(1);
        let questions = source.generate_questions("nlp", 5);

        assert_eq!(questions.len(), 5);
        for question in &questions {
            assert_eq!(question.tags[0], "nlp");
            // Base tag plus 1-3 topics
            assert!((2..=4).contains(&question.tags.len()));
            assert!((0..=50).contains(&question.score));
            assert!((1..=5).contains(&question.answer_count));
            assert!(question.answers.is_empty());
        }
    }

    #[test]
    fn test_question_ids_are_sequential() {
        let source = MockSource::with_seed(2);
        let questions = source.generate_questions("rust", 3);

        let ids: Vec<u64> = questions.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_answers_first_is_accepted() {
        let source = MockSource::with_seed(3);

        for question_id in 1..=20 {
            let answers = source.generate_answers(question_id);

            assert!(!answers.is_empty());
            assert!(answers.len() <= 5);
            assert!(answers[0].is_accepted);

            let accepted = answers.iter().filter(|a| a.is_accepted).count();
            assert_eq!(accepted, 1);
        }
    }

    #[test]
    fn test_answer_id_scheme() {
        let source = MockSource::with_seed(4);
        let answers = source.generate_answers(7);

        for (index, answer) in answers.iter().enumerate() {
            assert_eq!(answer.answer_id, 7 * 100 + index as u64 + 1);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = MockSource::with_seed(42).generate_questions("nlp", 10);
        let b = MockSource::with_seed(42).generate_questions("nlp", 10);

        // Creation dates are anchored to the wall clock, so compare
        // everything else.
        let strip = |questions: Vec<Question>| {
            questions
                .into_iter()
                .map(|mut q| {
                    q.creation_date = 0;
                    q
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(strip(a), strip(b));
    }

    #[test]
    fn test_accepted_answer_id_matches_first_answer() {
        let source = MockSource::with_seed(5);
        let questions = source.generate_questions("nlp", 3);

        for question in &questions {
            assert_eq!(
                question.accepted_answer_id,
                Some(question.question_id * 100 + 1)
            );
        }
    }
}
