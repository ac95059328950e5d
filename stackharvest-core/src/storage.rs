//! JSON persistence for collected records
//!
//! Records are written as a pretty-printed UTF-8 JSON array. Non-ASCII
//! text is preserved literally rather than `\u`-escaped, matching what a
//! human inspecting a checkpoint expects to read. Unlike fetching, this
//! layer does not degrade: an unwritable path is a fatal error for the
//! run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::types::Question;

/// Serialize `records` to `path`, creating missing parent directories.
///
/// Overwrites any existing file without merging.
pub fn save_json<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;

    tracing::info!(path = %path.display(), "Saved records");
    Ok(())
}

/// Read a question array back from disk.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Checkpoint file for the first `count` collected questions.
pub fn checkpoint_path(dir: &Path, tag: &str, count: usize) -> PathBuf {
    dir.join(format!("{}_questions_temp_{}.json", tag, count))
}

/// Final output file for a tag's collection run.
pub fn output_path(dir: &Path, tag: &str) -> PathBuf {
    dir.join(format!("{}_questions_with_answers.json", tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answer, AnswerOwner, Question};
    use tempfile::TempDir;

    fn sample_question(id: u64, title: &str) -> Question {
        Question {
            question_id: id,
            title: title.to_string(),
            body: "body".to_string(),
            score: 3,
            answer_count: 1,
            creation_date: 1617235200,
            tags: vec!["nlp".to_string()],
            accepted_answer_id: Some(id * 100 + 1),
            answers: vec![Answer {
                answer_id: id * 100 + 1,
                body: "answer body".to_string(),
                score: 5,
                is_accepted: true,
                creation_date: 1617235300,
                owner: AnswerOwner {
                    user_id: 1001,
                    display_name: "Test User".to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        let records = vec![sample_question(1, "first"), sample_question(2, "second")];

        save_json(&records, &path).unwrap();
        let loaded = load_questions(&path).unwrap();

        assert_eq!(loaded, records);
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data/raw/questions.json");

        save_json(&[sample_question(1, "nested")], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");

        save_json(&[sample_question(1, "old")], &path).unwrap();
        save_json(&[sample_question(2, "new")], &path).unwrap();

        let loaded = load_questions(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "new");
    }

    #[test]
    fn test_non_ascii_preserved_literally() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");

        save_json(&[sample_question(1, "如何实现分词？")], &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("如何实现分词？"));
        assert!(!raw.contains("\\u"));
    }

    #[test]
    fn test_unwritable_path_is_fatal() {
        let records = vec![sample_question(1, "doomed")];
        let result = save_json(&records, Path::new("/proc/nope/questions.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_path_naming() {
        let dir = Path::new("/data/raw");
        assert_eq!(
            checkpoint_path(dir, "nlp", 10),
            PathBuf::from("/data/raw/nlp_questions_temp_10.json")
        );
        assert_eq!(
            output_path(dir, "nlp"),
            PathBuf::from("/data/raw/nlp_questions_with_answers.json")
        );
    }
}
