use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionType};

/// Shared payload for question create and full-replace update.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpsert {
    pub(crate) qtype: QuestionType,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) options: Option<Vec<String>>,
    #[validate(length(min = 1, message = "answer must not be empty"))]
    pub(crate) answer: String,
    #[serde(default = "default_points")]
    #[validate(range(exclusive_min = 0.0, message = "points must be positive"))]
    pub(crate) points: f64,
    #[serde(default)]
    #[serde(alias = "keyKnowledge")]
    pub(crate) key_knowledge: Option<String>,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
}

impl QuestionUpsert {
    /// Choice types must carry at least one option; options on other types
    /// are discarded rather than stored.
    pub(crate) fn validated_options(&self) -> Result<Option<Vec<String>>, String> {
        if self.qtype.is_choice() {
            match &self.options {
                Some(options) if !options.is_empty() => Ok(Some(options.clone())),
                _ => Err("choice questions must provide a non-empty options list".to_string()),
            }
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) qtype: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) answer: String,
    pub(crate) points: f64,
    pub(crate) key_knowledge: Option<String>,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            qtype: question.qtype,
            content: question.content,
            options: question.options.map(|options| options.0),
            answer: question.answer,
            points: question.points,
            key_knowledge: question.key_knowledge,
            difficulty: question.difficulty,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

fn default_points() -> f64 {
    1.0
}

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(raw: serde_json::Value) -> QuestionUpsert {
        serde_json::from_value(raw).expect("payload")
    }

    #[test]
    fn choice_question_without_options_is_rejected() {
        let upsert = payload(serde_json::json!({
            "qtype": "single_choice",
            "content": "Pick one",
            "answer": "A",
            "points": 5.0
        }));
        assert!(upsert.validated_options().is_err());

        let upsert = payload(serde_json::json!({
            "qtype": "multi_choice",
            "content": "Pick many",
            "options": [],
            "answer": "A,B",
        }));
        assert!(upsert.validated_options().is_err());
    }

    #[test]
    fn choice_question_keeps_its_options() {
        let upsert = payload(serde_json::json!({
            "qtype": "single_choice",
            "content": "Pick one",
            "options": ["A", "B", "C"],
            "answer": "B",
        }));
        assert_eq!(
            upsert.validated_options().unwrap(),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn options_on_open_types_are_discarded() {
        let upsert = payload(serde_json::json!({
            "qtype": "short_answer",
            "content": "Explain",
            "options": ["stray"],
            "answer": "Because",
        }));
        assert_eq!(upsert.validated_options().unwrap(), None);
    }

    #[test]
    fn defaults_apply_for_points_and_difficulty() {
        let upsert = payload(serde_json::json!({
            "qtype": "fill_blank",
            "content": "2 + 2 = ?",
            "answer": "4",
        }));
        assert_eq!(upsert.points, 1.0);
        assert_eq!(upsert.difficulty, DifficultyLevel::Medium);
    }

    #[test]
    fn validation_rejects_non_positive_points() {
        let upsert = payload(serde_json::json!({
            "qtype": "fill_blank",
            "content": "2 + 2 = ?",
            "answer": "4",
            "points": 0.0,
        }));
        assert!(upsert.validate().is_err());
    }
}
