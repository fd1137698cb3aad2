use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Teacher,
    Student,
}

/// Closed set of gradeable item kinds. The variant decides at compile time
/// whether grading is deterministic string matching or delegated to the
/// external scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiontype", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    SingleChoice,
    MultiChoice,
    FillBlank,
    ShortAnswer,
    Code,
}

impl QuestionType {
    /// Choice types must carry an options list.
    pub(crate) fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultiChoice)
    }

    /// Objective types are graded by exact reference comparison; the rest go
    /// through the scoring delegate.
    pub(crate) fn is_objective(self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultiChoice | QuestionType::FillBlank
        )
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::FillBlank => "fill_blank",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::Code => "code",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficultylevel", rename_all = "lowercase")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_split_matches_grading_paths() {
        assert!(QuestionType::SingleChoice.is_objective());
        assert!(QuestionType::MultiChoice.is_objective());
        assert!(QuestionType::FillBlank.is_objective());
        assert!(!QuestionType::ShortAnswer.is_objective());
        assert!(!QuestionType::Code.is_objective());
    }

    #[test]
    fn only_choice_types_require_options() {
        assert!(QuestionType::SingleChoice.is_choice());
        assert!(QuestionType::MultiChoice.is_choice());
        assert!(!QuestionType::FillBlank.is_choice());
        assert!(!QuestionType::ShortAnswer.is_choice());
        assert!(!QuestionType::Code.is_choice());
    }

    #[test]
    fn question_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&QuestionType::SingleChoice).unwrap(), "\"single_choice\"");
        assert_eq!(serde_json::to_string(&QuestionType::ShortAnswer).unwrap(), "\"short_answer\"");
        assert_eq!(serde_json::to_string(&QuestionType::Code).unwrap(), "\"code\"");
    }
}
