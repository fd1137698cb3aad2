use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, QuestionType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) teacher_id: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) qtype: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Json<Vec<String>>>,
    pub(crate) answer: String,
    pub(crate) points: f64,
    pub(crate) key_knowledge: Option<String>,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) creator_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) content: Option<String>,
    pub(crate) answer: Option<String>,
    pub(crate) deadline: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Ordered, weighted binding of a bank question into one assignment.
/// `points` is copied from the question at insertion time and lives its own
/// life afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AssignmentQuestion {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) question_id: String,
    pub(crate) order_index: i32,
    pub(crate) points: f64,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Per-question grading detail persisted with the submission and returned to
/// the caller verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuestionGrade {
    pub(crate) question_id: String,
    pub(crate) qtype: QuestionType,
    pub(crate) score: f64,
    pub(crate) max_points: f64,
    pub(crate) feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AssignmentSubmission {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) submit_time: PrimitiveDateTime,
    pub(crate) answers: Json<HashMap<String, String>>,
    pub(crate) score: f64,
    pub(crate) feedback: Json<Vec<QuestionGrade>>,
    pub(crate) created_at: PrimitiveDateTime,
}
