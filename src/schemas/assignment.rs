use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Assignment;
use crate::db::types::{DifficultyLevel, QuestionType};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) deadline: OffsetDateTime,
    #[serde(default)]
    #[serde(alias = "questionIds")]
    pub(crate) question_ids: Vec<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) creator_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) content: Option<String>,
    pub(crate) answer: Option<String>,
    pub(crate) deadline: String,
    pub(crate) created_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            creator_id: assignment.creator_id,
            title: assignment.title,
            description: assignment.description,
            content: assignment.content,
            answer: assignment.answer,
            deadline: format_primitive(assignment.deadline),
            created_at: format_primitive(assignment.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AddQuestionRequest {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, message = "points must be positive"))]
    pub(crate) points: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderRequest {
    #[serde(alias = "newOrder")]
    pub(crate) new_order: i32,
}

/// One assignment question as seen by course members. The reference answer
/// is only present for the owning teacher and for students who already
/// submitted.
#[derive(Debug, Serialize)]
pub(crate) struct BoundQuestionResponse {
    pub(crate) question_id: String,
    pub(crate) order_index: i32,
    pub(crate) qtype: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) points: f64,
    pub(crate) key_knowledge: Option<String>,
    pub(crate) difficulty: DifficultyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentQuestionsResponse {
    pub(crate) assignment_id: String,
    pub(crate) questions: Vec<BoundQuestionResponse>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct KnowledgePointScoreInput {
    #[serde(alias = "knowledgePoint")]
    #[validate(length(min = 1, message = "knowledge_point must not be empty"))]
    pub(crate) knowledge_point: String,
    #[serde(alias = "masteryScore")]
    #[validate(range(min = 0.0, max = 1.0, message = "mastery_score must be within [0, 1]"))]
    pub(crate) mastery_score: f64,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct QuestionAmountInput {
    pub(crate) qtype: QuestionType,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub(crate) amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AutoGenerateRequest {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[serde(deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) deadline: OffsetDateTime,
    #[serde(alias = "knowledgePoints")]
    #[validate(length(min = 1, message = "knowledge_points must not be empty"))]
    #[validate(nested)]
    pub(crate) knowledge_points: Vec<KnowledgePointScoreInput>,
    #[serde(alias = "questionAmounts")]
    #[validate(length(min = 1, message = "question_amounts must not be empty"))]
    #[validate(nested)]
    pub(crate) question_amounts: Vec<QuestionAmountInput>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AutoGenerateResponse {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) question_count: usize,
    pub(crate) knowledge_points: Vec<String>,
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // Frontend's datetime-local often sends without timezone.
    if raw.len() == 16 && raw.as_bytes().get(10) == Some(&b'T') {
        let candidate = format!("{raw}:00Z");
        if let Ok(value) = OffsetDateTime::parse(&candidate, &Rfc3339) {
            return Some(value);
        }
    }

    if raw.len() == 19 && raw.as_bytes().get(10) == Some(&b'T') {
        let candidate = format!("{raw}Z");
        if let Ok(value) = OffsetDateTime::parse(&candidate, &Rfc3339) {
            return Some(value);
        }
    }

    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }

    None
}

fn deserialize_offset_datetime_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_offset_datetime_flexible(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_accepts_rfc3339() {
        let payload: AssignmentCreate = serde_json::from_value(serde_json::json!({
            "course_id": "course-1",
            "title": "Week 3 homework",
            "deadline": "2026-01-10T18:00:00Z",
        }))
        .expect("payload");
        assert_eq!(payload.deadline.unix_timestamp(), 1_768_068_000);
    }

    #[test]
    fn deadline_accepts_datetime_local_without_timezone() {
        let payload: AssignmentCreate = serde_json::from_value(serde_json::json!({
            "course_id": "course-1",
            "title": "Week 3 homework",
            "deadline": "2026-01-10T18:00",
        }))
        .expect("payload");
        assert_eq!(payload.deadline.unix_timestamp(), 1_768_068_000);
    }

    #[test]
    fn deadline_rejects_garbage() {
        let result: Result<AssignmentCreate, _> = serde_json::from_value(serde_json::json!({
            "course_id": "course-1",
            "title": "Week 3 homework",
            "deadline": "next tuesday",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn auto_generate_request_validates_mastery_range() {
        let payload: AutoGenerateRequest = serde_json::from_value(serde_json::json!({
            "course_id": "course-1",
            "deadline": "2026-01-10T18:00:00Z",
            "knowledge_points": [
                {"knowledge_point": "redox", "mastery_score": 1.4}
            ],
            "question_amounts": [
                {"qtype": "single_choice", "amount": 2}
            ],
        }))
        .expect("payload");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn auto_generate_request_requires_amounts() {
        let payload: AutoGenerateRequest = serde_json::from_value(serde_json::json!({
            "course_id": "course-1",
            "deadline": "2026-01-10T18:00:00Z",
            "knowledge_points": [
                {"knowledge_point": "redox", "mastery_score": 0.4}
            ],
            "question_amounts": [],
        }))
        .expect("payload");
        assert!(payload.validate().is_err());
    }
}
