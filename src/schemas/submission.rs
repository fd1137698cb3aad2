use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::models::QuestionGrade;
use crate::db::types::{DifficultyLevel, QuestionType};
use crate::services::statistics::ScoreTrend;

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerItem {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) answers: Vec<AnswerItem>,
}

impl SubmitRequest {
    /// Flattens the answer list into a lookup map; on duplicates the last
    /// entry wins.
    pub(crate) fn into_answer_map(self) -> HashMap<String, String> {
        self.answers.into_iter().map(|item| (item.question_id, item.text)).collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) submission_id: String,
    pub(crate) total_score: f64,
    pub(crate) full_score: f64,
    pub(crate) per_question: Vec<QuestionGrade>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatisticsSummary {
    pub(crate) enrolled_count: i64,
    pub(crate) submitted_count: i64,
    pub(crate) full_score: f64,
    pub(crate) completion_rate: f64,
    pub(crate) average_score_rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionOverview {
    pub(crate) submission_id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) submit_time: String,
    pub(crate) score: f64,
    pub(crate) score_rate: f64,
    pub(crate) per_question: Vec<QuestionGrade>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionStatisticsResponse {
    pub(crate) assignment_id: String,
    pub(crate) statistics: StatisticsSummary,
    pub(crate) submissions: Vec<SubmissionOverview>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScorePoint {
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) submit_time: String,
    pub(crate) score: f64,
    pub(crate) full_score: f64,
    pub(crate) score_rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentScoresSummary {
    pub(crate) total_assignments: usize,
    pub(crate) average_score_rate: f64,
    pub(crate) highest_score_rate: f64,
    pub(crate) lowest_score_rate: f64,
    pub(crate) trend: ScoreTrend,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentScoresResponse {
    pub(crate) chart: Vec<ScorePoint>,
    pub(crate) summary: RecentScoresSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentScoreRowResponse {
    pub(crate) submission_id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) deadline: String,
    pub(crate) submit_time: String,
    pub(crate) score: f64,
    pub(crate) full_score: f64,
    pub(crate) score_rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeDetailQuestion {
    pub(crate) question_id: String,
    pub(crate) qtype: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) student_answer: String,
    pub(crate) correct_answer: String,
    pub(crate) score: f64,
    pub(crate) max_points: f64,
    pub(crate) feedback: String,
    pub(crate) key_knowledge: Option<String>,
    pub(crate) difficulty: DifficultyLevel,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeDetailResponse {
    pub(crate) submission_id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_title: String,
    pub(crate) submit_time: String,
    pub(crate) deadline: String,
    pub(crate) score: f64,
    pub(crate) full_score: f64,
    pub(crate) score_rate: f64,
    pub(crate) questions: Vec<GradeDetailQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_map_keeps_last_duplicate() {
        let request: SubmitRequest = serde_json::from_value(serde_json::json!({
            "answers": [
                {"question_id": "q1", "text": "first"},
                {"question_id": "q1", "text": "second"},
                {"question_id": "q2", "text": "other"}
            ]
        }))
        .expect("payload");

        let map = request.into_answer_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["q1"], "second");
        assert_eq!(map["q2"], "other");
    }

    #[test]
    fn answers_default_to_empty() {
        let request: SubmitRequest = serde_json::from_value(serde_json::json!({})).expect("payload");
        assert!(request.into_answer_map().is_empty());
    }
}
