use std::collections::HashMap;
use std::time::Duration;

use crate::db::models::QuestionGrade;
use crate::repositories::assignment_questions::BoundQuestionRow;
use crate::services::ai_scoring::{AnswerScorer, ScoredAnswer};

const UNANSWERED_FEEDBACK: &str = "not answered";
const MATCH_FEEDBACK: &str = "answer matches the reference";
const MISMATCH_FEEDBACK: &str = "answer does not match the reference";

/// Typed result of one delegate call, so the zero-score fallback is handled
/// in exactly one place instead of scattered catch blocks.
#[derive(Debug)]
enum DelegateOutcome {
    Scored(ScoredAnswer),
    TimedOut,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradingReport {
    pub(crate) total_score: f64,
    pub(crate) full_score: f64,
    pub(crate) per_question: Vec<QuestionGrade>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn grade_objective(reference: &str, candidate: &str, points: f64) -> (f64, &'static str) {
    if candidate.trim() == reference.trim() {
        (points, MATCH_FEEDBACK)
    } else {
        (0.0, MISMATCH_FEEDBACK)
    }
}

async fn delegate(
    scorer: &dyn AnswerScorer,
    reference: &str,
    candidate: &str,
    timeout: Duration,
) -> DelegateOutcome {
    match tokio::time::timeout(timeout, scorer.score(reference, candidate)).await {
        Ok(Ok(verdict)) => DelegateOutcome::Scored(verdict),
        Ok(Err(err)) => DelegateOutcome::Failed(format!("{err:#}")),
        Err(_) => DelegateOutcome::TimedOut,
    }
}

/// Walks the assignment's questions in rank order and grades each one:
/// objective types by exact reference comparison, open types through the
/// scoring delegate. A delegate failure zeroes that one question and the
/// walk continues; already graded siblings keep their scores.
pub(crate) async fn grade_assignment(
    scorer: &dyn AnswerScorer,
    timeout: Duration,
    rows: &[BoundQuestionRow],
    answers: &HashMap<String, String>,
) -> GradingReport {
    let mut per_question = Vec::with_capacity(rows.len());
    let mut total_score = 0.0;
    let mut full_score = 0.0;

    for row in rows {
        full_score += row.points;

        let answer = answers.get(&row.question_id).map(String::as_str).unwrap_or("");
        let (score, feedback) = if answer.trim().is_empty() {
            // An empty answer can never earn points on either path, so the
            // delegate is not consulted for it.
            (0.0, UNANSWERED_FEEDBACK.to_string())
        } else if row.qtype.is_objective() {
            let (score, feedback) = grade_objective(&row.answer, answer, row.points);
            (score, feedback.to_string())
        } else {
            match delegate(scorer, &row.answer, answer, timeout).await {
                DelegateOutcome::Scored(verdict) => {
                    let raw = verdict.score.clamp(0.0, 100.0);
                    (round2(row.points * raw / 100.0), verdict.feedback)
                }
                DelegateOutcome::TimedOut => {
                    tracing::warn!(question_id = %row.question_id, "Scoring delegate timed out");
                    (0.0, "grading failed: scoring delegate timed out".to_string())
                }
                DelegateOutcome::Failed(cause) => {
                    tracing::warn!(question_id = %row.question_id, error = %cause, "Scoring delegate failed");
                    (0.0, format!("grading failed: {cause}"))
                }
            }
        };

        total_score += score;
        per_question.push(QuestionGrade {
            question_id: row.question_id.clone(),
            qtype: row.qtype,
            score,
            max_points: row.points,
            feedback,
        });
    }

    GradingReport {
        total_score: round2(total_score),
        full_score: round2(full_score),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    use crate::db::types::{DifficultyLevel, QuestionType};

    struct FixedScorer(f64);

    #[async_trait]
    impl AnswerScorer for FixedScorer {
        async fn score(&self, _reference: &str, _candidate: &str) -> Result<ScoredAnswer> {
            Ok(ScoredAnswer { score: self.0, feedback: "delegate feedback".to_string() })
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl AnswerScorer for FailingScorer {
        async fn score(&self, _reference: &str, _candidate: &str) -> Result<ScoredAnswer> {
            anyhow::bail!("backend unreachable")
        }
    }

    struct SlowScorer;

    #[async_trait]
    impl AnswerScorer for SlowScorer {
        async fn score(&self, _reference: &str, _candidate: &str) -> Result<ScoredAnswer> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ScoredAnswer { score: 100.0, feedback: "too late".to_string() })
        }
    }

    fn row(question_id: &str, qtype: QuestionType, answer: &str, points: f64) -> BoundQuestionRow {
        BoundQuestionRow {
            question_id: question_id.to_string(),
            order_index: 1,
            points,
            qtype,
            content: "question text".to_string(),
            options: None,
            answer: answer.to_string(),
            key_knowledge: None,
            difficulty: DifficultyLevel::Medium,
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn mixed_assignment_grades_to_expected_totals() {
        let rows = vec![
            row("q1", QuestionType::SingleChoice, "B", 5.0),
            row("q2", QuestionType::MultiChoice, "A,C", 5.0),
            row("q3", QuestionType::ShortAnswer, "entropy increases", 10.0),
        ];
        let answers = answers(&[("q1", "B"), ("q2", "A,C"), ("q3", "entropy goes up")]);

        let report = grade_assignment(&FixedScorer(80.0), TIMEOUT, &rows, &answers).await;

        assert_eq!(report.total_score, 18.0);
        assert_eq!(report.full_score, 20.0);
        assert_eq!(report.per_question.len(), 3);
        assert_eq!(report.per_question[2].score, 8.0);
        assert_eq!(report.per_question[2].feedback, "delegate feedback");
    }

    #[tokio::test]
    async fn objective_comparison_trims_whitespace() {
        let rows = vec![row("q1", QuestionType::FillBlank, "42", 3.0)];
        let report =
            grade_assignment(&FixedScorer(0.0), TIMEOUT, &rows, &answers(&[("q1", "  42 ")])).await;
        assert_eq!(report.total_score, 3.0);
        assert_eq!(report.per_question[0].feedback, MATCH_FEEDBACK);
    }

    #[tokio::test]
    async fn wrong_objective_answer_scores_zero() {
        let rows = vec![row("q1", QuestionType::SingleChoice, "B", 5.0)];
        let report =
            grade_assignment(&FixedScorer(0.0), TIMEOUT, &rows, &answers(&[("q1", "C")])).await;
        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.per_question[0].feedback, MISMATCH_FEEDBACK);
    }

    #[tokio::test]
    async fn unanswered_questions_still_count_toward_full_score() {
        let rows = vec![
            row("q1", QuestionType::SingleChoice, "B", 5.0),
            row("q2", QuestionType::ShortAnswer, "reference", 10.0),
        ];
        let report = grade_assignment(&FixedScorer(100.0), TIMEOUT, &rows, &answers(&[])).await;

        assert_eq!(report.total_score, 0.0);
        assert_eq!(report.full_score, 15.0);
        assert!(report.per_question.iter().all(|q| q.feedback == UNANSWERED_FEEDBACK));
    }

    #[tokio::test]
    async fn delegate_failure_zeroes_only_that_question() {
        let rows = vec![
            row("q1", QuestionType::SingleChoice, "B", 5.0),
            row("q2", QuestionType::ShortAnswer, "reference", 10.0),
        ];
        let answers = answers(&[("q1", "B"), ("q2", "attempt")]);
        let report = grade_assignment(&FailingScorer, TIMEOUT, &rows, &answers).await;

        assert_eq!(report.per_question[0].score, 5.0);
        assert_eq!(report.per_question[1].score, 0.0);
        assert!(report.per_question[1].feedback.starts_with("grading failed:"));
        assert_eq!(report.total_score, 5.0);
        assert_eq!(report.full_score, 15.0);
    }

    #[tokio::test]
    async fn delegate_timeout_is_reported_per_question() {
        let rows = vec![
            row("q1", QuestionType::FillBlank, "42", 5.0),
            row("q2", QuestionType::Code, "fn main() {}", 10.0),
        ];
        let answers = answers(&[("q1", "42"), ("q2", "fn main() { println!() }")]);
        let report =
            grade_assignment(&SlowScorer, Duration::from_millis(50), &rows, &answers).await;

        assert_eq!(report.per_question[0].score, 5.0);
        assert_eq!(report.per_question[1].score, 0.0);
        assert_eq!(report.per_question[1].feedback, "grading failed: scoring delegate timed out");
    }

    #[tokio::test]
    async fn out_of_range_delegate_score_is_clamped() {
        let rows = vec![row("q1", QuestionType::ShortAnswer, "reference", 10.0)];
        let report =
            grade_assignment(&FixedScorer(250.0), TIMEOUT, &rows, &answers(&[("q1", "answer")]))
                .await;
        assert_eq!(report.total_score, 10.0);

        let report =
            grade_assignment(&FixedScorer(-40.0), TIMEOUT, &rows, &answers(&[("q1", "answer")]))
                .await;
        assert_eq!(report.total_score, 0.0);
    }

    #[tokio::test]
    async fn awarded_points_round_to_two_decimals() {
        let rows = vec![row("q1", QuestionType::ShortAnswer, "reference", 1.0)];
        let report =
            grade_assignment(&FixedScorer(33.0), TIMEOUT, &rows, &answers(&[("q1", "answer")]))
                .await;
        assert_eq!(report.per_question[0].score, 0.33);
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(8.0000001), 8.0);
        assert_eq!(round2(0.335), 0.34);
        assert_eq!(round2(17.999999999), 18.0);
    }
}
