use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use crate::db::models::AssignmentQuestion;
use crate::db::types::{DifficultyLevel, QuestionType};

const COLUMNS: &str = "id, assignment_id, question_id, order_index, points, created_at";

/// Assignment binding joined with the bank question it references.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct BoundQuestionRow {
    pub(crate) question_id: String,
    pub(crate) order_index: i32,
    pub(crate) points: f64,
    pub(crate) qtype: QuestionType,
    pub(crate) content: String,
    pub(crate) options: Option<Json<Vec<String>>>,
    pub(crate) answer: String,
    pub(crate) key_knowledge: Option<String>,
    pub(crate) difficulty: DifficultyLevel,
}

pub(crate) async fn find(
    pool: &PgPool,
    assignment_id: &str,
    question_id: &str,
) -> Result<Option<AssignmentQuestion>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentQuestion>(&format!(
        "SELECT {COLUMNS} FROM assignment_questions
         WHERE assignment_id = $1 AND question_id = $2",
    ))
    .bind(assignment_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

/// Rows sorted by rank. Removal leaves gaps, so callers must rely on the
/// sort order rather than on contiguous values.
pub(crate) async fn list_with_questions(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<BoundQuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, BoundQuestionRow>(
        "SELECT aq.question_id,
                aq.order_index,
                aq.points,
                q.qtype,
                q.content,
                q.options,
                q.answer,
                q.key_knowledge,
                q.difficulty
         FROM assignment_questions aq
         JOIN questions q ON q.id = aq.question_id
         WHERE aq.assignment_id = $1
         ORDER BY aq.order_index",
    )
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM assignment_questions WHERE assignment_id = $1")
        .bind(assignment_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn max_order(pool: &PgPool, assignment_id: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index), 0) FROM assignment_questions WHERE assignment_id = $1",
    )
    .bind(assignment_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn sum_points(pool: &PgPool, assignment_id: &str) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(points), 0) FROM assignment_questions WHERE assignment_id = $1",
    )
    .bind(assignment_id)
    .fetch_one(pool)
    .await
}

/// Reference guard for question deletion from the bank.
pub(crate) async fn exists_for_question(
    pool: &PgPool,
    question_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM assignment_questions WHERE question_id = $1",
    )
    .bind(question_id)
    .fetch_one(pool)
    .await
    .map(|count| count > 0)
}

pub(crate) struct CreateAssignmentQuestion<'a> {
    pub id: &'a str,
    pub assignment_id: &'a str,
    pub question_id: &'a str,
    pub order_index: i32,
    pub points: f64,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    params: CreateAssignmentQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO assignment_questions (
            id, assignment_id, question_id, order_index, points, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(params.id)
    .bind(params.assignment_id)
    .bind(params.question_id)
    .bind(params.order_index)
    .bind(params.points)
    .bind(params.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Deletes one binding; remaining ranks are intentionally NOT renumbered.
pub(crate) async fn delete(
    pool: &PgPool,
    assignment_id: &str,
    question_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM assignment_questions WHERE assignment_id = $1 AND question_id = $2",
    )
    .bind(assignment_id)
    .bind(question_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_by_assignment<'e>(
    executor: impl PgExecutor<'e>,
    assignment_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM assignment_questions WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Moving a question later: everything in (old, new] steps back one slot.
pub(crate) async fn shift_range_down<'e>(
    executor: impl PgExecutor<'e>,
    assignment_id: &str,
    old_order: i32,
    new_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE assignment_questions
         SET order_index = order_index - 1
         WHERE assignment_id = $1 AND order_index > $2 AND order_index <= $3",
    )
    .bind(assignment_id)
    .bind(old_order)
    .bind(new_order)
    .execute(executor)
    .await?;
    Ok(())
}

/// Moving a question earlier: everything in [new, old) steps forward one slot.
pub(crate) async fn shift_range_up<'e>(
    executor: impl PgExecutor<'e>,
    assignment_id: &str,
    new_order: i32,
    old_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE assignment_questions
         SET order_index = order_index + 1
         WHERE assignment_id = $1 AND order_index >= $2 AND order_index < $3",
    )
    .bind(assignment_id)
    .bind(new_order)
    .bind(old_order)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn set_order<'e>(
    executor: impl PgExecutor<'e>,
    assignment_id: &str,
    question_id: &str,
    new_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE assignment_questions
         SET order_index = $1
         WHERE assignment_id = $2 AND question_id = $3",
    )
    .bind(new_order)
    .bind(assignment_id)
    .bind(question_id)
    .execute(executor)
    .await?;
    Ok(())
}
