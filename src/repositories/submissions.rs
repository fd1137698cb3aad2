use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{AssignmentSubmission, QuestionGrade};

const COLUMNS: &str = "\
    id, assignment_id, student_id, submit_time, answers, score, feedback, created_at";

pub(crate) const ONE_ATTEMPT_CONSTRAINT: &str = "assignment_submissions_one_attempt";

/// True when the error is the one-attempt unique index rejecting a second
/// submission for the same (assignment, student) pair.
pub(crate) fn is_one_attempt_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(ONE_ATTEMPT_CONSTRAINT),
        _ => false,
    }
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub assignment_id: &'a str,
    pub student_id: &'a str,
    pub submit_time: PrimitiveDateTime,
    pub answers: HashMap<String, String>,
    pub score: f64,
    pub feedback: Vec<QuestionGrade>,
    pub created_at: PrimitiveDateTime,
}

/// Plain insert; the unique index decides races. Callers translate
/// violations via [`is_one_attempt_violation`].
pub(crate) async fn insert(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<AssignmentSubmission, sqlx::Error> {
    sqlx::query_as::<_, AssignmentSubmission>(&format!(
        "INSERT INTO assignment_submissions (
            id, assignment_id, student_id, submit_time, answers, score, feedback, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.assignment_id)
    .bind(params.student_id)
    .bind(params.submit_time)
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(Json(params.feedback))
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_assignment_and_student(
    pool: &PgPool,
    assignment_id: &str,
    student_id: &str,
) -> Result<Option<AssignmentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentSubmission>(&format!(
        "SELECT {COLUMNS} FROM assignment_submissions
         WHERE assignment_id = $1 AND student_id = $2",
    ))
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_by_id_for_student(
    pool: &PgPool,
    id: &str,
    student_id: &str,
) -> Result<Option<AssignmentSubmission>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentSubmission>(&format!(
        "SELECT {COLUMNS} FROM assignment_submissions WHERE id = $1 AND student_id = $2",
    ))
    .bind(id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn count_by_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM assignment_submissions WHERE assignment_id = $1")
        .bind(assignment_id)
        .fetch_one(pool)
        .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubmissionWithStudentRow {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) submit_time: PrimitiveDateTime,
    pub(crate) score: f64,
    pub(crate) feedback: Json<Vec<QuestionGrade>>,
}

pub(crate) async fn list_by_assignment_with_students(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<SubmissionWithStudentRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionWithStudentRow>(
        "SELECT s.id,
                s.student_id,
                u.full_name AS student_name,
                s.submit_time,
                s.score,
                s.feedback
         FROM assignment_submissions s
         JOIN users u ON u.id = s.student_id
         WHERE s.assignment_id = $1
         ORDER BY s.submit_time",
    )
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudentScoreRow {
    pub(crate) id: String,
    pub(crate) assignment_id: String,
    pub(crate) assignment_title: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) deadline: PrimitiveDateTime,
    pub(crate) submit_time: PrimitiveDateTime,
    pub(crate) score: f64,
    pub(crate) full_score: f64,
}

const STUDENT_SCORE_SELECT: &str = "\
    SELECT s.id,
           s.assignment_id,
           a.title AS assignment_title,
           a.course_id,
           c.title AS course_title,
           a.deadline,
           s.submit_time,
           s.score,
           (SELECT COALESCE(SUM(aq.points), 0)
            FROM assignment_questions aq
            WHERE aq.assignment_id = s.assignment_id) AS full_score
    FROM assignment_submissions s
    JOIN assignments a ON a.id = s.assignment_id
    JOIN courses c ON c.id = a.course_id
    WHERE s.student_id = ";

/// Most recent submissions first; callers reverse for chart ordering.
pub(crate) async fn list_recent_by_student(
    pool: &PgPool,
    student_id: &str,
    course_id: Option<&str>,
    limit: i64,
) -> Result<Vec<StudentScoreRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(STUDENT_SCORE_SELECT);
    builder.push_bind(student_id);

    if let Some(course_id) = course_id {
        builder.push(" AND a.course_id = ");
        builder.push_bind(course_id);
    }

    builder.push(" ORDER BY s.submit_time DESC LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<StudentScoreRow>().fetch_all(pool).await
}

pub(crate) async fn list_by_student_paged(
    pool: &PgPool,
    student_id: &str,
    course_id: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<Vec<StudentScoreRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(STUDENT_SCORE_SELECT);
    builder.push_bind(student_id);

    if let Some(course_id) = course_id {
        builder.push(" AND a.course_id = ");
        builder.push_bind(course_id);
    }

    builder.push(" ORDER BY s.submit_time DESC OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<StudentScoreRow>().fetch_all(pool).await
}

pub(crate) async fn count_by_student(
    pool: &PgPool,
    student_id: &str,
    course_id: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*)
         FROM assignment_submissions s
         JOIN assignments a ON a.id = s.assignment_id
         WHERE s.student_id = ",
    );
    builder.push_bind(student_id);

    if let Some(course_id) = course_id {
        builder.push(" AND a.course_id = ");
        builder.push_bind(course_id);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}
