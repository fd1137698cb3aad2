use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionType};

pub(crate) const COLUMNS: &str = "\
    id, qtype, content, options, answer, points, key_knowledge, difficulty, \
    created_by, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub qtype: QuestionType,
    pub content: &'a str,
    pub options: Option<Vec<String>>,
    pub answer: &'a str,
    pub points: f64,
    pub key_knowledge: Option<&'a str>,
    pub difficulty: DifficultyLevel,
    pub created_by: &'a str,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, qtype, content, options, answer, points, key_knowledge, difficulty,
            created_by, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.qtype)
    .bind(params.content)
    .bind(params.options.map(Json))
    .bind(params.answer)
    .bind(params.points)
    .bind(params.key_knowledge)
    .bind(params.difficulty)
    .bind(params.created_by)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateQuestion<'a> {
    pub qtype: QuestionType,
    pub content: &'a str,
    pub options: Option<Vec<String>>,
    pub answer: &'a str,
    pub points: f64,
    pub key_knowledge: Option<&'a str>,
    pub difficulty: DifficultyLevel,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateQuestion<'_>,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions
         SET qtype = $1, content = $2, options = $3, answer = $4, points = $5,
             key_knowledge = $6, difficulty = $7, updated_at = $8
         WHERE id = $9
         RETURNING {COLUMNS}",
    ))
    .bind(params.qtype)
    .bind(params.content)
    .bind(params.options.map(Json))
    .bind(params.answer)
    .bind(params.points)
    .bind(params.key_knowledge)
    .bind(params.difficulty)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list(
    pool: &PgPool,
    qtype: Option<QuestionType>,
    offset: i64,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM questions"));

    if let Some(qtype) = qtype {
        builder.push(" WHERE qtype = ");
        builder.push_bind(qtype);
    }

    builder.push(" ORDER BY id OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub(crate) async fn count(
    pool: &PgPool,
    qtype: Option<QuestionType>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions");

    if let Some(qtype) = qtype {
        builder.push(" WHERE qtype = ");
        builder.push_bind(qtype);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Bank candidates for the auto-composer: one type, tagged with any of the
/// given knowledge points.
pub(crate) async fn list_by_type_and_knowledge(
    pool: &PgPool,
    qtype: QuestionType,
    knowledge_points: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if knowledge_points.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions
         WHERE qtype = $1 AND key_knowledge = ANY($2)
         ORDER BY id",
    ))
    .bind(qtype)
    .bind(knowledge_points)
    .fetch_all(pool)
    .await
}
