use sqlx::{PgExecutor, PgPool};

use crate::db::models::Assignment;

pub(crate) const COLUMNS: &str = "\
    id, course_id, creator_id, title, description, content, answer, deadline, \
    created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateAssignment<'a> {
    pub id: &'a str,
    pub course_id: &'a str,
    pub creator_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub content: Option<&'a str>,
    pub answer: Option<&'a str>,
    pub deadline: time::PrimitiveDateTime,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create<'e>(
    executor: impl PgExecutor<'e>,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (
            id, course_id, creator_id, title, description, content, answer, deadline,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.creator_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.content)
    .bind(params.answer)
    .bind(params.deadline)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM assignments WHERE id = $1").bind(id).execute(executor).await?;
    Ok(())
}

pub(crate) async fn list_by_creator(
    pool: &PgPool,
    creator_id: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments
         WHERE creator_id = $1
         ORDER BY created_at DESC, id
         OFFSET $2 LIMIT $3",
    ))
    .bind(creator_id)
    .bind(offset.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_creator(
    pool: &PgPool,
    creator_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE creator_id = $1")
        .bind(creator_id)
        .fetch_one(pool)
        .await
}
