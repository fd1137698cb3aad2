use axum::extract::{Path, Query};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_teacher, CurrentUser};
use crate::api::pagination::{default_page, default_page_size, PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::QuestionType;
use crate::repositories;
use crate::schemas::question::{QuestionResponse, QuestionUpsert};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route(
            "/:question_id",
            get(get_question).put(update_question).delete(delete_question),
        )
}

#[derive(Debug, Deserialize)]
struct QuestionListQuery {
    #[serde(default)]
    qtype: Option<QuestionType>,
    // serde_urlencoded cannot flatten numeric fields, so the paging window
    // is repeated here instead of embedding PageQuery.
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    #[serde(alias = "pageSize")]
    page_size: i64,
}

async fn create_question(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionUpsert>,
) -> Result<(axum::http::StatusCode, Json<QuestionResponse>), ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let options = payload.validated_options().map_err(ApiError::BadRequest)?;

    let now = primitive_now_utc();
    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            qtype: payload.qtype,
            content: &payload.content,
            options,
            answer: &payload.answer,
            points: payload.points,
            key_knowledge: payload.key_knowledge.as_deref(),
            difficulty: payload.difficulty,
            created_by: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((axum::http::StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn get_question(
    Path(question_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    require_teacher(&user)?;

    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;

    let Some(question) = question else {
        return Err(ApiError::NotFound(format!("Question {question_id} not found")));
    };

    Ok(Json(QuestionResponse::from_db(question)))
}

async fn list_questions(
    Query(params): Query<QuestionListQuery>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<PaginatedResponse<QuestionResponse>>, ApiError> {
    require_teacher(&user)?;
    let page = PageQuery { page: params.page, page_size: params.page_size };
    let (offset, limit) = page.offset_limit(state.settings().assessment().max_page_size)?;

    let questions = repositories::questions::list(state.db(), params.qtype, offset, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let total_count = repositories::questions::count(state.db(), params.qtype)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(PaginatedResponse {
        items: questions.into_iter().map(QuestionResponse::from_db).collect(),
        total_count,
        page: page.page,
        page_size: page.page_size,
    }))
}

async fn update_question(
    Path(question_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<QuestionUpsert>,
) -> Result<Json<QuestionResponse>, ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let options = payload.validated_options().map_err(ApiError::BadRequest)?;

    let question = repositories::questions::update(
        state.db(),
        &question_id,
        repositories::questions::UpdateQuestion {
            qtype: payload.qtype,
            content: &payload.content,
            options,
            answer: &payload.answer,
            points: payload.points,
            key_knowledge: payload.key_knowledge.as_deref(),
            difficulty: payload.difficulty,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    let Some(question) = question else {
        return Err(ApiError::NotFound(format!("Question {question_id} not found")));
    };

    Ok(Json(QuestionResponse::from_db(question)))
}

async fn delete_question(
    Path(question_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_teacher(&user)?;

    let question = repositories::questions::find_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;

    if question.is_none() {
        return Err(ApiError::NotFound(format!("Question {question_id} not found")));
    }

    // Reference guard: a question stays in the bank while any assignment
    // still binds it.
    let referenced =
        repositories::assignment_questions::exists_for_question(state.db(), &question_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check question references"))?;

    if referenced {
        return Err(ApiError::Conflict(format!(
            "Question {question_id} is used by an assignment and cannot be deleted"
        )));
    }

    repositories::questions::delete_by_id(state.db(), &question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    tracing::info!(question_id = %question_id, "Question deleted from bank");

    Ok(Json(serde_json::json!({ "message": "Question deleted successfully" })))
}
