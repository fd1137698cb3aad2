use std::collections::HashSet;

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_teacher, CurrentUser};
use crate::api::pagination::{default_page, default_page_size, PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::repositories;
use crate::schemas::assignment::{AssignmentCreate, AssignmentResponse};

pub(in crate::api::assignments) async fn create_assignment(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(axum::http::StatusCode, Json<AssignmentResponse>), ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_access(&state, &user, &payload.course_id).await?;

    let mut seen = HashSet::new();
    for question_id in &payload.question_ids {
        if !seen.insert(question_id) {
            return Err(ApiError::BadRequest(format!(
                "Question {question_id} appears more than once"
            )));
        }
    }

    // The whole composition is one transaction: any missing question id
    // aborts the creation with nothing persisted.
    let mut questions = Vec::with_capacity(payload.question_ids.len());
    for question_id in &payload.question_ids {
        let question = repositories::questions::find_by_id(state.db(), question_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
        let Some(question) = question else {
            return Err(ApiError::NotFound(format!("Question {question_id} not found")));
        };
        questions.push(question);
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let assignment_id = Uuid::new_v4().to_string();
    let assignment = repositories::assignments::create(
        &mut *tx,
        repositories::assignments::CreateAssignment {
            id: &assignment_id,
            course_id: &payload.course_id,
            creator_id: &user.id,
            title: &payload.title,
            description: &payload.description,
            content: payload.content.as_deref(),
            answer: payload.answer.as_deref(),
            deadline: to_primitive_utc(payload.deadline),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

    for (position, question) in questions.iter().enumerate() {
        repositories::assignment_questions::insert(
            &mut *tx,
            repositories::assignment_questions::CreateAssignmentQuestion {
                id: &Uuid::new_v4().to_string(),
                assignment_id: &assignment_id,
                question_id: &question.id,
                order_index: position as i32 + 1,
                points: question.points,
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to bind question to assignment"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        assignment_id = %assignment.id,
        course_id = %assignment.course_id,
        question_count = questions.len(),
        "Assignment created"
    );

    Ok((axum::http::StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

#[derive(Debug, Deserialize)]
pub(in crate::api::assignments) struct AssignmentListQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    #[serde(alias = "pageSize")]
    page_size: i64,
}

pub(in crate::api::assignments) async fn list_assignments(
    Query(params): Query<AssignmentListQuery>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<PaginatedResponse<AssignmentResponse>>, ApiError> {
    require_teacher(&user)?;
    let page = PageQuery { page: params.page, page_size: params.page_size };
    let (offset, limit) = page.offset_limit(state.settings().assessment().max_page_size)?;

    let assignments =
        repositories::assignments::list_by_creator(state.db(), &user.id, offset, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;
    let total_count = repositories::assignments::count_by_creator(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count assignments"))?;

    Ok(Json(PaginatedResponse {
        items: assignments.into_iter().map(AssignmentResponse::from_db).collect(),
        total_count,
        page: page.page,
        page_size: page.page_size,
    }))
}
