use axum::extract::Path;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_teacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::assignment::{
    AddQuestionRequest, AssignmentQuestionsResponse, ReorderRequest,
};

use super::super::helpers;

pub(in crate::api::assignments) async fn delete_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_teacher(&user)?;
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    helpers::require_creator(&assignment, &user)?;

    // Submission history is append-only; an assignment with recorded
    // attempts cannot be removed out from under it.
    let submission_count =
        repositories::submissions::count_by_assignment(state.db(), &assignment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count submissions"))?;
    if submission_count > 0 {
        return Err(ApiError::Conflict(format!(
            "Assignment {assignment_id} has submissions and cannot be deleted"
        )));
    }

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    // The assignment owns its question bindings: cascade them explicitly.
    repositories::assignment_questions::delete_by_assignment(&mut *tx, &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment questions"))?;
    repositories::assignments::delete_by_id(&mut *tx, &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(assignment_id = %assignment_id, "Assignment deleted");

    Ok(Json(serde_json::json!({ "message": "Assignment deleted successfully" })))
}

pub(in crate::api::assignments) async fn add_question(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AddQuestionRequest>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    helpers::require_creator(&assignment, &user)?;

    let question = repositories::questions::find_by_id(state.db(), &payload.question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?;
    let Some(question) = question else {
        return Err(ApiError::NotFound(format!("Question {} not found", payload.question_id)));
    };

    let existing =
        repositories::assignment_questions::find(state.db(), &assignment_id, &question.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check question binding"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(format!(
            "Question {} is already part of this assignment",
            question.id
        )));
    }

    let max_order = repositories::assignment_questions::max_order(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to read current ordering"))?;
    let next_order = max_order + 1;

    repositories::assignment_questions::insert(
        state.db(),
        repositories::assignment_questions::CreateAssignmentQuestion {
            id: &Uuid::new_v4().to_string(),
            assignment_id: &assignment_id,
            question_id: &question.id,
            order_index: next_order,
            points: payload.points.unwrap_or(question.points),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to add question to assignment"))?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Question added successfully",
            "assignment_id": assignment_id,
            "question_id": question.id,
            "order_index": next_order
        })),
    ))
}

pub(in crate::api::assignments) async fn remove_question(
    Path((assignment_id, question_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_teacher(&user)?;
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    helpers::require_creator(&assignment, &user)?;

    // Remaining ranks keep their values; readers order by rank, so the gap
    // is harmless and later reorders still work.
    let removed =
        repositories::assignment_questions::delete(state.db(), &assignment_id, &question_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to remove question"))?;

    if !removed {
        return Err(ApiError::NotFound(format!(
            "Question {question_id} is not part of assignment {assignment_id}"
        )));
    }

    Ok(Json(serde_json::json!({ "message": "Question removed successfully" })))
}

pub(in crate::api::assignments) async fn reorder_question(
    Path((assignment_id, question_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_teacher(&user)?;
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    helpers::require_creator(&assignment, &user)?;

    let binding =
        repositories::assignment_questions::find(state.db(), &assignment_id, &question_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch question binding"))?;
    let Some(binding) = binding else {
        return Err(ApiError::NotFound(format!(
            "Question {question_id} is not part of assignment {assignment_id}"
        )));
    };

    let total = repositories::assignment_questions::count_by_assignment(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count assignment questions"))?;

    let new_order = payload.new_order;
    if new_order < 1 || i64::from(new_order) > total {
        return Err(ApiError::BadRequest(format!(
            "new_order must be between 1 and {total}"
        )));
    }

    let old_order = binding.order_index;
    if old_order == new_order {
        return Ok(Json(serde_json::json!({
            "message": "Order unchanged",
            "new_order": new_order
        })));
    }

    // Shift-then-set as one transaction; the deferred unique constraint on
    // (assignment, rank) checks at commit, so no intermediate state leaks.
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    if old_order < new_order {
        repositories::assignment_questions::shift_range_down(
            &mut *tx,
            &assignment_id,
            old_order,
            new_order,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to shift question order"))?;
    } else {
        repositories::assignment_questions::shift_range_up(
            &mut *tx,
            &assignment_id,
            new_order,
            old_order,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to shift question order"))?;
    }

    repositories::assignment_questions::set_order(&mut *tx, &assignment_id, &question_id, new_order)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to set question order"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    tracing::info!(
        assignment_id = %assignment_id,
        question_id = %question_id,
        old_order,
        new_order,
        "Question reordered"
    );

    Ok(Json(serde_json::json!({
        "message": "Question order updated successfully",
        "new_order": new_order
    })))
}

pub(in crate::api::assignments) async fn get_assignment_questions(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<AssignmentQuestionsResponse>, ApiError> {
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    require_course_access(&state, &user, &assignment.course_id).await?;

    // Students only see reference answers once their own attempt is in.
    let include_answer = match user.role {
        UserRole::Teacher => true,
        UserRole::Student => repositories::submissions::find_by_assignment_and_student(
            state.db(),
            &assignment_id,
            &user.id,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check submission"))?
        .is_some(),
    };

    let rows =
        repositories::assignment_questions::list_with_questions(state.db(), &assignment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list assignment questions"))?;

    Ok(Json(AssignmentQuestionsResponse {
        assignment_id,
        questions: rows
            .into_iter()
            .map(|row| helpers::bound_question_response(row, include_answer))
            .collect(),
    }))
}
