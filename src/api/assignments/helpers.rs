use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Assignment, User};
use crate::repositories;
use crate::repositories::assignment_questions::BoundQuestionRow;
use crate::schemas::assignment::BoundQuestionResponse;

pub(super) async fn fetch_assignment(
    state: &AppState,
    assignment_id: &str,
) -> Result<Assignment, ApiError> {
    let assignment = repositories::assignments::find_by_id(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?;

    assignment.ok_or_else(|| ApiError::NotFound(format!("Assignment {assignment_id} not found")))
}

/// Composition and statistics endpoints are reserved for the creator.
pub(super) fn require_creator(assignment: &Assignment, user: &User) -> Result<(), ApiError> {
    if assignment.creator_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only the assignment creator may do this"))
    }
}

pub(super) fn bound_question_response(
    row: BoundQuestionRow,
    include_answer: bool,
) -> BoundQuestionResponse {
    BoundQuestionResponse {
        question_id: row.question_id,
        order_index: row.order_index,
        qtype: row.qtype,
        content: row.content,
        options: row.options.map(|options| options.0),
        points: row.points,
        key_knowledge: row.key_knowledge,
        difficulty: row.difficulty,
        answer: include_answer.then_some(row.answer),
    }
}
