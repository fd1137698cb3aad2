use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_teacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::repositories;
use crate::schemas::assignment::{AutoGenerateRequest, AutoGenerateResponse};
use crate::services::auto_compose;

pub(in crate::api::assignments) async fn auto_generate_assignment(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<AutoGenerateRequest>,
) -> Result<(axum::http::StatusCode, Json<AutoGenerateResponse>), ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_access(&state, &user, &payload.course_id).await?;

    let mastery: Vec<auto_compose::KnowledgePointMastery> = payload
        .knowledge_points
        .iter()
        .map(|point| auto_compose::KnowledgePointMastery {
            knowledge_point: point.knowledge_point.clone(),
            mastery_score: point.mastery_score,
        })
        .collect();
    let weak_points = auto_compose::weakest_points(&mastery);

    // Selection happens fully before anything is written, so a shortfall in
    // any requested bucket leaves no assignment behind.
    let mut selected = Vec::new();
    for request in &payload.question_amounts {
        let candidates = repositories::questions::list_by_type_and_knowledge(
            state.db(),
            request.qtype,
            &weak_points,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to query question bank"))?;

        let amount = request.amount as usize;
        if candidates.len() < amount {
            return Err(ApiError::InsufficientData(format!(
                "Not enough {} questions for the weak knowledge points: requested {}, found {}",
                request.qtype.as_str(),
                amount,
                candidates.len()
            )));
        }

        let mut rng = rand::thread_rng();
        selected.extend(auto_compose::draw_without_replacement(candidates, amount, &mut rng));
    }

    let title = payload.title.clone().filter(|title| !title.trim().is_empty());
    let title = title.unwrap_or_else(|| auto_compose::default_title(&weak_points));
    let description = payload.description.clone().filter(|text| !text.trim().is_empty());
    let description = description.unwrap_or_else(|| auto_compose::default_description(&weak_points));

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let assignment_id = Uuid::new_v4().to_string();
    repositories::assignments::create(
        &mut *tx,
        repositories::assignments::CreateAssignment {
            id: &assignment_id,
            course_id: &payload.course_id,
            creator_id: &user.id,
            title: &title,
            description: &description,
            content: None,
            answer: None,
            deadline: to_primitive_utc(payload.deadline),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

    for (position, question) in selected.iter().enumerate() {
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
        assignment_id = %assignment_id,
        question_count = selected.len(),
        weak_points = ?weak_points,
        "Assignment auto-generated from weak knowledge points"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AutoGenerateResponse {
            assignment_id,
            title,
            question_count: selected.len(),
            knowledge_points: weak_points,
        }),
    ))
}
