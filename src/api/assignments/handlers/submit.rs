use std::time::Duration;

use axum::extract::Path;
use axum::Json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_student, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{SubmitRequest, SubmitResponse};
use crate::services::grading;

pub(in crate::api::assignments) async fn submit_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> Result<(axum::http::StatusCode, Json<SubmitResponse>), ApiError> {
    require_student(&user)?;
    let assignment = super::super::helpers::fetch_assignment(&state, &assignment_id).await?;
    require_course_access(&state, &user, &assignment.course_id).await?;

    let now = primitive_now_utc();
    if now > assignment.deadline {
        return Err(ApiError::DeadlinePassed(format!(
            "Assignment {assignment_id} closed at {}",
            crate::core::time::format_primitive(assignment.deadline)
        )));
    }

    // Advisory pre-check; the unique index is what actually decides races.
    let existing = repositories::submissions::find_by_assignment_and_student(
        state.db(),
        &assignment_id,
        &user.id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to check for an existing submission"))?;

    if let Some(existing) = existing {
        return Err(ApiError::Conflict(format!(
            "Assignment already submitted (submission {})",
            existing.id
        )));
    }

    let rows = repositories::assignment_questions::list_with_questions(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment questions"))?;

    let answers = payload.into_answer_map();
    let timeout = Duration::from_secs(state.settings().scoring().request_timeout_seconds);
    let report = grading::grade_assignment(state.scorer(), timeout, &rows, &answers).await;

    let submission_id = Uuid::new_v4().to_string();
    let inserted = repositories::submissions::insert(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &submission_id,
            assignment_id: &assignment_id,
            student_id: &user.id,
            submit_time: now,
            answers,
            score: report.total_score,
            feedback: report.per_question.clone(),
            created_at: now,
        },
    )
    .await;

    let submission = match inserted {
        Ok(submission) => submission,
        Err(err) if repositories::submissions::is_one_attempt_violation(&err) => {
            // Lost the race: report the winner's submission, never insert a
            // second row.
            let winner = repositories::submissions::find_by_assignment_and_student(
                state.db(),
                &assignment_id,
                &user.id,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to read winning submission"))?;

            let detail = match winner {
                Some(winner) => {
                    format!("Assignment already submitted (submission {})", winner.id)
                }
                None => "Assignment already submitted".to_string(),
            };
            return Err(ApiError::Conflict(detail));
        }
        Err(err) => return Err(ApiError::internal(err, "Failed to persist submission")),
    };

    tracing::info!(
        assignment_id = %assignment_id,
        student_id = %user.id,
        submission_id = %submission.id,
        total_score = report.total_score,
        full_score = report.full_score,
        "Submission graded and recorded"
    );

    Ok((
        axum::http::StatusCode::CREATED,
        Json(SubmitResponse {
            submission_id: submission.id,
            total_score: report.total_score,
            full_score: report.full_score,
            per_question: report.per_question,
        }),
    ))
}
