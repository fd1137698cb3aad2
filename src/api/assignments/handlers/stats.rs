use axum::extract::Path;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{require_teacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::repositories;
use crate::schemas::submission::{
    StatisticsSummary, SubmissionOverview, SubmissionStatisticsResponse,
};
use crate::services::statistics;

use super::super::helpers;

pub(in crate::api::assignments) async fn list_assignment_submissions(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<SubmissionStatisticsResponse>, ApiError> {
    require_teacher(&user)?;
    let assignment = helpers::fetch_assignment(&state, &assignment_id).await?;
    helpers::require_creator(&assignment, &user)?;

    let full_score = repositories::assignment_questions::sum_points(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute full score"))?;
    let enrolled_count =
        repositories::courses::enrolled_count(state.db(), &assignment.course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to count enrolled students"))?;

    let rows =
        repositories::submissions::list_by_assignment_with_students(state.db(), &assignment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    let scores: Vec<f64> = rows.iter().map(|row| row.score).collect();
    let submitted_count = rows.len() as i64;

    let mut submissions: Vec<SubmissionOverview> = rows
        .into_iter()
        .map(|row| SubmissionOverview {
            submission_id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            submit_time: format_primitive(row.submit_time),
            score: row.score,
            score_rate: statistics::score_rate(row.score, full_score),
            per_question: row.feedback.0,
        })
        .collect();
    submissions.sort_by(|a, b| {
        b.score_rate.partial_cmp(&a.score_rate).unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Json(SubmissionStatisticsResponse {
        assignment_id,
        statistics: StatisticsSummary {
            enrolled_count,
            submitted_count,
            full_score,
            completion_rate: statistics::completion_rate(submitted_count, enrolled_count),
            average_score_rate: statistics::average_score_rate(&scores, full_score),
        },
        submissions,
    }))
}
