use axum::extract::{Path, Query};
use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::{require_student, CurrentUser};
use crate::api::pagination::{default_page, default_page_size, PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::repositories;
use crate::repositories::submissions::StudentScoreRow;
use crate::schemas::submission::{
    GradeDetailQuestion, GradeDetailResponse, RecentScoresResponse, RecentScoresSummary,
    ScorePoint, StudentScoreRowResponse,
};
use crate::services::statistics;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/recent", get(recent_scores))
        .route("/my-scores", get(my_scores))
        .route("/detail/:submission_id", get(grade_detail))
}

#[derive(Debug, Deserialize)]
struct RecentScoresQuery {
    #[serde(default = "default_recent_limit")]
    limit: i64,
    #[serde(default)]
    #[serde(alias = "courseId")]
    course_id: Option<String>,
}

fn default_recent_limit() -> i64 {
    10
}

async fn recent_scores(
    Query(params): Query<RecentScoresQuery>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<RecentScoresResponse>, ApiError> {
    require_student(&user)?;

    let max_limit = state.settings().assessment().recent_scores_max_limit;
    if params.limit < 1 || params.limit > max_limit {
        return Err(ApiError::BadRequest(format!("limit must be between 1 and {max_limit}")));
    }

    let mut rows = repositories::submissions::list_recent_by_student(
        state.db(),
        &user.id,
        params.course_id.as_deref(),
        params.limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load recent scores"))?;

    // The query returns newest first; the chart reads oldest to newest.
    rows.reverse();

    let score_rates: Vec<f64> =
        rows.iter().map(|row| statistics::score_rate(row.score, row.full_score)).collect();

    let chart: Vec<ScorePoint> = rows
        .into_iter()
        .zip(score_rates.iter())
        .map(|(row, rate)| ScorePoint {
            assignment_id: row.assignment_id,
            assignment_title: row.assignment_title,
            submit_time: format_primitive(row.submit_time),
            score: row.score,
            full_score: row.full_score,
            score_rate: *rate,
        })
        .collect();

    let average_score_rate = if score_rates.is_empty() {
        0.0
    } else {
        crate::services::grading::round2(
            score_rates.iter().sum::<f64>() / score_rates.len() as f64,
        )
    };
    let highest_score_rate = score_rates.iter().copied().fold(0.0, f64::max);
    let lowest_score_rate =
        score_rates.iter().copied().fold(f64::INFINITY, f64::min).min(highest_score_rate);

    Ok(Json(RecentScoresResponse {
        summary: RecentScoresSummary {
            total_assignments: chart.len(),
            average_score_rate,
            highest_score_rate,
            lowest_score_rate: if chart.is_empty() { 0.0 } else { lowest_score_rate },
            trend: statistics::classify_trend(&score_rates),
        },
        chart,
    }))
}

#[derive(Debug, Deserialize)]
struct MyScoresQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    #[serde(alias = "pageSize")]
    page_size: i64,
    #[serde(default)]
    #[serde(alias = "courseId")]
    course_id: Option<String>,
}

async fn my_scores(
    Query(params): Query<MyScoresQuery>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<PaginatedResponse<StudentScoreRowResponse>>, ApiError> {
    require_student(&user)?;
    let page = PageQuery { page: params.page, page_size: params.page_size };
    let (offset, limit) = page.offset_limit(state.settings().assessment().max_page_size)?;

    let rows = repositories::submissions::list_by_student_paged(
        state.db(),
        &user.id,
        params.course_id.as_deref(),
        offset,
        limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list scores"))?;
    let total_count = repositories::submissions::count_by_student(
        state.db(),
        &user.id,
        params.course_id.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to count scores"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(score_row_response).collect(),
        total_count,
        page: page.page,
        page_size: page.page_size,
    }))
}

fn score_row_response(row: StudentScoreRow) -> StudentScoreRowResponse {
    let score_rate = statistics::score_rate(row.score, row.full_score);
    StudentScoreRowResponse {
        submission_id: row.id,
        assignment_id: row.assignment_id,
        assignment_title: row.assignment_title,
        course_id: row.course_id,
        course_title: row.course_title,
        deadline: format_primitive(row.deadline),
        submit_time: format_primitive(row.submit_time),
        score: row.score,
        full_score: row.full_score,
        score_rate,
    }
}

async fn grade_detail(
    Path(submission_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
) -> Result<Json<GradeDetailResponse>, ApiError> {
    require_student(&user)?;

    let submission =
        repositories::submissions::find_by_id_for_student(state.db(), &submission_id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?;
    let Some(submission) = submission else {
        return Err(ApiError::NotFound(format!("Submission {submission_id} not found")));
    };

    let assignment =
        repositories::assignments::find_by_id(state.db(), &submission.assignment_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
            .ok_or_else(|| ApiError::NotFound("Assignment no longer exists".to_string()))?;
    let course = repositories::courses::find_by_id(state.db(), &assignment.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;

    let full_score =
        repositories::assignment_questions::sum_points(state.db(), &assignment.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to compute full score"))?;

    let rows = repositories::assignment_questions::list_with_questions(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assignment questions"))?;
    let bank: std::collections::HashMap<String, _> =
        rows.into_iter().map(|row| (row.question_id.clone(), row)).collect();

    let answers = &submission.answers.0;
    let questions: Vec<GradeDetailQuestion> = submission
        .feedback
        .0
        .iter()
        .filter_map(|grade| {
            let row = bank.get(&grade.question_id)?;
            Some(GradeDetailQuestion {
                question_id: grade.question_id.clone(),
                qtype: grade.qtype,
                content: row.content.clone(),
                options: row.options.as_ref().map(|options| options.0.clone()),
                student_answer: answers.get(&grade.question_id).cloned().unwrap_or_default(),
                correct_answer: row.answer.clone(),
                score: grade.score,
                max_points: grade.max_points,
                feedback: grade.feedback.clone(),
                key_knowledge: row.key_knowledge.clone(),
                difficulty: row.difficulty,
            })
        })
        .collect();

    Ok(Json(GradeDetailResponse {
        submission_id: submission.id,
        assignment_id: assignment.id,
        assignment_title: assignment.title,
        course_title: course.map(|course| course.title).unwrap_or_default(),
        submit_time: format_primitive(submission.submit_time),
        deadline: format_primitive(assignment.deadline),
        score: submission.score,
        full_score,
        score_rate: statistics::score_rate(submission.score, full_score),
        questions,
    }))
}
