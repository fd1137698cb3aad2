//! Minimal roster plumbing: just enough for teachers to open a course and
//! enroll students, which the statistics and submission paths depend on.

use axum::extract::Path;
use axum::{routing::post, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_teacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseResponse, EnrollRequest};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course))
        .route("/:course_id/students", post(enroll_student))
}

async fn create_course(
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(axum::http::StatusCode, Json<CourseResponse>), ApiError> {
    require_teacher(&user)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            description: payload.description.as_deref(),
            teacher_id: &user.id,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    Ok((axum::http::StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn enroll_student(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    state: axum::extract::State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_teacher(&user)?;

    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;
    let Some(course) = course else {
        return Err(ApiError::NotFound(format!("Course {course_id} not found")));
    };
    if course.teacher_id != user.id {
        return Err(ApiError::Forbidden("Not the teacher of this course"));
    }

    let student = repositories::users::find_by_id(state.db(), &payload.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?;
    let Some(student) = student else {
        return Err(ApiError::NotFound(format!("User {} not found", payload.student_id)));
    };
    if student.role != UserRole::Student {
        return Err(ApiError::BadRequest("Only students can be enrolled".to_string()));
    }

    repositories::courses::enroll_student(state.db(), &course_id, &student.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to enroll student"))?;

    Ok(Json(serde_json::json!({
        "message": "Student enrolled successfully",
        "course_id": course_id,
        "student_id": student.id
    })))
}
