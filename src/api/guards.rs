use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

pub(crate) fn require_teacher(user: &User) -> Result<(), ApiError> {
    if user.role == UserRole::Teacher {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Teacher role required"))
    }
}

pub(crate) fn require_student(user: &User) -> Result<(), ApiError> {
    if user.role == UserRole::Student {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Student role required"))
    }
}

/// The caller must be enrolled in the course (students) or be its owning
/// teacher.
pub(crate) async fn require_course_access(
    state: &AppState,
    user: &User,
    course_id: &str,
) -> Result<(), ApiError> {
    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;

    let Some(course) = course else {
        return Err(ApiError::NotFound(format!("Course {course_id} not found")));
    };

    match user.role {
        UserRole::Teacher => {
            if course.teacher_id == user.id {
                Ok(())
            } else {
                Err(ApiError::Forbidden("Not the teacher of this course"))
            }
        }
        UserRole::Student => {
            let enrolled = repositories::courses::is_enrolled(state.db(), course_id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;
            if enrolled {
                Ok(())
            } else {
                Err(ApiError::Forbidden("Enrollment required for this course"))
            }
        }
    }
}
