use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Ensures the configured first teacher account exists and can log in.
pub(crate) async fn ensure_first_teacher(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_teacher_password.is_empty() {
        tracing::warn!("FIRST_TEACHER_PASSWORD not configured; skipping teacher bootstrap");
        return Ok(());
    }

    let username = &admin.first_teacher_username;
    let user = repositories::users::find_by_username(state.db(), username).await?;
    let now = primitive_now_utc();

    if let Some(user) = user {
        let verified =
            security::verify_password(&admin.first_teacher_password, &user.hashed_password)
                .unwrap_or(false);
        let needs_update = !verified || user.role != UserRole::Teacher || !user.is_active;

        if needs_update {
            let hashed_password = if verified {
                user.hashed_password.clone()
            } else {
                security::hash_password(&admin.first_teacher_password)?
            };

            sqlx::query(
                "UPDATE users
                 SET hashed_password = $1, role = $2, is_active = TRUE, updated_at = $3
                 WHERE id = $4",
            )
            .bind(hashed_password)
            .bind(UserRole::Teacher)
            .bind(now)
            .bind(&user.id)
            .execute(state.db())
            .await?;

            tracing::info!("Updated default teacher account {username}");
        } else {
            tracing::info!("Default teacher account already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_teacher_password)?;

    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            hashed_password,
            full_name: "Default Teacher",
            role: UserRole::Teacher,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!("Created default teacher account {username}");
    Ok(())
}
