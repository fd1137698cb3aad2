mod handlers;
mod helpers;

use axum::{routing::get, routing::post, routing::put, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_assignment).get(handlers::list_assignments))
        .route("/auto-generate", post(handlers::auto_generate_assignment))
        .route("/:assignment_id", axum::routing::delete(handlers::delete_assignment))
        .route(
            "/:assignment_id/questions",
            post(handlers::add_question).get(handlers::get_assignment_questions),
        )
        .route(
            "/:assignment_id/questions/:question_id",
            axum::routing::delete(handlers::remove_question),
        )
        .route(
            "/:assignment_id/questions/:question_id/order",
            put(handlers::reorder_question),
        )
        .route("/:assignment_id/submit", post(handlers::submit_assignment))
        .route("/:assignment_id/submissions", get(handlers::list_assignment_submissions))
}
