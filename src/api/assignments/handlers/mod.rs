mod auto;
mod create;
mod manage;
mod stats;
mod submit;

pub(super) use auto::auto_generate_assignment;
pub(super) use create::{create_assignment, list_assignments};
pub(super) use manage::{
    add_question, delete_assignment, get_assignment_questions, remove_question, reorder_question,
};
pub(super) use stats::list_assignment_submissions;
pub(super) use submit::submit_assignment;
