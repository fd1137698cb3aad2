pub(crate) mod assignment_questions;
pub(crate) mod assignments;
pub(crate) mod courses;
pub(crate) mod questions;
pub(crate) mod submissions;
pub(crate) mod users;
