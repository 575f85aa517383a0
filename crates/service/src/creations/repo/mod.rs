pub mod migrating;
pub mod seaorm;
