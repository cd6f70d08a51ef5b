//! Error types for question bank and paper generation
//!
//! Nothing here is fatal: every failure is reported back to the caller,
//! who fixes the bank or the request and tries again.

use crate::types::Marks;
use thiserror::Error;

/// Bad input from the caller; generation or ingestion is aborted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please specify at least one question to generate a paper")]
    EmptyRequest,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid marks: {0} (allowed: 2, 4, 8, 13, 14, 15, 16)")]
    InvalidMarks(u32),
    #[error("invalid cognitive level: {0} (expected L1-L6)")]
    InvalidLevel(String),
    #[error("question text is empty")]
    EmptyQuestionText,
    #[error("unknown course outcome: {0}")]
    UnknownCourseOutcome(String),
    #[error("course outcome already exists: {0}")]
    DuplicateCourseOutcome(String),
    #[error("no question with id {0}")]
    UnknownQuestion(u64),
    #[error("request asks for {marks}-mark questions{} more than once", outcome_suffix(.outcome))]
    DuplicateCell { outcome: Option<String>, marks: Marks },
    #[error("balanced and per-outcome cells both ask for {0}-mark questions")]
    MixedCell(Marks),
}

/// First request cell the bank cannot satisfy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "not enough {marks}-mark questions{}: available {available}, required {requested}",
    outcome_suffix(.outcome)
)]
pub struct Shortage {
    /// `None` for a balanced cell spanning every course outcome
    pub outcome: Option<String>,
    pub marks: Marks,
    pub available: usize,
    pub requested: usize,
}

fn outcome_suffix(outcome: &Option<String>) -> String {
    match outcome {
        Some(o) => format!(" for {o}"),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaperError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Shortage(#[from] Shortage),
}
