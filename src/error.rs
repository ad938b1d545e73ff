//! Errors surfaced by the exam engine to its caller.

use thiserror::Error;

use crate::bank::QuestionId;

/// A configuration that may not be used to start an exam.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category percentages must add up to 100 (currently {total})")]
    PercentageTotal { total: u32 },
    #[error("question count must be at least 1")]
    QuestionCount,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExamError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("the question bank is empty")]
    EmptyBank,
    /// `start` was called while an exam is running or its results are shown.
    #[error("an exam can only be started from the configuration screen")]
    NotConfiguring,
    #[error("no exam is in progress")]
    NotInProgress,
    #[error("question {0} is not part of this exam")]
    UnknownQuestion(QuestionId),
    #[error("option {0} does not exist")]
    OptionOutOfRange(usize),
}
