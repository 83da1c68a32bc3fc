//! Error types for term-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid date component: {0}")]
    InvalidInput(String),

    #[error("No term data for academic year {0}")]
    UnknownYear(i32),

    #[error("Invalid term data: {0}")]
    InvalidTermData(String),

    #[error("Refresh error: {0}")]
    Refresh(String),

    #[error("Invalid local time: {0}")]
    InvalidLocalTime(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
