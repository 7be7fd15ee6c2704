//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Invalid position: {0}")]
    InvalidPosition(usize),

    #[error("Invalid range: {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("Malformed fragment: {0}")]
    MalformedFragment(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
