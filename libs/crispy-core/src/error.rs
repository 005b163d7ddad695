//! Error types for crispy-core.

use thiserror::Error;

/// Result type alias using QuestError.
pub type Result<T> = std::result::Result<T, QuestError>;

/// Rejections produced by the quest progression tracker.
#[derive(Debug, Error, PartialEq)]
pub enum QuestError {
    #[error("QR token does not match any active page")]
    UnknownPage,

    #[error("page {slug} already answered")]
    AlreadyAnswered { slug: String },

    #[error("wrong QR code: expected step {expected_order}, scanned step {scanned_order}")]
    OutOfOrder {
        expected_order: i32,
        scanned_order: i32,
    },

    #[error("quest already completed")]
    QuestComplete,
}
