use thiserror::Error;

/// Errors surfaced by the ledger operations. All of them are recoverable at
/// the call boundary: the caller decides whether to retry input, abort, or
/// show a message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Deliberately silent about which of username or password failed.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid transaction kind: {0} (expected 'income' or 'expense')")]
    InvalidKind(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No budget set for category: {0}")]
    NoBudgetSet(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
