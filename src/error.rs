//! Error type shared by the store, the engine and the view

use crate::types::{LoanId, MemberId};
use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum LoanError {
    #[error("loan {0} not found")]
    NotFound(LoanId),

    #[error("loan {0} already exists")]
    DuplicateLoan(LoanId),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("due date {due_date} is before loan date {loan_date}")]
    InvalidDates {
        loan_date: NaiveDate,
        due_date: NaiveDate,
    },

    #[error("unusable date format {0:?}")]
    InvalidDateFormat(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
