//! Common types and data structures

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single borrowing transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub i64);

/// Identifier of a library member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for LoanId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for LoanId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(LoanId)
    }
}

impl ToSql for MemberId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for MemberId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(MemberId)
    }
}

/// A record of one member borrowing one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub title: String,
    pub loan_date: NaiveDate,
    /// Date the item is due back
    pub return_date: NaiveDate,
    pub returned: bool,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        if self.returned {
            LoanStatus::Returned
        } else {
            LoanStatus::Active
        }
    }

    /// Overdue iff still out and the due date lies strictly before `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.returned && self.return_date < today
    }

}

/// Stored lifecycle state. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Active,
    Returned,
}

/// Derived classification of an active loan, recomputed on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    OnTime,
    Overdue,
}

/// An unreturned loan annotated with its overdue flag at query time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLoan {
    pub loan: Loan,
    pub is_overdue: bool,
}

impl ActiveLoan {
    pub fn standing(&self) -> Standing {
        if self.is_overdue {
            Standing::Overdue
        } else {
            Standing::OnTime
        }
    }
}

/// Ordering applied to active loan listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListOrder {
    /// Keep whatever order the store returned
    #[default]
    Store,
    /// Earliest due date first; ties keep store order
    DueDate,
}
