//! LendBook loans: active loan listing, overdue status and returns.
//!
//! The engine works against any [`LibraryService`] and any [`Clock`], so the
//! SQLite store and the system date can be swapped for doubles.

pub mod clock;
pub mod constants;
pub mod db;
pub mod engine;
pub mod error;
pub mod service;
pub mod settings;
pub mod types;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Database;
pub use engine::LoanStatusEngine;
pub use error::{LoanError, Result};
pub use service::{InMemoryLibrary, LibraryService};
pub use types::{ActiveLoan, ListOrder, Loan, LoanId, LoanStatus, MemberId, Standing};
pub use view::{LoanCard, LoansView};
