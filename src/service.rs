//! Loan store contract and an in-memory implementation

use crate::error::{LoanError, Result};
use crate::types::{Loan, LoanId, MemberId};
use chrono::NaiveDate;
use tracing::debug;

/// What the engine needs from the backing loan store
pub trait LibraryService {
    /// All loans of `member`, returned and active, in store order
    fn get_loans_by_member(&self, member: MemberId) -> Result<Vec<Loan>>;

    /// Persist the Active -> Returned transition. Unknown ids fail with `NotFound`.
    fn return_book(&mut self, loan: LoanId) -> Result<()>;
}

/// Insertion-ordered store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    loans: Vec<Loan>,
    next_id: i64,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loan and return its new id
    pub fn borrow_book(
        &mut self,
        member: MemberId,
        title: &str,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<LoanId> {
        if due_date < loan_date {
            return Err(LoanError::InvalidDates { loan_date, due_date });
        }
        self.next_id += 1;
        let loan_id = LoanId(self.next_id);
        self.loans.push(Loan {
            loan_id,
            member_id: member,
            title: title.to_string(),
            loan_date,
            return_date: due_date,
            returned: false,
        });
        debug!(loan_id = %loan_id, member_id = %member, title, "Loan created");
        Ok(loan_id)
    }

    /// Insert a fully formed record, e.g. one restored from elsewhere
    pub fn insert(&mut self, loan: Loan) -> Result<()> {
        if loan.return_date < loan.loan_date {
            return Err(LoanError::InvalidDates {
                loan_date: loan.loan_date,
                due_date: loan.return_date,
            });
        }
        if self.get_loan(loan.loan_id).is_some() {
            return Err(LoanError::DuplicateLoan(loan.loan_id));
        }
        self.next_id = self.next_id.max(loan.loan_id.0);
        self.loans.push(loan);
        Ok(())
    }

    pub fn get_loan(&self, loan: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.loan_id == loan)
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

impl LibraryService for InMemoryLibrary {
    fn get_loans_by_member(&self, member: MemberId) -> Result<Vec<Loan>> {
        Ok(self
            .loans
            .iter()
            .filter(|l| l.member_id == member)
            .cloned()
            .collect())
    }

    fn return_book(&mut self, loan: LoanId) -> Result<()> {
        let record = self
            .loans
            .iter_mut()
            .find(|l| l.loan_id == loan)
            .ok_or(LoanError::NotFound(loan))?;
        record.returned = true;
        Ok(())
    }
}
