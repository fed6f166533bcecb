//! Active loan listing, overdue classification and the return transition

use crate::clock::Clock;
use crate::error::Result;
use crate::service::LibraryService;
use crate::types::{ActiveLoan, ListOrder, Loan, LoanId, LoanStatus, MemberId};
use tracing::{debug, info};

pub struct LoanStatusEngine<S, C> {
    service: S,
    clock: C,
    order: ListOrder,
}

impl<S: LibraryService, C: Clock> LoanStatusEngine<S, C> {
    pub fn new(service: S, clock: C) -> Self {
        Self {
            service,
            clock,
            order: ListOrder::Store,
        }
    }

    pub fn with_order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Unreturned loans of `member`, each flagged overdue against today's date.
    ///
    /// The date is read from the clock on every call, so the same loan can flip
    /// from on time to overdue between calls.
    pub fn list_active_loans(&self, member: MemberId) -> Result<Vec<ActiveLoan>> {
        let today = self.clock.today();
        let mut active: Vec<ActiveLoan> = self
            .service
            .get_loans_by_member(member)?
            .into_iter()
            .filter(|loan| loan.status() == LoanStatus::Active)
            .map(|loan| ActiveLoan {
                is_overdue: loan.is_overdue_on(today),
                loan,
            })
            .collect();

        if self.order == ListOrder::DueDate {
            active.sort_by_key(|a| a.loan.return_date);
        }

        debug!(
            member_id = %member,
            active = active.len(),
            overdue = active.iter().filter(|a| a.is_overdue).count(),
            %today,
            "Listed active loans"
        );
        Ok(active)
    }

    /// Mark a loan returned. Returning an already-returned loan succeeds.
    pub fn return_loan(&mut self, loan: LoanId) -> Result<()> {
        self.service.return_book(loan)?;
        info!(loan_id = %loan, "Loan returned");
        Ok(())
    }

    /// Returned loans of `member`, in store order
    pub fn loan_history(&self, member: MemberId) -> Result<Vec<Loan>> {
        Ok(self
            .service
            .get_loans_by_member(member)?
            .into_iter()
            .filter(|loan| loan.status() == LoanStatus::Returned)
            .collect())
    }

    pub fn overdue_count(&self, member: MemberId) -> Result<usize> {
        Ok(self
            .list_active_loans(member)?
            .iter()
            .filter(|a| a.is_overdue)
            .count())
    }
}
