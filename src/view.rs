//! Presentation model of the Loans screen
//!
//! Holds what a renderer needs to draw one card per active loan: formatted
//! dates, the overdue marker and the id wired to the card's return action.
//! Returning a loan is followed by an explicit refresh so cards never go stale.

use crate::clock::Clock;
use crate::constants::{DATE_FORMAT, OVERDUE_MARKER};
use crate::engine::LoanStatusEngine;
use crate::error::{LoanError, Result};
use crate::service::LibraryService;
use crate::types::{ActiveLoan, LoanId, MemberId, Standing};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

/// True when chrono can render every specifier in `format`
pub fn is_valid_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Format a loan date for display, e.g. "01 January 2024".
/// Unusable patterns fall back to [`DATE_FORMAT`].
pub fn format_loan_date(date: NaiveDate, format: &str) -> String {
    if is_valid_date_format(format) {
        date.format(format).to_string()
    } else {
        warn!(format, "Invalid date format, using default");
        date.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanCard {
    pub loan_id: LoanId,
    pub title: String,
    pub borrowed: String,
    pub due: String,
    pub standing: Standing,
}

impl LoanCard {
    pub fn new(active: &ActiveLoan, date_format: &str) -> Self {
        Self {
            loan_id: active.loan.loan_id,
            title: active.loan.title.clone(),
            borrowed: format!(
                "Borrowed: {}",
                format_loan_date(active.loan.loan_date, date_format)
            ),
            due: format!("Due: {}", format_loan_date(active.loan.return_date, date_format)),
            standing: active.standing(),
        }
    }

    pub fn is_overdue(&self) -> bool {
        self.standing == Standing::Overdue
    }
}

impl fmt::Display for LoanCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[#{}] {}", self.loan_id, self.title)?;
        writeln!(f, "    {}", self.borrowed)?;
        write!(f, "    {}", self.due)?;
        if self.is_overdue() {
            write!(f, "  {OVERDUE_MARKER}")?;
        }
        Ok(())
    }
}

/// Loans screen for one member
pub struct LoansView<S, C> {
    engine: LoanStatusEngine<S, C>,
    member: MemberId,
    date_format: String,
    cards: Vec<LoanCard>,
}

impl<S: LibraryService, C: Clock> LoansView<S, C> {
    /// Build the view and load its cards
    pub fn new(engine: LoanStatusEngine<S, C>, member: MemberId) -> Result<Self> {
        let mut view = Self {
            engine,
            member,
            date_format: DATE_FORMAT.to_string(),
            cards: Vec::new(),
        };
        view.refresh()?;
        Ok(view)
    }

    /// Switch the date pattern and re-render the cards with it.
    /// A pattern chrono cannot render is rejected and the current one kept.
    pub fn set_date_format(&mut self, format: &str) -> Result<()> {
        if !is_valid_date_format(format) {
            return Err(LoanError::InvalidDateFormat(format.to_string()));
        }
        format.clone_into(&mut self.date_format);
        self.refresh()
    }

    pub fn cards(&self) -> &[LoanCard] {
        &self.cards
    }

    /// Re-query active loans and rebuild every card
    pub fn refresh(&mut self) -> Result<()> {
        self.cards = self
            .engine
            .list_active_loans(self.member)?
            .iter()
            .map(|active| LoanCard::new(active, &self.date_format))
            .collect();
        debug!(member_id = %self.member, cards = self.cards.len(), "Loans view refreshed");
        Ok(())
    }

    /// Handler behind a card's Return button
    pub fn return_loan(&mut self, loan: LoanId) -> Result<()> {
        self.engine.return_loan(loan)?;
        self.refresh()
    }
}

impl<S, C> fmt::Display for LoansView<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cards.is_empty() {
            return write!(f, "No active loans");
        }
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{card}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::service::InMemoryLibrary;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const M: MemberId = MemberId(1);

    #[test]
    fn test_format_loan_date_uses_full_month_name() {
        assert_eq!(format_loan_date(date(2024, 1, 1), DATE_FORMAT), "01 January 2024");
        assert_eq!(format_loan_date(date(2023, 12, 25), DATE_FORMAT), "25 December 2023");
    }

    #[test]
    fn test_cards_show_dates_and_overdue_marker() {
        let mut lib = InMemoryLibrary::new();
        lib.borrow_book(M, "Persuasion", date(2023, 12, 1), date(2024, 1, 1)).unwrap();
        lib.borrow_book(M, "Walden", date(2024, 5, 20), date(2024, 6, 3)).unwrap();

        let engine = LoanStatusEngine::new(lib, FixedClock::new(date(2024, 6, 1)));
        let view = LoansView::new(engine, M).unwrap();
        let cards = view.cards();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Persuasion");
        assert_eq!(cards[0].borrowed, "Borrowed: 01 December 2023");
        assert_eq!(cards[0].due, "Due: 01 January 2024");
        assert!(cards[0].is_overdue());
        assert_eq!(cards[1].standing, Standing::OnTime);

        let text = view.to_string();
        assert!(text.contains("Persuasion"));
        assert_eq!(text.matches(OVERDUE_MARKER).count(), 1);
    }

    #[test]
    fn test_return_refreshes_cards() {
        let mut lib = InMemoryLibrary::new();
        let first = lib.borrow_book(M, "Persuasion", date(2024, 1, 1), date(2024, 1, 9)).unwrap();
        lib.borrow_book(M, "Walden", date(2024, 1, 1), date(2024, 1, 9)).unwrap();

        let engine = LoanStatusEngine::new(lib, FixedClock::new(date(2024, 1, 2)));
        let mut view = LoansView::new(engine, M).unwrap();
        assert_eq!(view.cards().len(), 2);

        view.return_loan(first).unwrap();
        assert_eq!(view.cards().len(), 1);
        assert_eq!(view.cards()[0].title, "Walden");
    }

    #[test]
    fn test_failed_return_keeps_cards() {
        let mut lib = InMemoryLibrary::new();
        lib.borrow_book(M, "Walden", date(2024, 1, 1), date(2024, 1, 9)).unwrap();
        let engine = LoanStatusEngine::new(lib, FixedClock::new(date(2024, 1, 2)));
        let mut view = LoansView::new(engine, M).unwrap();

        let err = view.return_loan(LoanId(999)).unwrap_err();
        assert!(matches!(err, LoanError::NotFound(_)));
        assert_eq!(view.cards().len(), 1);
    }

    #[test]
    fn test_custom_date_format() {
        let mut lib = InMemoryLibrary::new();
        lib.borrow_book(M, "Walden", date(2024, 1, 1), date(2024, 1, 9)).unwrap();
        let engine = LoanStatusEngine::new(lib, FixedClock::new(date(2024, 1, 2)));
        let mut view = LoansView::new(engine, M).unwrap();

        view.set_date_format("%Y-%m-%d").unwrap();
        assert_eq!(view.cards()[0].borrowed, "Borrowed: 2024-01-01");
        assert_eq!(view.cards()[0].due, "Due: 2024-01-09");
    }

    #[test]
    fn test_unrenderable_date_format_is_rejected() {
        let mut lib = InMemoryLibrary::new();
        lib.borrow_book(M, "Walden", date(2024, 1, 1), date(2024, 1, 9)).unwrap();
        let engine = LoanStatusEngine::new(lib, FixedClock::new(date(2024, 1, 2)));
        let mut view = LoansView::new(engine, M).unwrap();

        let err = view.set_date_format("%Q").unwrap_err();
        assert!(matches!(err, LoanError::InvalidDateFormat(ref f) if f == "%Q"));
        assert_eq!(view.cards()[0].due, "Due: 09 January 2024");
        assert_eq!(view.to_string().matches("Walden").count(), 1);
    }

    #[test]
    fn test_format_loan_date_falls_back_on_bad_pattern() {
        assert!(!is_valid_date_format("%Q"));
        assert!(is_valid_date_format(DATE_FORMAT));
        assert_eq!(format_loan_date(date(2024, 1, 1), "%Q"), "01 January 2024");
    }

    #[test]
    fn test_empty_view_text() {
        let engine =
            LoanStatusEngine::new(InMemoryLibrary::new(), FixedClock::new(date(2024, 1, 2)));
        let view = LoansView::new(engine, M).unwrap();
        assert!(view.cards().is_empty());
        assert_eq!(view.to_string(), "No active loans");
    }
}
