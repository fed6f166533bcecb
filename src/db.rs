//! Database module for LendBook
//! Handles SQLite storage for members and their loans

use crate::error::{LoanError, Result};
use crate::service::LibraryService;
use crate::types::{Loan, LoanId, MemberId};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

const LOAN_COLUMNS: &str = "id, member_id, title, loan_date, return_date, returned";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Private database that disappears with the connection
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS loans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member_id INTEGER NOT NULL REFERENCES members(id),
                title TEXT NOT NULL,
                loan_date TEXT NOT NULL,
                return_date TEXT NOT NULL,
                returned INTEGER NOT NULL DEFAULT 0,
                CHECK (loan_date <= return_date)
            );

            CREATE INDEX IF NOT EXISTS idx_loans_member ON loans(member_id);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Register a member and return the assigned id
    pub fn add_member(&self, name: &str) -> Result<MemberId> {
        self.conn
            .execute("INSERT INTO members (name) VALUES (?1)", params![name])?;
        let id = MemberId(self.conn.last_insert_rowid());
        debug!(member_id = %id, name, "Member added");
        Ok(id)
    }

    pub fn member_exists(&self, member: MemberId) -> Result<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM members WHERE id = ?1", params![member], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Record a new active loan for an existing member
    pub fn borrow_book(
        &self,
        member: MemberId,
        title: &str,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<LoanId> {
        if due_date < loan_date {
            return Err(LoanError::InvalidDates { loan_date, due_date });
        }
        if !self.member_exists(member)? {
            return Err(LoanError::MemberNotFound(member));
        }

        self.conn.execute(
            "INSERT INTO loans (member_id, title, loan_date, return_date, returned)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![member, title, loan_date, due_date],
        )?;
        let id = LoanId(self.conn.last_insert_rowid());
        debug!(loan_id = %id, member_id = %member, title, due = %due_date, "Loan created");
        Ok(id)
    }

    /// Look up a single loan
    pub fn get_loan(&self, loan: LoanId) -> Result<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE id = ?1");
        let found = self
            .conn
            .query_row(&sql, params![loan], loan_from_row)
            .optional()?;
        Ok(found)
    }

    /// Get database version
    pub fn get_db_version(&self) -> Result<Option<String>> {
        let version = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = 'version'", [], |r| r.get(0))
            .optional()?;
        Ok(version)
    }

    /// Set database version
    pub fn set_db_version(&self, version: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![version],
        )?;
        Ok(())
    }
}

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        loan_id: row.get(0)?,
        member_id: row.get(1)?,
        title: row.get(2)?,
        loan_date: row.get(3)?,
        return_date: row.get(4)?,
        returned: row.get::<_, i32>(5)? != 0,
    })
}

impl LibraryService for Database {
    fn get_loans_by_member(&self, member: MemberId) -> Result<Vec<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE member_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let loans = stmt
            .query_map(params![member], loan_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(loans)
    }

    fn return_book(&mut self, loan: LoanId) -> Result<()> {
        // SQLite counts matched rows, so an already-returned loan still reports 1
        let changed = self
            .conn
            .execute("UPDATE loans SET returned = 1 WHERE id = ?1", params![loan])?;
        if changed == 0 {
            return Err(LoanError::NotFound(loan));
        }
        debug!(loan_id = %loan, "Loan marked returned");
        Ok(())
    }
}
