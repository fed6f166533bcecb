//! Application constants and configuration

pub const APP_NAME: &str = "LendBook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_FILE_NAME: &str = "lendbook.db";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const LOG_FILE_NAME: &str = "lendbook.log";

/// Display format for loan dates, e.g. "01 January 2024"
pub const DATE_FORMAT: &str = "%d %B %Y";

/// Due date offset applied when a loan is created without an explicit due date
pub const DEFAULT_LOAN_DAYS: i64 = 14;

/// Marker shown on cards whose due date has passed
pub const OVERDUE_MARKER: &str = "*overdue";
