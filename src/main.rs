//! LendBook - command-line entry point for the Loans screen

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use lendbook::constants::{APP_VERSION, DEFAULT_LOAN_DAYS, LOG_FILE_NAME};
use lendbook::settings::{get_data_dir, Settings};
use lendbook::{
    Clock, Database, LoanError, LoanId, LoanStatusEngine, LoansView, MemberId, SystemClock,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "lendbook")]
#[command(about = "Track library loans, overdue items and returns.")]
struct CommandLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new member
    AddMember { name: String },
    /// Lend a book to a member
    #[command(alias = "b")]
    Borrow {
        member: i64,
        title: String,
        /// Due date (YYYY-MM-DD), defaults to the standard loan period
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Show a member's active loans
    #[command(alias = "l")]
    Loans { member: i64 },
    /// Return a loan and show the member's remaining loans
    #[command(alias = "r")]
    Return { loan: i64 },
    /// Show a member's returned loans
    History { member: i64 },
}

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lendbook=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse();

    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    // Guard must live for the whole run
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "LendBook starting");

    let settings = Settings::load(&data_dir);
    if !Settings::exists(&data_dir) {
        settings.save(&data_dir);
        info!(path = %data_dir.display(), "Wrote default settings");
    }
    let db_path = settings.database_path_or_default(&data_dir);
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    if db.get_db_version()?.is_none() {
        db.set_db_version(APP_VERSION)?;
    }

    let engine = LoanStatusEngine::new(db, SystemClock).with_order(settings.list_order());

    let result = run(commands.command, engine, &settings);
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}

fn run(
    command: Commands,
    engine: LoanStatusEngine<Database, SystemClock>,
    settings: &Settings,
) -> anyhow::Result<()> {
    match command {
        Commands::AddMember { name } => {
            let id = engine.service().add_member(&name)?;
            println!("Registered member #{id}: {name}");
        }
        Commands::Borrow { member, title, due } => {
            let today = engine.clock().today();
            let due = due.unwrap_or(today + Duration::days(DEFAULT_LOAN_DAYS));
            let id = engine
                .service()
                .borrow_book(MemberId(member), &title, today, due)?;
            println!("Loan #{id}: \"{title}\" due {due}");
        }
        Commands::Loans { member } => {
            let view = open_view(engine, MemberId(member), settings)?;
            println!("{view}");
        }
        Commands::Return { loan } => {
            let loan = LoanId(loan);
            let member = engine
                .service()
                .get_loan(loan)?
                .ok_or(LoanError::NotFound(loan))?
                .member_id;
            let mut view = open_view(engine, member, settings)?;
            view.return_loan(loan)?;
            println!("Returned loan #{loan}\n");
            println!("{view}");
        }
        Commands::History { member } => {
            let history = engine.loan_history(MemberId(member))?;
            if history.is_empty() {
                println!("No returned loans");
            }
            for loan in history {
                println!(
                    "[#{}] {} (borrowed {}, due {})",
                    loan.loan_id,
                    loan.title,
                    lendbook::view::format_loan_date(loan.loan_date, &settings.date_format),
                    lendbook::view::format_loan_date(loan.return_date, &settings.date_format),
                );
            }
        }
    }
    Ok(())
}

fn open_view(
    engine: LoanStatusEngine<Database, SystemClock>,
    member: MemberId,
    settings: &Settings,
) -> lendbook::Result<LoansView<Database, SystemClock>> {
    let mut view = LoansView::new(engine, member)?;
    view.set_date_format(&settings.date_format)?;
    Ok(view)
}
