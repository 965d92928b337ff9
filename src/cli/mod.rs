use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::{LedgerService, TransactionFilter};
use crate::domain::{format_cents, parse_cents, UserId};
use crate::io::Exporter;

/// Moneta - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "moneta")]
#[command(about = "A single-user personal finance tracker backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "moneta.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new user
    Register {
        /// Username (must be unique)
        username: String,

        /// Password
        password: String,
    },

    /// Verify credentials and print the user id
    Login {
        username: String,

        password: String,
    },

    /// Record an income or expense transaction
    Add {
        /// User id (as printed by login)
        #[arg(short, long)]
        user: UserId,

        /// Transaction kind: income or expense
        kind: String,

        /// Category (e.g. "Food", "Rent", "Salary")
        category: String,

        /// Amount (e.g. "150" or "150.00")
        amount: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List recorded transactions
    Transactions {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// Filter by kind: income or expense
        #[arg(long)]
        kind: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Income/expense/savings summary for a year or a single month
    Report {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// Calendar year (e.g. 2024)
        year: i32,

        /// Month 1-12 (omit for a whole-year report)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export data to CSV
    Export {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// What to export: transactions, budgets
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set (or replace) the budget for a category
    Set {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// Category to limit
        category: String,

        /// Budget limit (e.g. "500" or "500.00")
        amount: String,
    },

    /// Show spending against the budget for one category, or all of them
    Status {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// Category (omit for all budgets)
        category: Option<String>,
    },

    /// List budgets
    List {
        /// User id
        #[arg(short, long)]
        user: UserId,
    },

    /// Remove the budget for a category
    Remove {
        /// User id
        #[arg(short, long)]
        user: UserId,

        /// Category
        category: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Every invocation ensures the schema exists; migrations are
        // idempotent. One connection serves the whole invocation and is
        // released on every exit path.
        let service = LedgerService::init(&self.database).await?;

        if let Commands::Init = self.command {
            println!("Database initialized: {}", self.database);
            service.close().await;
            return Ok(());
        }

        let result = dispatch(&service, self.command).await;
        service.close().await;
        result
    }
}

async fn dispatch(service: &LedgerService, command: Commands) -> Result<()> {
    match command {
        Commands::Init => unreachable!("handled in run"),

        Commands::Register { username, password } => {
            let user = service.register(&username, &password).await?;
            println!("Registered {} (user id {})", user.username, user.id);
        }

        Commands::Login { username, password } => {
            let user_id = service.authenticate(&username, &password).await?;
            println!("Welcome {}! Your user id is {}.", username, user_id);
        }

        Commands::Add {
            user,
            kind,
            category,
            amount,
            date,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '150.00' or '150'")?;

            let date = match date {
                Some(date_str) => parse_date(&date_str)?,
                None => Utc::now().date_naive(),
            };

            let transaction = service
                .record_transaction(user, &kind, &category, amount_cents, date)
                .await?;

            println!(
                "Recorded {} of {} in {} on {} (id {})",
                transaction.kind,
                format_cents(transaction.amount_cents),
                transaction.category,
                transaction.date,
                transaction.id
            );
        }

        Commands::Transactions {
            user,
            kind,
            category,
            limit,
        } => {
            let filter = TransactionFilter {
                kind,
                category,
                limit,
            };
            let transactions = service.list_transactions(user, filter).await?;

            if transactions.is_empty() {
                println!("No transactions found.");
            }
            for transaction in transactions {
                println!(
                    "{:>6}  {}  {:<8} {:<16} {:>12}",
                    transaction.id,
                    transaction.date,
                    transaction.kind,
                    transaction.category,
                    format_cents(transaction.amount_cents)
                );
            }
        }

        Commands::Budget(budget_cmd) => run_budget_command(service, budget_cmd).await?,

        Commands::Report {
            user,
            year,
            month,
            json,
        } => {
            let report = service.generate_report(user, year, month).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match report.month {
                    Some(month) => println!("Report for {}-{:02}:", report.year, month),
                    None => println!("Report for {}:", report.year),
                }
                println!("  Total income:   {}", format_cents(report.total_income));
                println!("  Total expenses: {}", format_cents(report.total_expenses));
                println!("  Total savings:  {}", format_cents(report.total_savings));
            }
        }

        Commands::Export {
            user,
            export_type,
            output,
        } => {
            run_export_command(service, user, &export_type, output).await?;
        }
    }

    Ok(())
}

async fn run_budget_command(service: &LedgerService, command: BudgetCommands) -> Result<()> {
    match command {
        BudgetCommands::Set {
            user,
            category,
            amount,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '500.00' or '500'")?;
            let budget = service.set_budget(user, &category, amount_cents).await?;
            println!(
                "Budget for {} set to {}",
                budget.category,
                format_cents(budget.amount_cents)
            );
        }

        BudgetCommands::Status { user, category } => {
            let statuses = match category {
                Some(category) => vec![service.check_budget(user, &category).await?],
                None => service.budget_overview(user).await?,
            };

            if statuses.is_empty() {
                println!("No budgets set.");
            }
            for status in statuses {
                let marker = if status.remaining < 0 {
                    "  (over budget)"
                } else {
                    ""
                };
                println!(
                    "{:<16} budget {:>10}  spent {:>10}  remaining {:>10}{}",
                    status.budget.category,
                    format_cents(status.budget.amount_cents),
                    format_cents(status.spent),
                    format_cents(status.remaining),
                    marker
                );
            }
        }

        BudgetCommands::List { user } => {
            let budgets = service.list_budgets(user).await?;

            if budgets.is_empty() {
                println!("No budgets set.");
            }
            for budget in budgets {
                println!(
                    "{:<16} {:>10}",
                    budget.category,
                    format_cents(budget.amount_cents)
                );
            }
        }

        BudgetCommands::Remove { user, category } => {
            let budget = service.remove_budget(user, &category).await?;
            println!(
                "Removed budget for {} ({})",
                budget.category,
                format_cents(budget.amount_cents)
            );
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    user: UserId,
    export_type: &str,
    output: Option<String>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let count = match export_type {
        "transactions" => exporter.export_transactions_csv(user, &mut writer).await?,
        "budgets" => exporter.export_budgets_csv(user, &mut writer).await?,
        other => anyhow::bail!(
            "Unknown export type: {} (expected 'transactions' or 'budgets')",
            other
        ),
    };

    if let Some(path) = output {
        eprintln!("Exported {} record(s) to {}", count, path);
    }

    Ok(())
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", input))
}
