use chrono::{NaiveDate, Utc};
use log::{debug, info};

use crate::domain::{
    format_cents, hash_password, Budget, Cents, Transaction, TransactionKind, User, UserId,
};
use crate::storage::Repository;

use super::{AppError, BudgetStatus, PeriodReport};

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, script, test harness);
/// it returns structured values and never prints.
pub struct LedgerService {
    repo: Repository,
}

/// Filter for querying transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one kind ("income" or "expense")
    pub kind: Option<String>,
    /// Restrict to one category
    pub category: Option<String>,
    /// Maximum number of entries
    pub limit: Option<usize>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release the underlying database handle.
    pub async fn close(self) {
        self.repo.close().await;
    }

    // ========================
    // User operations
    // ========================

    /// Register a new user. The password is stored only as a one-way digest.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        let password_hash = hash_password(password);
        let created_at = Utc::now();

        match self
            .repo
            .insert_user(username, &password_hash, created_at)
            .await
        {
            Ok(id) => {
                info!("registered user '{}' with id {}", username, id);
                Ok(User {
                    id,
                    username: username.to_string(),
                    password_hash,
                    created_at,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::DuplicateUsername(username.to_string()))
            }
            Err(err) => Err(AppError::Storage(err)),
        }
    }

    /// Verify credentials and return the matching user id.
    ///
    /// An unknown username and a wrong password report the same error, so
    /// the response does not reveal which of the two failed.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserId, AppError> {
        let password_hash = hash_password(password);

        match self
            .repo
            .find_user_by_credentials(username, &password_hash)
            .await?
        {
            Some(user) => {
                debug!("authenticated user id {}", user.id);
                Ok(user.id)
            }
            None => Err(AppError::InvalidCredentials),
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record one income or expense entry.
    pub async fn record_transaction(
        &self,
        user_id: UserId,
        kind: &str,
        category: &str,
        amount_cents: Cents,
        date: NaiveDate,
    ) -> Result<Transaction, AppError> {
        let kind =
            TransactionKind::from_str(kind).ok_or_else(|| AppError::InvalidKind(kind.to_string()))?;

        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(format!(
                "transaction amount must not be negative, got {}",
                format_cents(amount_cents)
            )));
        }

        let transaction = self
            .repo
            .insert_transaction(user_id, kind, category, amount_cents, date)
            .await?;

        debug!(
            "recorded {} of {} cents in '{}' for user {}",
            kind, amount_cents, category, user_id
        );
        Ok(transaction)
    }

    /// List a user's transactions, optionally filtered.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let kind = filter
            .kind
            .as_deref()
            .map(|s| {
                TransactionKind::from_str(s).ok_or_else(|| AppError::InvalidKind(s.to_string()))
            })
            .transpose()?;

        Ok(self
            .repo
            .list_transactions(user_id, kind, filter.category.as_deref(), filter.limit)
            .await?)
    }

    // ========================
    // Budget operations
    // ========================

    /// Set or replace the budget for a category. The write is a single
    /// atomic upsert, never a read-then-write.
    pub async fn set_budget(
        &self,
        user_id: UserId,
        category: &str,
        amount_cents: Cents,
    ) -> Result<Budget, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(format!(
                "budget limit must not be negative, got {}",
                format_cents(amount_cents)
            )));
        }

        let budget = Budget {
            user_id,
            category: category.to_string(),
            amount_cents,
        };
        self.repo.upsert_budget(&budget).await?;

        debug!(
            "set budget of {} cents for '{}' (user {})",
            amount_cents, category, user_id
        );
        Ok(budget)
    }

    /// Compare spending in a category against its budget.
    pub async fn check_budget(
        &self,
        user_id: UserId,
        category: &str,
    ) -> Result<BudgetStatus, AppError> {
        let budget = self
            .repo
            .get_budget(user_id, category)
            .await?
            .ok_or_else(|| AppError::NoBudgetSet(category.to_string()))?;

        let spent = self
            .repo
            .sum_expenses_for_category(user_id, category)
            .await?;
        let remaining = budget.amount_cents - spent;

        Ok(BudgetStatus {
            budget,
            spent,
            remaining,
        })
    }

    /// Status for every budget the user has set.
    pub async fn budget_overview(&self, user_id: UserId) -> Result<Vec<BudgetStatus>, AppError> {
        let budgets = self.repo.list_budgets(user_id).await?;
        let mut statuses = Vec::new();

        for budget in budgets {
            let spent = self
                .repo
                .sum_expenses_for_category(user_id, &budget.category)
                .await?;
            let remaining = budget.amount_cents - spent;

            statuses.push(BudgetStatus {
                budget,
                spent,
                remaining,
            });
        }

        Ok(statuses)
    }

    /// List a user's budgets.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>, AppError> {
        Ok(self.repo.list_budgets(user_id).await?)
    }

    /// Remove the budget for a category, returning the removed row.
    pub async fn remove_budget(
        &self,
        user_id: UserId,
        category: &str,
    ) -> Result<Budget, AppError> {
        let budget = self
            .repo
            .get_budget(user_id, category)
            .await?
            .ok_or_else(|| AppError::NoBudgetSet(category.to_string()))?;

        self.repo.delete_budget(user_id, category).await?;
        Ok(budget)
    }

    // ========================
    // Reporting
    // ========================

    /// Total income, expenses and savings for a calendar year, optionally
    /// narrowed to one month (1-12).
    pub async fn generate_report(
        &self,
        user_id: UserId,
        year: i32,
        month: Option<u32>,
    ) -> Result<PeriodReport, AppError> {
        let (total_income, total_expenses) = self
            .repo
            .sum_by_kind_for_period(user_id, year, month)
            .await?;

        Ok(PeriodReport {
            year,
            month,
            total_income,
            total_expenses,
            total_savings: total_income - total_expenses,
        })
    }
}

/// True when the error chain bottoms out in a UNIQUE constraint violation.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db)) if db.is_unique_violation()
    )
}
