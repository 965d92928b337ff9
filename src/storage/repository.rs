use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::{Budget, Cents, Transaction, TransactionKind, User, UserId};

use super::{MIGRATION_001_USERS, MIGRATION_002_TRANSACTIONS, MIGRATION_003_BUDGETS};

/// Transaction dates are stored as ISO-8601 calendar dates (TEXT).
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for persisting and querying users, transactions and budgets.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Creates the database file if the URL asks for it (`?mode=rwc`).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Idempotent, safe to call repeatedly.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_USERS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_TRANSACTIONS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        sqlx::query(MIGRATION_003_BUDGETS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 003")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the underlying connection pool. Idempotent; any call after this
    /// returns a storage error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // User operations
    // ========================

    /// Insert a new user row and return its generated id.
    ///
    /// A UNIQUE violation on username stays downcastable in the error chain
    /// so the caller can tell it apart from other storage failures.
    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserId> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(row.get("id"))
    }

    /// Find the user matching both username and password digest.
    pub async fn find_user_by_credentials(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ? AND password_hash = ?
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by credentials")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    // ========================
    // Transaction operations
    // ========================

    /// Insert one transaction row and return the stored record.
    pub async fn insert_transaction(
        &self,
        user_id: UserId,
        kind: TransactionKind,
        category: &str,
        amount_cents: Cents,
        date: NaiveDate,
    ) -> Result<Transaction> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (user_id, kind, category, amount_cents, date)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(category)
        .bind(amount_cents)
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert transaction")?;

        Ok(Transaction {
            id: row.get("id"),
            user_id,
            kind,
            category: category.to_string(),
            amount_cents,
            date,
        })
    }

    /// List a user's transactions with optional filters, newest first.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        kind: Option<TransactionKind>,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        // Build query dynamically based on filters
        let mut query = String::from(
            "SELECT id, user_id, kind, category, amount_cents, date FROM transactions WHERE user_id = ?",
        );

        if kind.is_some() {
            query.push_str(" AND kind = ?");
        }
        if category.is_some() {
            query.push_str(" AND category = ?");
        }

        query.push_str(" ORDER BY date DESC, id DESC");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let mut sql_query = sqlx::query(&query).bind(user_id);

        if let Some(kind) = kind {
            sql_query = sql_query.bind(kind.as_str());
        }
        if let Some(cat) = category {
            sql_query = sql_query.bind(cat);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Sum expense transactions for a (user, category) pair.
    /// No matching rows sums to zero.
    pub async fn sum_expenses_for_category(
        &self,
        user_id: UserId,
        category: &str,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) AS total
            FROM transactions
            WHERE user_id = ? AND category = ? AND kind = 'expense'
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses for category")?;

        Ok(row.get("total"))
    }

    /// Total income and expenses for a calendar year, optionally narrowed to
    /// one month. Matching is done against the stored ISO date text, so the
    /// month is zero-padded to two digits.
    pub async fn sum_by_kind_for_period(
        &self,
        user_id: UserId,
        year: i32,
        month: Option<u32>,
    ) -> Result<(Cents, Cents)> {
        let mut query = String::from(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE 0 END), 0) AS income,
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_cents ELSE 0 END), 0) AS expenses
            FROM transactions
            WHERE user_id = ? AND strftime('%Y', date) = ?
            "#,
        );

        if month.is_some() {
            query.push_str(" AND strftime('%m', date) = ?");
        }

        let mut sql_query = sqlx::query(&query)
            .bind(user_id)
            .bind(format!("{:04}", year));

        if let Some(month) = month {
            sql_query = sql_query.bind(format!("{:02}", month));
        }

        let row = sql_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to sum transactions for period")?;

        Ok((row.get("income"), row.get("expenses")))
    }

    // ========================
    // Budget operations
    // ========================

    /// Set the budget for a (user, category) pair in a single atomic upsert.
    /// An existing row has its amount replaced.
    pub async fn upsert_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO budgets (user_id, category, amount_cents)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, category) DO UPDATE SET amount_cents = excluded.amount_cents
            "#,
        )
        .bind(budget.user_id)
        .bind(&budget.category)
        .bind(budget.amount_cents)
        .execute(&self.pool)
        .await
        .context("Failed to upsert budget")?;

        Ok(())
    }

    /// Get the budget for a (user, category) pair.
    pub async fn get_budget(&self, user_id: UserId, category: &str) -> Result<Option<Budget>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, category, amount_cents
            FROM budgets
            WHERE user_id = ? AND category = ?
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch budget")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    /// List a user's budgets ordered by category.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, category, amount_cents
            FROM budgets
            WHERE user_id = ?
            ORDER BY category
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list budgets")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    /// Delete the budget for a (user, category) pair.
    pub async fn delete_budget(&self, user_id: UserId, category: &str) -> Result<()> {
        sqlx::query("DELETE FROM budgets WHERE user_id = ? AND category = ?")
            .bind(user_id)
            .bind(category)
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;

        Ok(())
    }

    // ========================
    // Row conversions
    // ========================

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");

        Ok(Transaction {
            id: row.get("id"),
            user_id: row.get("user_id"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid transaction date")?,
        })
    }

    fn row_to_budget(row: &sqlx::sqlite::SqliteRow) -> Result<Budget> {
        Ok(Budget {
            user_id: row.get("user_id"),
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
        })
    }
}
