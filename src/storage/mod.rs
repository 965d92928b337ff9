mod repository;

pub use repository::*;

/// SQL migration for the users table
pub const MIGRATION_001_USERS: &str = include_str!("migrations/001_users.sql");

/// SQL migration for the transactions table
pub const MIGRATION_002_TRANSACTIONS: &str = include_str!("migrations/002_transactions.sql");

/// SQL migration for the budgets table
pub const MIGRATION_003_BUDGETS: &str = include_str!("migrations/003_budgets.sql");
