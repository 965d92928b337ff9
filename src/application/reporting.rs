use serde::{Deserialize, Serialize};

use crate::domain::{Budget, Cents};

/// Income/expense totals for one calendar year or month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub year: i32,
    /// 1-12 when the report covers a single month, None for a whole year.
    pub month: Option<u32>,
    pub total_income: Cents,
    pub total_expenses: Cents,
    /// Income minus expenses; negative when more was spent than earned.
    pub total_savings: Cents,
}

/// Spending in a category measured against its budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// Sum of all expense transactions in the budget's category.
    pub spent: Cents,
    /// Negative when the category is over budget. That is a reportable
    /// state, not an error.
    pub remaining: Cents,
}
