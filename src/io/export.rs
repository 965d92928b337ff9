use anyhow::Result;
use std::io::Write;

use crate::application::{LedgerService, TransactionFilter};
use crate::domain::UserId;

/// Exporter for writing a user's ledger data as CSV.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export a user's transactions to CSV. Returns the number of rows written.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        user_id: UserId,
        writer: W,
    ) -> Result<usize> {
        let transactions = self
            .service
            .list_transactions(user_id, TransactionFilter::default())
            .await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "kind", "category", "amount_cents", "date"])?;

        let mut count = 0;
        for transaction in &transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.kind.as_str().to_string(),
                transaction.category.clone(),
                transaction.amount_cents.to_string(),
                transaction.date.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export a user's budgets to CSV. Returns the number of rows written.
    pub async fn export_budgets_csv<W: Write>(&self, user_id: UserId, writer: W) -> Result<usize> {
        let budgets = self.service.list_budgets(user_id).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["category", "amount_cents"])?;

        let mut count = 0;
        for budget in &budgets {
            csv_writer.write_record([budget.category.clone(), budget.amount_cents.to_string()])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
