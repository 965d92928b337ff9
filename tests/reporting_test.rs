mod common;

use anyhow::Result;
use common::{date, register_user, test_service};

#[tokio::test]
async fn test_monthly_report_sums_by_kind() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    service
        .record_transaction(user_id, "income", "Salary", 200000, date("2024-12-09"))
        .await?;
    service
        .record_transaction(user_id, "expense", "Food", 15000, date("2024-12-10"))
        .await?;
    service
        .record_transaction(user_id, "expense", "Rent", 80000, date("2024-12-11"))
        .await?;

    let report = service.generate_report(user_id, 2024, Some(12)).await?;
    assert_eq!(report.total_income, 200000);
    assert_eq!(report.total_expenses, 95000);
    assert_eq!(report.total_savings, 105000);
    assert_eq!(report.year, 2024);
    assert_eq!(report.month, Some(12));

    Ok(())
}

#[tokio::test]
async fn test_yearly_report_spans_all_months() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    service
        .record_transaction(user_id, "income", "Salary", 200000, date("2024-01-31"))
        .await?;
    service
        .record_transaction(user_id, "income", "Salary", 200000, date("2024-06-30"))
        .await?;
    service
        .record_transaction(user_id, "expense", "Rent", 80000, date("2024-06-01"))
        .await?;
    // A different year must not leak in
    service
        .record_transaction(user_id, "income", "Salary", 500000, date("2023-12-31"))
        .await?;

    let report = service.generate_report(user_id, 2024, None).await?;
    assert_eq!(report.total_income, 400000);
    assert_eq!(report.total_expenses, 80000);
    assert_eq!(report.total_savings, 320000);
    assert_eq!(report.month, None);

    Ok(())
}

#[tokio::test]
async fn test_month_filter_excludes_other_months() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    service
        .record_transaction(user_id, "expense", "Food", 15000, date("2024-12-10"))
        .await?;

    let november = service.generate_report(user_id, 2024, Some(11)).await?;
    assert_eq!(november.total_income, 0);
    assert_eq!(november.total_expenses, 0);
    assert_eq!(november.total_savings, 0);

    Ok(())
}

#[tokio::test]
async fn test_single_digit_month_is_zero_padded() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    service
        .record_transaction(user_id, "expense", "Food", 12300, date("2024-03-05"))
        .await?;

    let march = service.generate_report(user_id, 2024, Some(3)).await?;
    assert_eq!(march.total_expenses, 12300);

    Ok(())
}

#[tokio::test]
async fn test_savings_can_be_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    service
        .record_transaction(user_id, "income", "Salary", 100000, date("2024-12-01"))
        .await?;
    service
        .record_transaction(user_id, "expense", "Rent", 150000, date("2024-12-02"))
        .await?;

    let report = service.generate_report(user_id, 2024, Some(12)).await?;
    assert_eq!(report.total_savings, -50000);

    Ok(())
}

#[tokio::test]
async fn test_repeated_sums_have_no_drift() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user_id = register_user(&service, "alice").await?;

    // Amounts chosen to break float accumulation: 0.10 a hundred times
    for day in 1..=28 {
        service
            .record_transaction(
                user_id,
                "expense",
                "Coffee",
                10,
                date(&format!("2024-12-{:02}", day)),
            )
            .await?;
    }

    let report = service.generate_report(user_id, 2024, Some(12)).await?;
    assert_eq!(report.total_expenses, 280);
    assert_eq!(report.total_savings, -280);

    Ok(())
}

#[tokio::test]
async fn test_report_is_per_user() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = register_user(&service, "alice").await?;
    let bob = register_user(&service, "bob").await?;

    service
        .record_transaction(alice, "income", "Salary", 200000, date("2024-12-09"))
        .await?;

    let report = service.generate_report(bob, 2024, Some(12)).await?;
    assert_eq!(report.total_income, 0);
    assert_eq!(report.total_expenses, 0);

    Ok(())
}
