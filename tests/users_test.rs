mod common;

use anyhow::Result;
use common::test_service;
use moneta::application::AppError;

#[tokio::test]
async fn test_register_and_authenticate() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service.register("alice", "pw1").await?;
    assert_eq!(user.username, "alice");

    let user_id = service.authenticate("alice", "pw1").await?;
    assert_eq!(user_id, user.id);

    Ok(())
}

#[tokio::test]
async fn test_password_is_not_stored_in_plaintext() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service.register("alice", "securepassword123").await?;

    assert_ne!(user.password_hash, "securepassword123");
    assert_eq!(user.password_hash.len(), 64);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register("alice", "pw1").await?;

    let err = service.register("alice", "pw2").await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateUsername(ref name) if name == "alice"));

    // The credential stored by the first registration is unchanged
    assert!(service.authenticate("alice", "pw1").await.is_ok());
    assert!(matches!(
        service.authenticate("alice", "pw2").await.unwrap_err(),
        AppError::InvalidCredentials
    ));

    Ok(())
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register("alice", "pw1").await?;
    service.register("Alice", "pw2").await?;

    let lower = service.authenticate("alice", "pw1").await?;
    let upper = service.authenticate("Alice", "pw2").await?;
    assert_ne!(lower, upper);

    Ok(())
}

#[tokio::test]
async fn test_wrong_password_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register("alice", "pw1").await?;

    let err = service.authenticate("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    Ok(())
}

#[tokio::test]
async fn test_unknown_username_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.authenticate("nobody", "pw1").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    Ok(())
}

#[tokio::test]
async fn test_credential_errors_are_indistinguishable() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register("alice", "pw1").await?;

    // Neither the variant nor the message may reveal which field failed
    let wrong_password = service.authenticate("alice", "wrong").await.unwrap_err();
    let unknown_user = service.authenticate("nobody", "pw1").await.unwrap_err();
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());

    Ok(())
}
