//! Integration tests for the user store: input validation at the
//! repository boundary, authentication, and password changes.

use posada_core::{UserRole, ValidationError};
use posada_db::{Database, DbConfig, DbError};

async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

#[tokio::test]
async fn test_create_rejects_bad_username() {
    let db = setup().await;

    let err = db
        .users()
        .create("ab", "secret1", "Too Short", UserRole::Receptionist)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidInput(ValidationError::TooShort { .. })
    ));

    let err = db
        .users()
        .create("Has Space", "secret1", "Bad Format", UserRole::Receptionist)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidInput(ValidationError::InvalidFormat { .. })
    ));

    // Nothing was persisted
    assert_eq!(db.users().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_short_password() {
    let db = setup().await;

    let err = db
        .users()
        .create("maria", "12345", "Maria Lopez", UserRole::Receptionist)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidInput(ValidationError::TooShort { .. })
    ));
    assert_eq!(db.users().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_duplicate_username() {
    let db = setup().await;
    db.users()
        .create("maria", "secret1", "Maria Lopez", UserRole::Receptionist)
        .await
        .unwrap();

    let err = db
        .users()
        .create("maria", "secret2", "Other Maria", UserRole::Receptionist)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation { .. }));
}

#[tokio::test]
async fn test_authenticate_flows() {
    let db = setup().await;
    db.users()
        .create("admin", "admin123", "Administrator", UserRole::Admin)
        .await
        .unwrap();

    let user = db
        .users()
        .authenticate("admin", "admin123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.username, "admin");
    assert!(user.last_access_at.is_none()); // stamped after this login

    // Wrong password and unknown user both fail the same way
    assert!(db.users().authenticate("admin", "nope99").await.unwrap().is_none());
    assert!(db.users().authenticate("ghost", "admin123").await.unwrap().is_none());

    // Deactivated accounts cannot log in
    db.users().set_active(&user.id, false).await.unwrap();
    assert!(db.users().authenticate("admin", "admin123").await.unwrap().is_none());
}

#[tokio::test]
async fn test_change_password_validates_and_applies() {
    let db = setup().await;
    let user = db
        .users()
        .create("admin", "admin123", "Administrator", UserRole::Admin)
        .await
        .unwrap();

    let err = db.users().change_password(&user.id, "short").await.unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidInput(ValidationError::TooShort { .. })
    ));
    // Old password still works after the rejected change
    assert!(db.users().authenticate("admin", "admin123").await.unwrap().is_some());

    db.users().change_password(&user.id, "newpass9").await.unwrap();
    assert!(db.users().authenticate("admin", "admin123").await.unwrap().is_none());
    assert!(db.users().authenticate("admin", "newpass9").await.unwrap().is_some());
}
