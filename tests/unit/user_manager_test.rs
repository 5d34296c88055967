//! Unit tests for the UserManager public API.
//!
//! Signup and authentication against an in-memory SQLite database. A low
//! PBKDF2 iteration count keeps the tests fast.

use orbitmarks::database::Database;
use orbitmarks::managers::user_manager::{UserManager, UserManagerTrait};
use orbitmarks::services::crypto_service::CryptoService;
use orbitmarks::types::errors::UserError;
use orbitmarks::types::user::{NewAccount, SignupRequest};
use rstest::rstest;

fn setup() -> (Database, CryptoService) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    (db, CryptoService::with_iterations(1_000))
}

fn request(email: &str, password: &str, name: &str) -> SignupRequest {
    SignupRequest {
        email: email.to_string(),
        password: password.to_string(),
        display_name: name.to_string(),
    }
}

#[test]
fn test_signup_stores_normalized_user() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);

    let user = mgr
        .signup(&request("  Ada@Example.COM ", "correct horse", " Ada "))
        .unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.display_name, "Ada");
    assert_ne!(user.password_hash, "correct horse");
    assert!(user.password_hash.starts_with("pbkdf2-sha256$"));

    let fetched = mgr.get_user(&user.id).unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, user.email);
    assert_eq!(fetched.password_hash, user.password_hash);
}

#[test]
fn test_profile_omits_password_hash() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);
    let user = mgr.signup(&request("a@b.io", "password1", "A")).unwrap();

    let json = serde_json::to_string(&user.profile()).unwrap();
    assert!(!json.contains("password"));
    assert!(json.contains("a@b.io"));
}

#[test]
fn test_duplicate_email_is_case_insensitive() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);
    mgr.signup(&request("ada@example.com", "password1", "Ada"))
        .unwrap();

    let result = mgr.signup(&request("ADA@example.com", "password2", "Other"));
    assert!(matches!(result, Err(UserError::EmailTaken(ref e)) if e == "ada@example.com"));
}

#[test]
fn test_authenticate_accepts_correct_password() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);
    let user = mgr
        .signup(&request("ada@example.com", "password1", "Ada"))
        .unwrap();

    let authed = mgr.authenticate("Ada@Example.com", "password1").unwrap();
    assert_eq!(authed.id, user.id);
}

#[test]
fn test_wrong_password_and_unknown_email_look_the_same() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);
    mgr.signup(&request("ada@example.com", "password1", "Ada"))
        .unwrap();

    let wrong_password = mgr.authenticate("ada@example.com", "password2").unwrap_err();
    let unknown_email = mgr.authenticate("bob@example.com", "password1").unwrap_err();
    let malformed = mgr.authenticate("not-an-email", "password1").unwrap_err();

    assert!(matches!(wrong_password, UserError::InvalidCredentials));
    assert!(matches!(unknown_email, UserError::InvalidCredentials));
    assert!(matches!(malformed, UserError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[test]
fn test_get_unknown_user_is_not_found() {
    let (db, crypto) = setup();
    let mgr = UserManager::new(db.connection(), &crypto);
    assert!(matches!(mgr.get_user("missing"), Err(UserError::NotFound(_))));
    assert!(mgr.find_by_email("nobody@example.com").unwrap().is_none());
}

#[rstest]
#[case::no_at("adaexample.com", "password1", "Ada")]
#[case::two_ats("a@b@c.com", "password1", "Ada")]
#[case::empty_domain("ada@", "password1", "Ada")]
#[case::short_password("ada@example.com", "short", "Ada")]
#[case::long_password("ada@example.com", &"x".repeat(129), "Ada")]
#[case::blank_name("ada@example.com", "password1", "   ")]
#[case::long_name("ada@example.com", "password1", &"n".repeat(81))]
fn test_signup_rejects_invalid_input(
    #[case] email: &str,
    #[case] password: &str,
    #[case] name: &str,
) {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);

    let result = mgr.signup(&request(email, password, name));
    assert!(
        matches!(result, Err(UserError::InvalidInput(_))),
        "expected InvalidInput, got {:?}",
        result
    );

    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_create_user_reports_unique_email_conflict() {
    let (db, crypto) = setup();
    let mut mgr = UserManager::new(db.connection(), &crypto);
    let account = NewAccount {
        email: "ada@example.com".to_string(),
        display_name: "Ada".to_string(),
    };

    let user = mgr.create_user(&account, "pbkdf2-sha256$stored").unwrap();
    assert_eq!(user.password_hash, "pbkdf2-sha256$stored");

    // Skips the lookup done by signup, so only the UNIQUE constraint can catch it
    let err = mgr.create_user(&account, "pbkdf2-sha256$other").unwrap_err();
    assert!(matches!(err, UserError::EmailTaken(_)));
}
