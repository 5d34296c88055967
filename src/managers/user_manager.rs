//! User Manager for Orbitmarks.
//!
//! Account creation and credential checks. Emails are stored in their
//! normalized lowercase form, so uniqueness is case-insensitive.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::services::crypto_service::{CryptoService, CryptoServiceTrait};
use crate::types::errors::UserError;
use crate::types::user::{normalize_email, NewAccount, SignupRequest, User};

/// Trait defining account operations.
pub trait UserManagerTrait {
    fn signup(&mut self, request: &SignupRequest) -> Result<User, UserError>;
    /// Stores an already validated account with a precomputed password hash.
    fn create_user(&mut self, account: &NewAccount, password_hash: &str) -> Result<User, UserError>;
    fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError>;
    fn get_user(&self, id: &str) -> Result<User, UserError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}

/// User manager backed by a SQLite connection.
pub struct UserManager<'a> {
    conn: &'a Connection,
    crypto: &'a CryptoService,
}

impl<'a> UserManager<'a> {
    pub fn new(conn: &'a Connection, crypto: &'a CryptoService) -> Self {
        Self { conn, crypto }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            display_name: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl<'a> UserManagerTrait for UserManager<'a> {
    /// Validates, hashes and stores a new account in one call. A second
    /// signup with the same email in any letter case is `EmailTaken`.
    fn signup(&mut self, request: &SignupRequest) -> Result<User, UserError> {
        let account = request.validate().map_err(UserError::InvalidInput)?;

        if self.find_by_email(&account.email)?.is_some() {
            return Err(UserError::EmailTaken(account.email));
        }

        let password_hash = self
            .crypto
            .hash_password(&request.password)
            .map_err(|e| UserError::CryptoError(e.to_string()))?;

        self.create_user(&account, &password_hash)
    }

    fn create_user(&mut self, account: &NewAccount, password_hash: &str) -> Result<User, UserError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: account.email.clone(),
            password_hash: password_hash.to_string(),
            display_name: account.display_name.clone(),
            created_at: Self::now(),
        };

        self.conn
            .execute(
                "INSERT INTO users (id, email, password_hash, display_name, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.email,
                    user.password_hash,
                    user.display_name,
                    user.created_at
                ],
            )
            .map_err(|e| match e {
                // UNIQUE(email) catches a concurrent signup that passed an earlier check
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    UserError::EmailTaken(user.email.clone())
                }
                other => UserError::DatabaseError(other.to_string()),
            })?;

        Ok(user)
    }

    /// Checks credentials. Unknown email and wrong password both yield
    /// `InvalidCredentials`.
    fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let email = match normalize_email(email) {
            Ok(email) => email,
            Err(_) => return Err(UserError::InvalidCredentials),
        };
        let user = self
            .find_by_email(&email)?
            .ok_or(UserError::InvalidCredentials)?;

        let valid = self
            .crypto
            .verify_password(&user.password_hash, password)
            .map_err(|e| UserError::CryptoError(e.to_string()))?;

        if !valid {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    fn get_user(&self, id: &str) -> Result<User, UserError> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, display_name, created_at FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()
            .map_err(|e| UserError::DatabaseError(e.to_string()))?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let email = email.trim().to_lowercase();
        self.conn
            .query_row(
                "SELECT id, email, password_hash, display_name, created_at FROM users WHERE email = ?1",
                params![email],
                Self::row_to_user,
            )
            .optional()
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}
