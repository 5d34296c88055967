//! Session Manager for Orbitmarks.
//!
//! Issues opaque login tokens and resolves them back to a user id. Only the
//! SHA-256 digest of a token is stored; the raw token exists solely in the
//! client's cookie.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::services::crypto_service::{CryptoService, CryptoServiceTrait};
use crate::types::errors::SessionError;
use crate::types::session::Session;

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    /// Creates a session for `user_id` lasting `ttl_secs`. Returns the raw token.
    fn create_session(&mut self, user_id: &str, ttl_secs: i64) -> Result<(String, Session), SessionError>;
    /// Resolves a raw token. Expired sessions are deleted and reported as `Expired`.
    fn resolve(&self, token: &str) -> Result<Session, SessionError>;
    /// Deletes the session for a raw token. Returns whether one existed.
    fn revoke(&mut self, token: &str) -> Result<bool, SessionError>;
    /// Deletes every expired session. Returns how many were removed.
    fn purge_expired(&mut self) -> Result<usize, SessionError>;
}

/// Session manager backed by SQLite + CryptoService.
pub struct SessionManager<'a> {
    conn: &'a Connection,
    crypto: &'a CryptoService,
}

impl<'a> SessionManager<'a> {
    pub fn new(conn: &'a Connection, crypto: &'a CryptoService) -> Self {
        Self { conn, crypto }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn delete_by_hash(&self, token_hash: &str) -> Result<usize, SessionError> {
        self.conn
            .execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }
}

impl<'a> SessionManagerTrait for SessionManager<'a> {
    fn create_session(&mut self, user_id: &str, ttl_secs: i64) -> Result<(String, Session), SessionError> {
        let token = self
            .crypto
            .generate_token()
            .map_err(|e| SessionError::CryptoError(e.to_string()))?;
        let now = Self::now();
        let session = Session {
            token_hash: self.crypto.hash_token(&token),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now.saturating_add(ttl_secs.max(0)),
        };

        self.conn
            .execute(
                "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token_hash,
                    session.user_id,
                    session.created_at,
                    session.expires_at
                ],
            )
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        Ok((token, session))
    }

    fn resolve(&self, token: &str) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidToken);
        }
        let token_hash = self.crypto.hash_token(token);
        let session = self
            .conn
            .query_row(
                "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                |row| {
                    Ok(Session {
                        token_hash: row.get(0)?,
                        user_id: row.get(1)?,
                        created_at: row.get(2)?,
                        expires_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?
            .ok_or(SessionError::InvalidToken)?;

        if session.is_expired(Self::now()) {
            self.delete_by_hash(&session.token_hash)?;
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    fn revoke(&mut self, token: &str) -> Result<bool, SessionError> {
        let token_hash = self.crypto.hash_token(token);
        Ok(self.delete_by_hash(&token_hash)? > 0)
    }

    fn purge_expired(&mut self) -> Result<usize, SessionError> {
        self.conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![Self::now()],
            )
            .map_err(|e| SessionError::DatabaseError(e.to_string()))
    }
}
