//! App Core for Orbitmarks.
//!
//! Shared state handed to every request handler: the database, the crypto
//! service and the server configuration.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::config::ServerConfig;
use crate::database::connection::Database;
use crate::services::crypto_service::CryptoService;

/// Central application state, cheap to clone into each request.
///
/// Managers are created on demand from the locked connection because they
/// borrow it with a lifetime.
#[derive(Clone)]
pub struct App {
    pub db: Arc<Mutex<Database>>,
    pub crypto: Arc<CryptoService>,
    pub config: Arc<ServerConfig>,
}

impl App {
    /// Opens the database at `config.database_path`, creating parent
    /// directories as needed.
    pub fn new(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data directory: {}", e))?;
        }
        let db = Database::open(&config.database_path)?;
        Ok(Self::with_database(db, config, CryptoService::new()))
    }

    /// Builds state around an already-open database.
    pub fn with_database(db: Database, config: ServerConfig, crypto: CryptoService) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            crypto: Arc::new(crypto),
            config: Arc::new(config),
        }
    }

    /// Runs one storage call with the connection locked.
    ///
    /// The lock is released before returning, so callers never hold it
    /// across an `.await`.
    pub fn with_db<T, E, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        ApiError: From<E>,
    {
        let db = self
            .db
            .lock()
            .map_err(|e| ApiError::Internal(format!("database lock poisoned: {}", e)))?;
        f(db.connection()).map_err(ApiError::from)
    }
}
