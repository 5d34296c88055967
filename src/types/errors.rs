use std::fmt;

// === CryptoError ===

/// Errors related to password hashing and token generation.
#[derive(Debug)]
pub enum CryptoError {
    /// Failed to generate random bytes.
    RandomGeneration(String),
    /// A stored password hash could not be parsed.
    InvalidHash(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RandomGeneration(msg) => {
                write!(f, "Random generation failed: {}", msg)
            }
            CryptoError::InvalidHash(msg) => write!(f, "Invalid password hash: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}

// === UserError ===

/// Errors related to account management.
#[derive(Debug)]
pub enum UserError {
    /// Signup or login input failed validation.
    InvalidInput(String),
    /// An account with this email already exists.
    EmailTaken(String),
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// User with the given ID was not found.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
    /// Password hashing failed.
    CryptoError(String),
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            UserError::EmailTaken(email) => write!(f, "Email already registered: {}", email),
            UserError::InvalidCredentials => write!(f, "Invalid email or password"),
            UserError::NotFound(id) => write!(f, "User not found: {}", id),
            UserError::DatabaseError(msg) => write!(f, "User database error: {}", msg),
            UserError::CryptoError(msg) => write!(f, "User crypto error: {}", msg),
        }
    }
}

impl std::error::Error for UserError {}

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark input or layout batch failed validation.
    InvalidInput(String),
    /// Bookmark with the given ID was not found for this owner.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::InvalidInput(msg) => write!(f, "Invalid bookmark input: {}", msg),
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === SettingsError ===

/// Errors related to display settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The provided settings value is out of range.
    InvalidValue(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
            SettingsError::DatabaseError(msg) => {
                write!(f, "Settings database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === SessionError ===

/// Errors related to login sessions.
#[derive(Debug)]
pub enum SessionError {
    /// The token does not match any session.
    InvalidToken,
    /// The session exists but is past its expiry.
    Expired,
    /// Database operation failed.
    DatabaseError(String),
    /// Token generation failed.
    CryptoError(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidToken => write!(f, "Invalid session token"),
            SessionError::Expired => write!(f, "Session expired"),
            SessionError::DatabaseError(msg) => {
                write!(f, "Session database error: {}", msg)
            }
            SessionError::CryptoError(msg) => {
                write!(f, "Session crypto error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionError {}

// === ConfigError ===

/// Errors raised while reading server configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be parsed.
    InvalidValue(String, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(key, msg) => {
                write!(f, "Invalid value for {}: {}", key, msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// === ClientError ===

/// Errors surfaced by the HTTP client data layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The server rejected the request body (400).
    Validation(String),
    /// No valid session (401). The UI should route to the login view.
    Unauthorized,
    /// The referenced resource is absent or not owned (404).
    NotFound(String),
    /// The request conflicts with existing data (409).
    Conflict(String),
    /// Any other non-success status.
    Server(u16, String),
    /// The request never produced a response.
    Network(String),
    /// The response body could not be decoded.
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ClientError::Unauthorized => write!(f, "Not logged in"),
            ClientError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ClientError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ClientError::Server(status, msg) => write!(f, "Server error {}: {}", status, msg),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Decode(msg) => write!(f, "Response decode error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}
