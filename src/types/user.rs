use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_DISPLAY_NAME_LEN: usize = 80;

/// A stored account. The password hash never leaves the storage layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: i64,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl SignupRequest {
    /// Checks every field and returns the account in its stored form.
    /// The password itself is not carried over; it is hashed separately.
    pub fn validate(&self) -> Result<NewAccount, String> {
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        let display_name = validate_display_name(&self.display_name)?;
        Ok(NewAccount {
            email,
            display_name,
        })
    }
}

/// Validated signup fields, ready to insert next to a password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Normalizes an email to its stored form (trimmed, lowercase) and checks its shape.
pub fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();
    let len = email.chars().count();
    if !(3..=MAX_EMAIL_LEN).contains(&len) {
        return Err(format!("email must be 3 to {} characters", MAX_EMAIL_LEN));
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err("email must contain exactly one @".to_string()),
    };
    if local.is_empty() || domain.is_empty() {
        return Err("email must have a name and a domain".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("email must not contain whitespace".to_string());
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(format!(
            "password must be {} to {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("display name must not be empty".to_string());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(format!(
            "display name must be at most {} characters",
            MAX_DISPLAY_NAME_LEN
        ));
    }
    Ok(name.to_string())
}
