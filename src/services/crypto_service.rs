use base64::engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD};
use base64::Engine as _;
use ring::digest;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;
use zeroize::Zeroize;

use crate::types::errors::CryptoError;

/// PBKDF2 iteration count for password hashing.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes for PBKDF2.
const SALT_LENGTH: usize = 16;

/// Derived hash length in bytes.
const HASH_LENGTH: usize = 32;

/// Raw session token length in bytes.
const TOKEN_LENGTH: usize = 32;

/// Scheme tag at the front of every encoded hash.
const HASH_SCHEME: &str = "pbkdf2-sha256";

/// Trait defining the cryptographic operations the server needs.
pub trait CryptoServiceTrait {
    /// Hashes a password with a fresh random salt.
    ///
    /// The result is self-describing: `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
    fn hash_password(&self, password: &str) -> Result<String, CryptoError>;

    /// Verifies a password against an encoded hash in constant time.
    fn verify_password(&self, encoded: &str, password: &str) -> Result<bool, CryptoError>;

    /// Generates a URL-safe random session token.
    fn generate_token(&self) -> Result<String, CryptoError>;

    /// Returns the hex SHA-256 digest of a token, used as its storage key.
    fn hash_token(&self, token: &str) -> String;

    /// Generates cryptographically secure random bytes of the specified length.
    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError>;
}

/// Implementation of cryptographic services using the `ring` crate.
pub struct CryptoService {
    rng: SystemRandom,
    iterations: NonZeroU32,
}

impl CryptoService {
    /// Creates a new CryptoService using the default iteration count.
    pub fn new() -> Self {
        Self::with_iterations(PBKDF2_ITERATIONS)
    }

    /// Creates a CryptoService with a custom PBKDF2 iteration count (minimum 1).
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            rng: SystemRandom::new(),
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
        }
    }

    fn derive(&self, password: &str, salt: &[u8], iterations: NonZeroU32) -> Vec<u8> {
        let mut out = vec![0u8; HASH_LENGTH];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            salt,
            password.as_bytes(),
            &mut out,
        );
        out
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed form of an encoded password hash.
struct EncodedHash {
    iterations: NonZeroU32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

fn parse_encoded(encoded: &str) -> Result<EncodedHash, CryptoError> {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 4 || parts[0] != HASH_SCHEME {
        return Err(CryptoError::InvalidHash("unrecognized format".to_string()));
    }
    let iterations = parts[1]
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| CryptoError::InvalidHash("bad iteration count".to_string()))?;
    let salt = BASE64
        .decode(parts[2])
        .map_err(|e| CryptoError::InvalidHash(format!("bad salt: {}", e)))?;
    let hash = BASE64
        .decode(parts[3])
        .map_err(|e| CryptoError::InvalidHash(format!("bad hash: {}", e)))?;
    if hash.is_empty() {
        return Err(CryptoError::InvalidHash("empty hash".to_string()));
    }
    Ok(EncodedHash {
        iterations,
        salt,
        hash,
    })
}

impl CryptoServiceTrait for CryptoService {
    fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        let salt = self.generate_random_bytes(SALT_LENGTH)?;
        let mut hash = self.derive(password, &salt, self.iterations);
        let encoded = format!(
            "{}${}${}${}",
            HASH_SCHEME,
            self.iterations,
            BASE64.encode(&salt),
            BASE64.encode(&hash)
        );
        hash.zeroize();
        Ok(encoded)
    }

    fn verify_password(&self, encoded: &str, password: &str) -> Result<bool, CryptoError> {
        let parsed = parse_encoded(encoded)?;
        Ok(pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            parsed.iterations,
            &parsed.salt,
            password.as_bytes(),
            &parsed.hash,
        )
        .is_ok())
    }

    fn generate_token(&self) -> Result<String, CryptoError> {
        let mut bytes = self.generate_random_bytes(TOKEN_LENGTH)?;
        let token = URL_SAFE_NO_PAD.encode(&bytes);
        bytes.zeroize();
        Ok(token)
    }

    fn hash_token(&self, token: &str) -> String {
        let digest = digest::digest(&digest::SHA256, token.as_bytes());
        digest.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>, CryptoError> {
        let mut bytes = vec![0u8; length];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CryptoError::RandomGeneration("system RNG unavailable".to_string()))?;
        Ok(bytes)
    }
}
