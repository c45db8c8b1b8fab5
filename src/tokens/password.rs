use thiserror::Error;

/// bcrypt only looks at the first 72 bytes of its input, so longer
/// passwords are refused instead of being silently truncated.
pub const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Password too long (max {MAX_PASSWORD_LEN} characters)")]
    TooLong,
}

/// Reject passwords the hasher cannot represent faithfully.
pub fn check_length(password: &str) -> Result<(), CredentialError> {
    if password.len() > MAX_PASSWORD_LEN {
        return Err(CredentialError::TooLong);
    }
    Ok(())
}

/// Salted, adaptive one-way password hashing (bcrypt)
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt. Callers must run
    /// [`check_length`] first.
    pub fn hash(&self, password: &str) -> Result<Vec<u8>, CredentialError> {
        debug_assert!(
            password.len() <= MAX_PASSWORD_LEN,
            "password length must be checked before hashing"
        );
        Ok(bcrypt::hash(password, self.cost)?.into_bytes())
    }

    /// Check a password against a stored hash. A malformed hash never matches.
    pub fn verify(password: &str, hash: &[u8]) -> bool {
        let Ok(hash) = std::str::from_utf8(hash) else {
            return false;
        };
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
