//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with fixed work factor
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with the OWASP baseline parameters
    pub fn new() -> Self {
        // argon2 crate defaults: m=19MiB, t=2 iterations, p=1 lane
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default());

        Self { argon2 }
    }

    /// Hash a password into a PHC string with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal_error("Failed to hash password")
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// A stored hash that cannot be parsed is treated as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Validate password against policy
    pub fn validate_password_policy(
        password: &str,
        policy: &SecurityConfig,
    ) -> Result<(), AppError> {
        let reject = || Err(AppError::Validation(policy_message(policy)));

        // Check length
        if password.chars().count() < policy.password_min_length {
            return reject();
        }

        // Check uppercase
        if policy.password_require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return reject();
        }

        // Check lowercase
        if policy.password_require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return reject();
        }

        // Check digit
        if policy.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return reject();
        }

        // Check special character
        if policy.password_require_special
            && !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            return reject();
        }

        Ok(())
    }
}

/// Human-readable description of the configured policy
fn policy_message(policy: &SecurityConfig) -> String {
    let mut rules = Vec::new();
    match (
        policy.password_require_uppercase,
        policy.password_require_lowercase,
    ) {
        (true, true) => rules.push("one uppercase and one lowercase letter"),
        (true, false) => rules.push("one uppercase letter"),
        (false, true) => rules.push("one lowercase letter"),
        (false, false) => {}
    }
    if policy.password_require_digit {
        rules.push("one number");
    }
    if policy.password_require_special {
        rules.push("one symbol");
    }

    let mut message = format!(
        "Password must be a minimum of {} characters long",
        policy.password_min_length
    );
    match rules.split_last() {
        None => {}
        Some((last, [])) => message.push_str(&format!(", contain at least {}", last)),
        Some((last, rest)) => {
            message.push_str(&format!(", contain at least {} and {}", rest.join(", "), last))
        }
    }
    message.push('.');
    message
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
