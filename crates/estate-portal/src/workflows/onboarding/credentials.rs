use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

/// Argon2id wrapper used wherever the portal stores or checks a password.
#[derive(Default)]
pub struct PasswordVault {
    scheme: Argon2<'static>,
}

impl PasswordVault {
    /// Salted, slow one-way hash in PHC string format.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .scheme
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(digest.to_string())
    }

    /// A malformed stored digest counts as a mismatch rather than an error.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        PasswordHash::new(digest)
            .map(|parsed| {
                self.scheme
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password could not be hashed: {0}")]
    Hash(String),
}
