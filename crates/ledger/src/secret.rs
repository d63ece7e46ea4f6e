//! Password hashing for account secrets (Argon2id, random salt, PHC strings).

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use minibank_core::{DomainError, DomainResult};

/// Input hashed once, at construction, to produce the decoy used for unknown
/// usernames.
const DECOY_PASSWORD: &str = "minibank-decoy-secret";

/// Salted one-way hashing of account passwords.
///
/// Verification of a stored hash runs in constant time with respect to the
/// candidate password. [`SecretHasher::verify_decoy`] performs the same amount
/// of work when there is no stored hash at all, so a failed login costs the
/// same whether or not the username exists.
pub struct SecretHasher {
    argon2: Argon2<'static>,
    decoy: String,
}

impl SecretHasher {
    /// Build a hasher and its decoy hash.
    ///
    /// The decoy is produced here so the first failed login for an unknown
    /// username costs one verification, like every later one.
    pub fn new(params: Params) -> DomainResult<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = hash_with(&argon2, DECOY_PASSWORD)?;
        Ok(Self { argon2, decoy })
    }

    /// Build a hasher with explicit memory (KiB) and iteration costs.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| DomainError::invalid_argument(format!("argon2 params: {e}")))?;
        Self::new(params)
    }

    pub fn hash(&self, password: &str) -> DomainResult<String> {
        hash_with(&self.argon2, password)
    }

    /// Check `password` against a stored PHC string.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend one verification on a hash nobody owns; the outcome is discarded.
    pub fn verify_decoy(&self, password: &str) {
        std::hint::black_box(self.verify(password, &self.decoy));
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
}

impl core::fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecretHasher")
            .field("algorithm", &"argon2id")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> SecretHasher {
        SecretHasher::with_cost(Params::MIN_M_COST, 1).unwrap()
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hasher = cheap();
        let stored = hasher.hash("hunter2").unwrap();

        assert!(stored.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &stored));
        assert!(!hasher.verify("hunter3", &stored));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = cheap();
        let a = hasher.hash("pw").unwrap();
        let b = hasher.hash("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!cheap().verify("pw", "not-a-phc-string"));
    }

    #[test]
    fn decoy_is_ready_before_the_first_login() {
        let hasher = cheap();
        assert!(hasher.decoy.starts_with("$argon2id$"));
        assert!(!hasher.verify("anything", &hasher.decoy));
        assert!(hasher.verify(DECOY_PASSWORD, &hasher.decoy));
        hasher.verify_decoy("anything");
    }

    #[test]
    fn rejects_invalid_cost() {
        assert!(SecretHasher::with_cost(0, 1).is_err());
    }
}
