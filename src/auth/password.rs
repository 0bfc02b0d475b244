//! Password hashing and verification (Argon2id, PHC string format).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::auth::errors::AuthError;

#[cfg(test)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Salted one-way password hasher with a fixed work factor.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway password, made with `params`. Lookups for unknown
    /// usernames verify against it so they cost as much as a wrong password.
    dummy_hash: String,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    /// Build a hasher with the given Argon2 memory cost (KiB) and iteration count.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::Internal(format!("invalid argon2 parameters: {}", e)))?;
        let dummy_hash = hash_with(&params, "myflix-dummy-password")?;
        Ok(Self {
            params,
            dummy_hash,
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash_with(&self.params, plaintext)
    }

    /// Check `plaintext` against a stored PHC hash. Malformed hashes never match.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        // Parameters and salt come from the hash itself.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend one verification's worth of work without checking anything.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }

    #[cfg(test)]
    pub(crate) fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

fn hash_with(params: &Params, plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(1024, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_but_verifies() {
        let hasher = test_hasher();
        for password in ["secret1", "", "pässwörd with spaces"] {
            let first = hasher.hash(password).unwrap();
            let second = hasher.hash(password).unwrap();
            assert_ne!(first, second);
            assert!(hasher.verify(password, &first));
            assert!(hasher.verify(password, &second));
        }
    }

    #[test]
    fn test_different_password_does_not_verify() {
        let hasher = test_hasher();
        let hash = hasher.hash("secret1").unwrap();
        assert!(!hasher.verify("secret2", &hash));
        assert!(!hasher.verify("Secret1", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hasher = test_hasher();
        let hash = hasher.hash("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret1"));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let hasher = test_hasher();
        assert!(!hasher.verify("secret1", ""));
        assert!(!hasher.verify("secret1", "secret1"));
        assert!(!hasher.verify("secret1", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn test_verify_reads_params_from_hash() {
        let weak = test_hasher();
        let hash = weak.hash("secret1").unwrap();
        let strong = PasswordHasher::new(4096, 3).unwrap();
        assert!(strong.verify("secret1", &hash));
    }

    #[test]
    fn test_dummy_verification_runs_argon2() {
        let hasher = test_hasher();
        hasher.verify_dummy("secret1");
        hasher.verify_dummy("");
        assert_eq!(hasher.verification_count(), 2);
    }

    #[test]
    fn test_dummy_hash_uses_configured_params() {
        let hasher = PasswordHasher::new(2048, 2).unwrap();
        let parsed = PasswordHash::new(&hasher.dummy_hash).unwrap();
        let params = Params::try_from(&parsed).unwrap();
        assert_eq!(params.m_cost(), 2048);
        assert_eq!(params.t_cost(), 2);
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(PasswordHasher::new(0, 0).is_err());
    }
}
