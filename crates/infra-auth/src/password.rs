// Salted, iterated SHA-256 password hashing
//
// Stored format: sha256$<iterations>$<salt hex>$<hash hex>

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::PasswordHasher;

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
pub const DEFAULT_ITERATIONS: u32 = 10_000;

pub struct Sha256PasswordHasher {
    iterations: u32,
}

impl Sha256PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    fn digest(password: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        let mut out = hasher.finalize();

        for _ in 1..iterations {
            let mut hasher = Sha256::new();
            hasher.update(out);
            hasher.update(salt);
            out = hasher.finalize();
        }
        out.to_vec()
    }
}

impl Default for Sha256PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

fn malformed() -> AppError {
    AppError::Internal("Malformed password hash".to_string())
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let hash = Self::digest(password, &salt, self.iterations);
        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(hash)
        ))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let mut parts = stored_hash.split('$');
        let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(malformed());
        };
        if scheme != SCHEME {
            return Err(malformed());
        }

        let iterations: u32 = iterations.parse().map_err(|_| malformed())?;
        let salt = hex::decode(salt).map_err(|_| malformed())?;
        let expected = hex::decode(expected).map_err(|_| malformed())?;

        let actual = Self::digest(password, &salt, iterations);
        // Length mismatch compares unequal
        Ok(actual.as_slice().ct_eq(expected.as_slice()).into())
    }
}
