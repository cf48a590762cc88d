//! bcrypt-backed [`PasswordHasher`].
//!
//! bcrypt is CPU-bound, so both operations run on Tokio's blocking
//! pool instead of the actix worker thread.

use async_trait::async_trait;
use bcrypt::DEFAULT_COST;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Password hasher using bcrypt with a fixed cost factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl BcryptPasswordHasher {
    /// Hasher with an explicit cost factor in `4..=31`.
    pub fn with_cost(cost: u32) -> Result<Self, PasswordHashError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(PasswordHashError::hash(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.cost;
        tokio::task::spawn_blocking(move || {
            bcrypt::hash(password.as_bytes(), cost)
                .map_err(|err| PasswordHashError::hash(err.to_string()))
        })
        .await
        .map_err(|err| PasswordHashError::hash(format!("hashing task failed: {err}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || {
            bcrypt::verify(password.as_bytes(), &hash)
                .map_err(|err| PasswordHashError::malformed_hash(err.to_string()))
        })
        .await
        .map_err(|err| PasswordHashError::hash(format!("verification task failed: {err}")))?
    }
}
