//! Opaque API tokens exchanged for valid credentials.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;

const TOKEN_BYTES: usize = 20;

/// Length of the hex-encoded token key.
pub const TOKEN_KEY_LEN: usize = TOKEN_BYTES * 2;

/// Token key failed shape validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token must be {TOKEN_KEY_LEN} lowercase hexadecimal characters")]
pub struct MalformedToken;

/// Bearer token bound to exactly one user.
///
/// ## Invariants
/// - Exactly [`TOKEN_KEY_LEN`] lowercase hexadecimal characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Draw a new key from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Validate a key presented by a client or loaded from storage.
    pub fn parse(raw: &str) -> Result<Self, MalformedToken> {
        let well_formed = raw.len() == TOKEN_KEY_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(raw.to_owned()))
        } else {
            Err(MalformedToken)
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keys are credentials; keep them out of debug logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.0.get(..6).unwrap_or_default();
        write!(f, "AuthToken({prefix}…)")
    }
}
