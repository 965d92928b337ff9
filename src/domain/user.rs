use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type UserId = i64;

/// A registered account. Credentials are immutable once created and accounts
/// are never deleted by the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// One-way digest of the password, lowercase hex. Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Digest a password for storage or lookup.
///
/// SHA-256 is deterministic: the same input always produces the same digest,
/// so authentication is a single equality match against the stored value.
/// A production credential store would use a salted slow KDF instead and
/// verify after fetching by username.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{digest:x}")
}
