use sha2::{Digest, Sha256};

/// Computes the stored digest for a plaintext password: the lowercase hex encoding of
/// its SHA-256 hash. Deterministic and unsalted, so the same plaintext always maps to
/// the same digest. Registration stores this value and login recomputes it for the
/// credential match, so both sides must go through this one function.
///
/// Note: without a salt or work factor this scheme is only as strong as the passwords
/// themselves. Swapping in a salted slow hash (argon2) invalidates every stored digest,
/// so it has to be done with a migration, not a drop-in change.
pub fn digest(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}
