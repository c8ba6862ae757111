use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::HashError;

/// Argon2 version written into every generated record
pub const ARGON2_VERSION: Version = Version::V0x13;

/// Build an Argon2id instance for the given costs.
///
/// # Arguments
/// * `memory_kib` - Memory cost in kibibytes
/// * `iterations` - Number of passes
/// * `parallelism` - Number of lanes
/// * `key_length` - Length of the derived key in bytes
pub fn argon2_instance(
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    key_length: usize,
) -> Result<Argon2<'static>, HashError> {
    let params = Params::new(memory_kib, iterations, parallelism, Some(key_length))
        .map_err(|e| HashError::InvalidParameters(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, ARGON2_VERSION, params))
}

/// Derive `out.len()` bytes from `secret` and `salt`.
pub fn derive_key(
    argon2: &Argon2<'_>,
    secret: &[u8],
    salt: &[u8],
    out: &mut [u8],
) -> Result<(), HashError> {
    argon2
        .hash_password_into(secret, salt, out)
        .map_err(|e| match e {
            argon2::Error::SaltTooShort | argon2::Error::SaltTooLong => {
                HashError::InvalidParameters(e.to_string())
            }
            e => HashError::Derivation(e),
        })
}
