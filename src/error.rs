use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    /// The secure random source could not provide entropy for the salt
    #[error("failed to read from the secure random source: {0}")]
    RandomSource(#[source] rand::Error),
    /// The record could not be composed
    #[error("failed to encode the hash record: {0}")]
    Encoding(#[from] std::fmt::Error),
    #[error("the encoded hash is not in the correct format")]
    InvalidHashFormat,
    /// The record follows the argon2id grammar but declares a version this hasher cannot re-derive
    #[error("incompatible version of argon2: found {found}, supported {supported}")]
    IncompatibleVersion { found: u32, supported: u32 },
    #[error("invalid argon2 parameters: {0}")]
    InvalidParameters(String),
    #[error("failed to derive argon2id key: {0}")]
    Derivation(#[source] argon2::Error),
    #[error("passwords do not match")]
    MismatchedHashAndPassword,
}
