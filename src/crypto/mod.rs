use crate::error::HashError;

pub mod argon2instance;
pub mod hasher;
pub mod random;
pub mod record;
pub mod registry;

pub use hasher::{Argon2idHasher, DEFAULT_MAX_MEMORY, Identification};
pub use random::{OsRandomSource, RandomSource};
pub use record::{Argon2idRecord, EncodedHashRecord};
pub use registry::HasherRegistry;

/// A password hashing scheme able to produce records and recognize its own format.
pub trait HashScheme: Send + Sync {
    /// Short identifier of the scheme, used in logs
    fn name(&self) -> &'static str;

    /// Hash `secret` under the current policy.
    /// Returns the full record, ready to be stored, or an error and no output at all.
    fn generate(&self, secret: &[u8]) -> Result<EncodedHashRecord, HashError>;

    /// Whether `candidate` looks like a record produced by this scheme, under any cost
    /// parameters. Never fails: anything malformed is simply not understood.
    fn understands(&self, candidate: &[u8]) -> bool;

    /// Check `secret` against a stored record.
    ///
    /// # Errors
    /// * `HashError::MismatchedHashAndPassword` if the secret does not match
    /// * `HashError::InvalidHashFormat` or `HashError::IncompatibleVersion` if the
    ///   record cannot be verified by this scheme
    fn verify(&self, secret: &[u8], encoded: &[u8]) -> Result<(), HashError>;
}
