use rand::{RngCore, rngs::OsRng};

use crate::error::HashError;

/// Defines the RandomSource trait for salt generation
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with cryptographically secure random bytes
    /// # Arguments
    /// * `dest` - Buffer to fill
    fn fill(&self, dest: &mut [u8]) -> Result<(), HashError>;
}

/// Operating system entropy source. Failures are surfaced, never replaced by a weaker generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn fill(&self, dest: &mut [u8]) -> Result<(), HashError> {
        OsRng.try_fill_bytes(dest).map_err(HashError::RandomSource)
    }
}
