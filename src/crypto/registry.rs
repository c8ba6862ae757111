use tracing::debug;

use super::{HashScheme, record::EncodedHashRecord};
use crate::error::HashError;

/// Ordered collection of hashing schemes.
/// New records are always produced by the default scheme, stored records are
/// verified by the first scheme that understands them.
pub struct HasherRegistry {
    default: Box<dyn HashScheme>,
    fallbacks: Vec<Box<dyn HashScheme>>,
}

impl HasherRegistry {
    pub fn new(default: impl HashScheme + 'static) -> Self {
        Self {
            default: Box::new(default),
            fallbacks: Vec::new(),
        }
    }

    /// Append a scheme consulted after the ones already registered
    pub fn with_scheme(mut self, scheme: impl HashScheme + 'static) -> Self {
        self.fallbacks.push(Box::new(scheme));
        self
    }

    pub fn default_scheme(&self) -> &dyn HashScheme {
        &*self.default
    }

    pub fn generate(&self, secret: &[u8]) -> Result<EncodedHashRecord, HashError> {
        self.default.generate(secret)
    }

    /// First registered scheme understanding `encoded`
    pub fn scheme_for(&self, encoded: &[u8]) -> Option<&dyn HashScheme> {
        std::iter::once(&self.default)
            .chain(self.fallbacks.iter())
            .find(|scheme| scheme.understands(encoded))
            .map(|scheme| &**scheme)
    }

    /// Verify `secret` with whichever scheme understands the stored record.
    ///
    /// # Errors
    /// `HashError::InvalidHashFormat` if no registered scheme understands the record,
    /// otherwise the error of the selected scheme.
    pub fn verify(&self, secret: &[u8], encoded: &[u8]) -> Result<(), HashError> {
        let scheme = self
            .scheme_for(encoded)
            .ok_or(HashError::InvalidHashFormat)?;
        debug!(scheme = scheme.name(), "verifying stored hash");
        scheme.verify(secret, encoded)
    }

    /// Whether the record was produced by the default scheme, records from any other
    /// scheme should be rehashed on the next successful verification.
    pub fn is_default_scheme(&self, encoded: &[u8]) -> bool {
        self.default.understands(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::Argon2idHasher,
        params::{ByteSize, CostParameters},
    };

    /// Stands for a legacy scheme: `$plain$<secret>`
    struct PlainScheme;

    impl HashScheme for PlainScheme {
        fn name(&self) -> &'static str {
            "plain"
        }

        fn generate(&self, secret: &[u8]) -> Result<EncodedHashRecord, HashError> {
            let secret = std::str::from_utf8(secret).map_err(|_| HashError::InvalidHashFormat)?;
            Ok(EncodedHashRecord::new_unchecked(format!("$plain${secret}")))
        }

        fn understands(&self, candidate: &[u8]) -> bool {
            candidate.starts_with(b"$plain$")
        }

        fn verify(&self, secret: &[u8], encoded: &[u8]) -> Result<(), HashError> {
            match encoded.strip_prefix(b"$plain$") {
                Some(stored) if stored == secret => Ok(()),
                Some(_) => Err(HashError::MismatchedHashAndPassword),
                None => Err(HashError::InvalidHashFormat),
            }
        }
    }

    fn registry() -> HasherRegistry {
        HasherRegistry::new(Argon2idHasher::new(CostParameters {
            memory: ByteSize::kib(64),
            iterations: 1,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }))
        .with_scheme(PlainScheme)
    }

    #[test]
    fn test_generate_uses_default_scheme() {
        let registry = registry();
        let record = registry.generate(b"secret").unwrap();
        assert!(registry.is_default_scheme(record.as_bytes()));
        assert_eq!(
            registry.scheme_for(record.as_bytes()).map(|s| s.name()),
            Some("argon2id")
        );
        assert!(registry.verify(b"secret", record.as_bytes()).is_ok());
    }

    #[test]
    fn test_legacy_records_are_dispatched_to_their_scheme() {
        let registry = registry();
        let legacy = PlainScheme.generate(b"secret").unwrap();
        assert!(!registry.is_default_scheme(legacy.as_bytes()));
        assert_eq!(
            registry.scheme_for(legacy.as_bytes()).map(|s| s.name()),
            Some("plain")
        );
        assert!(registry.verify(b"secret", legacy.as_bytes()).is_ok());
        assert!(matches!(
            registry.verify(b"other", legacy.as_bytes()),
            Err(HashError::MismatchedHashAndPassword)
        ));
    }

    #[test]
    fn test_unknown_records_are_rejected() {
        let registry = registry();
        assert!(registry.scheme_for(b"$2b$10$abcdefghijklmnopqrstuv").is_none());
        assert!(matches!(
            registry.verify(b"secret", b"$2b$10$abcdefghijklmnopqrstuv"),
            Err(HashError::InvalidHashFormat)
        ));
    }
}
