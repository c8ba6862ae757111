use subtle::ConstantTimeEq;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use super::{
    HashScheme,
    argon2instance::{ARGON2_VERSION, argon2_instance, derive_key},
    random::{OsRandomSource, RandomSource},
    record::{Argon2idRecord, EncodedHashRecord, is_argon2id_record},
};
use crate::{
    error::HashError,
    newtypes::Opaque,
    params::{ByteSize, CostParameters, ParametersProvider},
};

/// Records asking for more memory than this are refused at verification,
/// unless the current policy itself asks for more.
pub const DEFAULT_MAX_MEMORY: ByteSize = ByteSize::gib(1);

/// Argon2id hasher. Cost parameters are read from the provider on every generation,
/// verification only relies on what the record embeds.
pub struct Argon2idHasher<P, R = OsRandomSource> {
    provider: P,
    random: R,
    max_memory: ByteSize,
}

/// What a stored string turned out to be
#[derive(Debug)]
pub enum Identification {
    /// Not an argon2id record
    Unknown,
    /// Follows the argon2id grammar but cannot be decoded, e.g. an unsupported version
    Undecodable(HashError),
    Argon2id {
        record: Argon2idRecord,
        needs_rehash: bool,
    },
}

impl<P> Argon2idHasher<P>
where
    P: ParametersProvider,
{
    pub fn new(provider: P) -> Self {
        Self::with_random_source(provider, OsRandomSource)
    }
}

impl<P, R> Argon2idHasher<P, R>
where
    P: ParametersProvider,
    R: RandomSource,
{
    pub fn with_random_source(provider: P, random: R) -> Self {
        Self {
            provider,
            random,
            max_memory: DEFAULT_MAX_MEMORY,
        }
    }

    /// Upper bound on the memory a stored record may ask for at verification
    pub fn with_max_memory(mut self, max_memory: ByteSize) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// Parameters that would be used by the next generation
    pub fn cost_parameters(&self) -> CostParameters {
        self.provider.cost_parameters()
    }

    /// Whether a stored record was produced under parameters other than the current ones.
    ///
    /// # Arguments
    /// * `encoded` - Stored argon2id record
    pub fn needs_rehash(&self, encoded: &[u8]) -> Result<bool, HashError> {
        let record = Argon2idRecord::decode(encoded)?;
        Ok(self.differs_from_policy(&record))
    }

    /// Tell whether `encoded` is an argon2id record and, if it can be decoded,
    /// whether it follows the current policy.
    pub fn identify(&self, encoded: &[u8]) -> Identification {
        if !is_argon2id_record(encoded) {
            return Identification::Unknown;
        }
        match Argon2idRecord::decode(encoded) {
            Ok(record) => {
                let needs_rehash = self.differs_from_policy(&record);
                Identification::Argon2id {
                    record,
                    needs_rehash,
                }
            }
            Err(e) => Identification::Undecodable(e),
        }
    }

    fn differs_from_policy(&self, record: &Argon2idRecord) -> bool {
        let params = self.provider.cost_parameters();
        record.memory_kib != params.memory_kib()
            || record.iterations != params.iterations
            || record.parallelism != params.parallelism
            || record.salt.unsafe_inner().len() != params.salt_length as usize
            || record.key.unsafe_inner().len() != params.key_length as usize
    }

    fn memory_ceiling_kib(&self) -> u32 {
        let configured = u32::try_from(self.max_memory.as_kib()).unwrap_or(u32::MAX);
        configured.max(self.provider.cost_parameters().memory_kib())
    }
}

/// Parameters read from a stored record that argon2 refuses make the record malformed
fn stored_parameters_error(e: HashError) -> HashError {
    match e {
        HashError::InvalidParameters(reason) => {
            debug!(%reason, "stored argon2id parameters rejected");
            HashError::InvalidHashFormat
        }
        e => e,
    }
}

impl<P, R> HashScheme for Argon2idHasher<P, R>
where
    P: ParametersProvider,
    R: RandomSource,
{
    fn name(&self) -> &'static str {
        "argon2id"
    }

    #[instrument(name = "hash.Argon2.Generate", skip_all)]
    fn generate(&self, secret: &[u8]) -> Result<EncodedHashRecord, HashError> {
        let params = self.provider.cost_parameters();
        params.validate()?;
        debug!(
            memory_kib = params.memory_kib(),
            iterations = params.iterations,
            parallelism = params.parallelism,
            salt_length = params.salt_length,
            key_length = params.key_length,
            "generating argon2id hash"
        );

        let argon2 = argon2_instance(
            params.memory_kib(),
            params.iterations,
            params.parallelism,
            params.key_length as usize,
        )?;

        let mut salt = vec![0u8; params.salt_length as usize];
        self.random.fill(&mut salt)?;

        let mut key = Zeroizing::new(vec![0u8; params.key_length as usize]);
        derive_key(&argon2, secret, &salt, &mut key)?;

        Argon2idRecord {
            version: ARGON2_VERSION as u32,
            memory_kib: params.memory_kib(),
            iterations: params.iterations,
            parallelism: params.parallelism,
            salt: Opaque::new(salt),
            key: Opaque::new(std::mem::take(&mut *key)),
        }
        .encode()
    }

    fn understands(&self, candidate: &[u8]) -> bool {
        is_argon2id_record(candidate)
    }

    #[instrument(name = "hash.Argon2.Verify", skip_all)]
    fn verify(&self, secret: &[u8], encoded: &[u8]) -> Result<(), HashError> {
        let record = Argon2idRecord::decode(encoded)?;
        let expected = record.key.unsafe_inner();

        let ceiling = self.memory_ceiling_kib();
        if record.memory_kib > ceiling {
            debug!(
                memory_kib = record.memory_kib,
                ceiling, "stored argon2id memory cost above ceiling"
            );
            return Err(HashError::InvalidHashFormat);
        }

        let argon2 = argon2_instance(
            record.memory_kib,
            record.iterations,
            record.parallelism,
            expected.len(),
        )
        .map_err(stored_parameters_error)?;
        let mut candidate = Zeroizing::new(vec![0u8; expected.len()]);
        derive_key(&argon2, secret, record.salt.unsafe_inner(), &mut candidate)
            .map_err(stored_parameters_error)?;

        if bool::from(candidate.as_slice().ct_eq(expected.as_slice())) {
            Ok(())
        } else {
            debug!("argon2id key mismatch");
            Err(HashError::MismatchedHashAndPassword)
        }
    }
}
