use std::{fmt, str::FromStr, sync::Arc};

use byte_unit::{Byte, UnitType};
use thiserror::Error;

use crate::error::HashError;

const KIB: u64 = 1024;

// ###############################################
// ################## BYTE SIZE ##################
// ###############################################

/// Amount of memory expressed in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize(Byte);

impl ByteSize {
    pub const fn b(bytes: u64) -> Self {
        Self(Byte::from_u64(bytes))
    }

    pub const fn kib(kib: u64) -> Self {
        Self::b(kib * KIB)
    }

    pub const fn mib(mib: u64) -> Self {
        Self::b(mib * KIB * KIB)
    }

    pub const fn gib(gib: u64) -> Self {
        Self::b(gib * KIB * KIB * KIB)
    }

    pub fn as_bytes(&self) -> u64 {
        self.0.as_u64()
    }

    /// Whole kibibytes, truncated toward zero
    pub fn as_kib(&self) -> u64 {
        self.as_bytes() / KIB
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.get_appropriate_unit(UnitType::Binary))
    }
}

#[derive(Debug, Error)]
pub enum ByteSizeError {
    #[error("unknown byte size unit `{0}`")]
    UnknownUnit(String),
    #[error("invalid byte size `{input}`: {source}")]
    Invalid {
        input: String,
        #[source]
        source: byte_unit::ParseError,
    },
}

impl FromStr for ByteSize {
    type Err = ByteSizeError;

    /// Parses `<number>[unit]`, fractions allowed.
    /// `KB`, `MB` and `GB` are read as powers of 1024, like `KiB`, `MiB` and `GiB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .rfind(|c: char| c.is_ascii_digit() || c == '.')
            .map_or(0, |i| i + 1);
        let (number, unit) = s.split_at(split);
        let unit = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => "B",
            "k" | "kb" | "kib" => "KiB",
            "m" | "mb" | "mib" => "MiB",
            "g" | "gb" | "gib" => "GiB",
            other => return Err(ByteSizeError::UnknownUnit(other.to_string())),
        };
        // ignore_case, otherwise a lowercase `b` would mean bits
        Byte::parse_str(format!("{number} {unit}"), true)
            .map(ByteSize)
            .map_err(|source| ByteSizeError::Invalid {
                input: s.to_string(),
                source,
            })
    }
}

// ###############################################
// ############### COST PARAMETERS ###############
// ###############################################

/// Tunable cost of an argon2id derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostParameters {
    pub memory: ByteSize,
    pub iterations: u32,
    pub parallelism: u32,
    /// Salt length in bytes
    pub salt_length: u32,
    /// Derived key length in bytes
    pub key_length: u32,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            memory: ByteSize::mib(19),
            iterations: 2,
            parallelism: 1,
            salt_length: 16,
            key_length: 32,
        }
    }
}

impl CostParameters {
    /// Memory cost in kibibytes, truncated toward zero.
    /// Saturates at `u32::MAX`, which `validate` rejects.
    pub fn memory_kib(&self) -> u32 {
        u32::try_from(self.memory.as_kib()).unwrap_or(u32::MAX)
    }

    /// Checks that every field is usable for a derivation.
    ///
    /// # Errors
    /// `HashError::InvalidParameters` naming the first offending field.
    pub fn validate(&self) -> Result<(), HashError> {
        let kib = self.memory.as_kib();
        if kib == 0 {
            return Err(HashError::InvalidParameters(format!(
                "memory must be at least 1KiB, got {}",
                self.memory
            )));
        }
        if kib >= u64::from(u32::MAX) {
            return Err(HashError::InvalidParameters(format!(
                "memory {} does not fit in a 32 bits KiB count",
                self.memory
            )));
        }
        if self.iterations == 0 {
            return Err(HashError::InvalidParameters(
                "iterations must be positive".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(HashError::InvalidParameters(
                "parallelism must be positive".to_string(),
            ));
        }
        if self.salt_length == 0 {
            return Err(HashError::InvalidParameters(
                "salt length must be positive".to_string(),
            ));
        }
        if self.key_length == 0 {
            return Err(HashError::InvalidParameters(
                "key length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ###############################################
// ############# PARAMETERS PROVIDER #############
// ###############################################

/// Source of the cost parameters applied to newly generated hashes.
/// Queried once per generation, never mutated by the hasher.
pub trait ParametersProvider: Send + Sync {
    fn cost_parameters(&self) -> CostParameters;
}

impl ParametersProvider for CostParameters {
    fn cost_parameters(&self) -> CostParameters {
        *self
    }
}

impl<P: ParametersProvider + ?Sized> ParametersProvider for Arc<P> {
    fn cost_parameters(&self) -> CostParameters {
        (**self).cost_parameters()
    }
}
