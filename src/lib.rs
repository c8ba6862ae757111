use std::{
    env::{self, VarError},
    str::FromStr,
};

use tracing::Level;

pub mod crypto;
pub mod error;
pub mod newtypes;
pub mod params;

pub use crypto::{
    Argon2idHasher, Argon2idRecord, DEFAULT_MAX_MEMORY, EncodedHashRecord, HashScheme,
    HasherRegistry, Identification, OsRandomSource, RandomSource,
};
pub use error::HashError;
pub use params::{ByteSize, CostParameters, ParametersProvider};

// ############################################
// ################## CONFIG ##################
// ############################################

pub struct Config {
    /// Application log level, has priority over `RUST_LOG` environment variable
    pub log_level: Level,
    /// Cost parameters applied to newly generated hashes
    pub cost_parameters: CostParameters,
    /// Largest memory cost a stored record may ask for at verification
    pub max_memory: ByteSize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            cost_parameters: CostParameters::default(),
            max_memory: DEFAULT_MAX_MEMORY,
        }
    }
}

impl Config {
    pub fn parse_environment() -> Result<Self, Vec<anyhow::Error>> {
        let mut errors = Vec::new();
        let defaults = CostParameters::default();

        let log_level = match parse_env_variable::<Level>("LOG_LEVEL") {
            Ok(v) => v.unwrap_or(Level::INFO),
            Err(e) => {
                errors.push(e);
                Level::INFO
            }
        };

        let memory = match parse_env_variable::<ByteSize>("HASHER_ARGON2_MEMORY") {
            Ok(v) => v.unwrap_or(defaults.memory),
            Err(e) => {
                errors.push(e);
                defaults.memory
            }
        };

        let max_memory = match parse_env_variable::<ByteSize>("HASHER_ARGON2_MAX_MEMORY") {
            Ok(v) => v.unwrap_or(DEFAULT_MAX_MEMORY),
            Err(e) => {
                errors.push(e);
                DEFAULT_MAX_MEMORY
            }
        };

        let mut parse_u32_or = |key: &str, default: u32| match parse_env_variable::<u32>(key) {
            Ok(v) => v.unwrap_or(default),
            Err(e) => {
                errors.push(e);
                default
            }
        };
        let iterations = parse_u32_or("HASHER_ARGON2_ITERATIONS", defaults.iterations);
        let parallelism = parse_u32_or("HASHER_ARGON2_PARALLELISM", defaults.parallelism);
        let salt_length = parse_u32_or("HASHER_ARGON2_SALT_LENGTH", defaults.salt_length);
        let key_length = parse_u32_or("HASHER_ARGON2_KEY_LENGTH", defaults.key_length);

        let cost_parameters = CostParameters {
            memory,
            iterations,
            parallelism,
            salt_length,
            key_length,
        };
        if let Err(e) = cost_parameters.validate() {
            errors.push(anyhow::Error::new(e).context("[HASHER_ARGON2_*]"));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Config {
            log_level,
            cost_parameters,
            max_memory,
        })
    }
}

impl ParametersProvider for Config {
    fn cost_parameters(&self) -> CostParameters {
        self.cost_parameters
    }
}

fn parse_env_variable<T>(key: &str) -> Result<Option<T>, anyhow::Error>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    fn map_err<E>(key: &str, e: E) -> anyhow::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        anyhow::anyhow!("[{key}]: {e}")
    }

    let env_value = match env::var(key) {
        Ok(v) => {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v))
            }
        }
        Err(e) => {
            if e == VarError::NotPresent {
                Ok(None)
            } else {
                Err(map_err(key, e))
            }
        }
    }?;
    env_value
        .map(|v| v.parse::<T>().map_err(|e| map_err(key, e)))
        .transpose()
}
