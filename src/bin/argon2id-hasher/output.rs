use std::fmt;

use argon2id_hasher::{HashError, Identification};
use serde::Serialize;
use thiserror::Error;

/// Output formatter that supports both human-readable and JSON formats
pub struct Output {
    json_mode: bool,
}

impl Output {
    pub fn new(json_mode: bool) -> Self {
        Self { json_mode }
    }

    /// Print a success message
    pub fn success<T: Serialize + fmt::Display>(&self, data: &T) {
        if self.json_mode {
            self.print_json(data);
        } else {
            println!("{}", data);
        }
    }

    /// Print an error message
    pub fn error(&self, error: &CliError) {
        if self.json_mode {
            self.print_json(&ErrorOutput {
                error: error.to_string(),
            });
        } else {
            eprintln!("Error: {}", error);
        }
    }

    fn print_json<T: Serialize>(&self, data: &T) {
        match serde_json::to_string_pretty(data) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize JSON: {}", e),
        }
    }
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct HashOutput {
    pub record: String,
}

impl fmt::Display for HashOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record)
    }
}

#[derive(Serialize)]
pub struct VerifyOutput {
    pub matches: bool,
}

impl fmt::Display for VerifyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches {
            write!(f, "match")
        } else {
            write!(f, "mismatch")
        }
    }
}

#[derive(Serialize)]
pub struct IdentifyOutput {
    pub understood: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RecordParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_rehash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct RecordParameters {
    pub version: u32,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub salt_length: usize,
    pub key_length: usize,
}

impl From<Identification> for IdentifyOutput {
    fn from(identification: Identification) -> Self {
        match identification {
            Identification::Unknown => Self {
                understood: false,
                parameters: None,
                needs_rehash: None,
                error: None,
            },
            Identification::Undecodable(e) => Self {
                understood: true,
                parameters: None,
                needs_rehash: None,
                error: Some(e.to_string()),
            },
            Identification::Argon2id {
                record,
                needs_rehash,
            } => Self {
                understood: true,
                parameters: Some(RecordParameters {
                    version: record.version,
                    memory_kib: record.memory_kib,
                    iterations: record.iterations,
                    parallelism: record.parallelism,
                    salt_length: record.salt.unsafe_inner().len(),
                    key_length: record.key.unsafe_inner().len(),
                }),
                needs_rehash: Some(needs_rehash),
                error: None,
            },
        }
    }
}

impl fmt::Display for IdentifyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.understood {
            return write!(f, "not an argon2id record");
        }
        writeln!(f, "argon2id record")?;
        if let Some(p) = &self.parameters {
            writeln!(f, "  version:     {}", p.version)?;
            writeln!(f, "  memory:      {} KiB", p.memory_kib)?;
            writeln!(f, "  iterations:  {}", p.iterations)?;
            writeln!(f, "  parallelism: {}", p.parallelism)?;
            writeln!(f, "  salt length: {} bytes", p.salt_length)?;
            writeln!(f, "  key length:  {} bytes", p.key_length)?;
        }
        if let Some(needs_rehash) = self.needs_rehash {
            writeln!(f, "  needs rehash: {}", needs_rehash)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  cannot be decoded: {}", error)?;
        }
        Ok(())
    }
}
