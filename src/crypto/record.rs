use std::fmt::{self, Write};

use base64::{Engine, prelude::BASE64_STANDARD_NO_PAD};

use super::argon2instance::ARGON2_VERSION;
use crate::{error::HashError, newtypes::Opaque};

/// Algorithm identifier of the record
pub const ARGON2ID_TAG: &str = "argon2id";

// ###############################################
// ############### ENCODED RECORD ################
// ###############################################

/// Canonical text form of an argon2id hash:
/// `$argon2id$v=<version>$m=<memoryKiB>,t=<iterations>,p=<parallelism>$<salt>$<key>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedHashRecord(String);

impl EncodedHashRecord {
    /// Wraps an already encoded record without checking it.
    /// Meant for schemes producing their own encoding.
    pub fn new_unchecked(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedHashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for EncodedHashRecord {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

// ###############################################
// ############### DECODED RECORD ################
// ###############################################

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argon2idRecord {
    pub version: u32,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub salt: Opaque<Vec<u8>>,
    pub key: Opaque<Vec<u8>>,
}

impl Argon2idRecord {
    /// Compose the canonical text form of the record.
    pub fn encode(&self) -> Result<EncodedHashRecord, HashError> {
        let mut encoded = String::new();
        write!(
            encoded,
            "${ARGON2ID_TAG}$v={}$m={},t={},p={}${}${}",
            self.version,
            self.memory_kib,
            self.iterations,
            self.parallelism,
            BASE64_STANDARD_NO_PAD.encode(self.salt.unsafe_inner()),
            BASE64_STANDARD_NO_PAD.encode(self.key.unsafe_inner()),
        )?;
        Ok(EncodedHashRecord(encoded))
    }

    /// Parse a record.
    ///
    /// # Errors
    /// * `HashError::InvalidHashFormat` if the input does not follow the argon2id grammar
    ///   or a payload is not unpadded standard base64
    /// * `HashError::IncompatibleVersion` if the record is well formed but declares
    ///   a version other than the supported one
    pub fn decode(encoded: &[u8]) -> Result<Self, HashError> {
        let segments = Segments::parse(encoded).ok_or(HashError::InvalidHashFormat)?;
        let salt = BASE64_STANDARD_NO_PAD
            .decode(segments.salt)
            .map_err(|_| HashError::InvalidHashFormat)?;
        let key = BASE64_STANDARD_NO_PAD
            .decode(segments.key)
            .map_err(|_| HashError::InvalidHashFormat)?;

        let supported = ARGON2_VERSION as u32;
        if segments.version != supported {
            return Err(HashError::IncompatibleVersion {
                found: segments.version,
                supported,
            });
        }

        Ok(Self {
            version: segments.version,
            memory_kib: segments.memory_kib,
            iterations: segments.iterations,
            parallelism: segments.parallelism,
            salt: Opaque::new(salt),
            key: Opaque::new(key),
        })
    }
}

/// Cheap check that `candidate` follows the argon2id record grammar, whatever its
/// version and cost parameters. The payloads are checked against the base64
/// alphabet but not decoded.
pub fn is_argon2id_record(candidate: &[u8]) -> bool {
    Segments::parse(candidate).is_some()
}

// ###############################################
// ################### GRAMMAR ###################
// ###############################################

struct Segments<'a> {
    version: u32,
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt: &'a str,
    key: &'a str,
}

impl<'a> Segments<'a> {
    fn parse(encoded: &'a [u8]) -> Option<Self> {
        let encoded = std::str::from_utf8(encoded).ok()?;
        let mut parts = encoded.split('$');

        if !parts.next()?.is_empty() || parts.next()? != ARGON2ID_TAG {
            return None;
        }
        let version = parse_u32(parts.next()?.strip_prefix("v=")?)?;

        let mut costs = parts.next()?.split(',');
        let memory_kib = parse_u32(costs.next()?.strip_prefix("m=")?)?;
        let iterations = parse_u32(costs.next()?.strip_prefix("t=")?)?;
        let parallelism = parse_u32(costs.next()?.strip_prefix("p=")?)?;
        if costs.next().is_some() {
            return None;
        }

        let salt = parts.next().filter(|s| is_unpadded_base64(s))?;
        let key = parts.next().filter(|s| is_unpadded_base64(s))?;
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            version,
            memory_kib,
            iterations,
            parallelism,
            salt,
            key,
        })
    }
}

/// Plain decimal digits only: no sign, no whitespace.
fn parse_u32(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn is_unpadded_base64(s: &str) -> bool {
    !s.is_empty()
        && s.len() % 4 != 1
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str =
        "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$YmFzZTY0IGVuY29kZWQga2V5IG1hdGVyaWFsIQ";

    #[test]
    fn test_decode_well_formed_record() {
        let record = Argon2idRecord::decode(RECORD.as_bytes()).unwrap();
        assert_eq!(record.version, 19);
        assert_eq!(record.memory_kib, 19456);
        assert_eq!(record.iterations, 2);
        assert_eq!(record.parallelism, 1);
        assert_eq!(record.salt.unsafe_inner().as_slice(), b"somesaltsomesalt");
        assert_eq!(
            record.key.unsafe_inner().as_slice(),
            b"base64 encoded key material!"
        );
    }

    #[test]
    fn test_encode_matches_canonical_layout() {
        let record = Argon2idRecord::decode(RECORD.as_bytes()).unwrap();
        assert_eq!(record.encode().unwrap().as_str(), RECORD);
    }

    #[test]
    fn test_debug_hides_payloads() {
        let record = Argon2idRecord::decode(RECORD.as_bytes()).unwrap();
        let debug = format!("{record:?}");
        assert!(!debug.contains("115")); // first salt byte, 's'
        assert!(debug.contains("*********"));
    }

    #[test]
    fn test_bumped_version_is_incompatible() {
        let bumped = RECORD.replace("v=19", "v=20");
        assert!(is_argon2id_record(bumped.as_bytes()));
        assert!(matches!(
            Argon2idRecord::decode(bumped.as_bytes()),
            Err(HashError::IncompatibleVersion {
                found: 20,
                supported: 19
            })
        ));
    }

    #[test]
    fn test_malformed_records() {
        let malformed = [
            "",
            "$",
            "argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2i$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a2V5$extra",
            "$argon2id$v=19$m=19456,t=2,p=1$$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$",
            "$argon2id$19$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1,x=3$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$t=2,m=19456,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=-1,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=+1,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=4294967296,t=2,p=1$c29tZXNhbHQ$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ=$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZX-hbHQ$a2V5a2V5",
            "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$a2V5a",
        ];
        for candidate in malformed {
            assert!(
                !is_argon2id_record(candidate.as_bytes()),
                "`{candidate}` should not be recognized"
            );
            assert!(
                matches!(
                    Argon2idRecord::decode(candidate.as_bytes()),
                    Err(HashError::InvalidHashFormat)
                ),
                "`{candidate}` should fail with an invalid format"
            );
        }
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut candidate = RECORD.as_bytes().to_vec();
        candidate.push(0xff);
        assert!(!is_argon2id_record(&candidate));
    }

    #[test]
    fn test_non_canonical_trailing_bits_fail_decoding_only() {
        // "a2V5a2V5aw" is "keykeyk", "a2V5a2V5ax" leaves non-zero trailing bits
        let candidate = RECORD.replace(
            "YmFzZTY0IGVuY29kZWQga2V5IG1hdGVyaWFsIQ",
            "a2V5a2V5ax",
        );
        assert!(is_argon2id_record(candidate.as_bytes()));
        assert!(matches!(
            Argon2idRecord::decode(candidate.as_bytes()),
            Err(HashError::InvalidHashFormat)
        ));
    }
}
