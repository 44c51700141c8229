//! Value serializers used by the typed facade.
//!
//! [`PostcardSerializer`] is the default. It wraps the postcard payload in a
//! small envelope so that stale or foreign bytes are rejected instead of being
//! decoded into garbage:
//!
//! ```text
//! [MAGIC: 4 bytes "RCKT"] [VERSION: u32 little-endian] [POSTCARD PAYLOAD]
//! ```
//!
//! Bump [`SCHEMA_VERSION`] whenever cached types change shape; old entries then
//! fail with `Error::VersionMismatch` and read as a miss through the facade's
//! `get_or_discard`.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Envelope magic.
pub const CACHE_MAGIC: [u8; 4] = *b"RCKT";

/// Current envelope schema version.
pub const SCHEMA_VERSION: u32 = 1;

const HEADER_LEN: usize = 8;

/// Turns values into stored bytes and back.
pub trait ValueSerializer: Send + Sync {
    /// # Errors
    /// `Error::SerializationError` if `value` cannot be encoded.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// # Errors
    /// `Error::DeserializationError`, `Error::InvalidCacheEntry` or
    /// `Error::VersionMismatch` for bytes this serializer did not produce.
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Postcard payload inside a versioned envelope.
#[derive(Clone, Copy, Debug)]
pub struct PostcardSerializer {
    version: u32,
}

impl Default for PostcardSerializer {
    fn default() -> Self {
        PostcardSerializer {
            version: SCHEMA_VERSION,
        }
    }
}

impl PostcardSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an application-specific schema version instead of [`SCHEMA_VERSION`].
    pub fn with_version(version: u32) -> Self {
        PostcardSerializer { version }
    }
}

impl ValueSerializer for PostcardSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let payload = postcard::to_allocvec(value)
            .map_err(|e| Error::SerializationError(e.to_string()))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&CACHE_MAGIC);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidCacheEntry(format!(
                "entry too short for envelope: {} bytes",
                bytes.len()
            )));
        }

        let (magic, rest) = bytes.split_at(4);
        if magic != CACHE_MAGIC {
            return Err(Error::InvalidCacheEntry(format!(
                "bad magic {:?}",
                magic
            )));
        }

        let (version, payload) = rest.split_at(4);
        let found = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
        if found != self.version {
            return Err(Error::VersionMismatch {
                expected: self.version,
                found,
            });
        }

        postcard::from_bytes(payload).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

/// Plain JSON, readable by other clients of the same store.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl ValueSerializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::SerializationError(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user_id: u64,
        roles: Vec<String>,
    }

    fn session() -> Session {
        Session {
            user_id: 42,
            roles: vec!["admin".to_string()],
        }
    }

    #[test]
    fn test_postcard_envelope_layout() {
        let bytes = PostcardSerializer::new()
            .serialize(&session())
            .expect("Failed to serialize");

        assert_eq!(&bytes[..4], b"RCKT");
        assert_eq!(&bytes[4..8], &SCHEMA_VERSION.to_le_bytes());

        let decoded: Session = PostcardSerializer::new()
            .deserialize(&bytes)
            .expect("Failed to deserialize");
        assert_eq!(decoded, session());
    }

    #[test]
    fn test_postcard_rejects_foreign_bytes() {
        let serializer = PostcardSerializer::new();

        let err = serializer.deserialize::<Session>(b"abc").unwrap_err();
        assert!(matches!(err, Error::InvalidCacheEntry(_)));

        let err = serializer
            .deserialize::<Session>(b"{\"user_id\":42}")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCacheEntry(_)));
    }

    #[test]
    fn test_postcard_version_mismatch() {
        let bytes = PostcardSerializer::with_version(1)
            .serialize(&session())
            .expect("Failed to serialize");

        let err = PostcardSerializer::with_version(2)
            .deserialize::<Session>(&bytes)
            .unwrap_err();
        assert_eq!(
            err,
            Error::VersionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_postcard_truncated_payload() {
        let mut bytes = PostcardSerializer::new()
            .serialize(&session())
            .expect("Failed to serialize");
        bytes.truncate(HEADER_LEN + 1);

        let err = PostcardSerializer::new()
            .deserialize::<Session>(&bytes)
            .unwrap_err();
        assert!(matches!(err, Error::DeserializationError(_)));
    }

    #[test]
    fn test_json_serializer() {
        let bytes = JsonSerializer.serialize(&session()).expect("serialize");
        assert_eq!(
            String::from_utf8(bytes.clone()).expect("utf8"),
            r#"{"user_id":42,"roles":["admin"]}"#
        );

        let decoded: Session = JsonSerializer.deserialize(&bytes).expect("deserialize");
        assert_eq!(decoded, session());

        let err = JsonSerializer.deserialize::<Session>(b"not json").unwrap_err();
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
