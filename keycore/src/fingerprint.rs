//! Subject key identifiers and their textual form.
//!
//! The SKI is the SHA-256 digest of a key's canonical public bytes, so identical keys always
//! map to identical identifiers and other systems can use it as a lookup key. The key ID is the
//! plain base-58 (Bitcoin alphabet) rendering of the SKI without version byte or checksum; callers
//! that need integrity protection have to wrap it themselves.

use crate::error::KeyError;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

pub const SKI_LENGTH: usize = 32;

/// Subject Key Identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ski([u8; SKI_LENGTH]);

impl Ski {
    pub fn as_bytes(&self) -> &[u8; SKI_LENGTH] {
        &self.0
    }

    pub fn to_key_id(&self) -> KeyId {
        KeyId {
            text: bs58::encode(self.0).into_string(),
            ski: *self,
        }
    }

    pub fn from_key_id(key_id: &str) -> Result<Self, KeyError> {
        let bytes = bs58::decode(key_id).into_vec().map_err(|_| KeyError::InvalidEncoding)?;
        Self::try_from(&bytes[..])
    }
}

impl From<[u8; SKI_LENGTH]> for Ski {
    fn from(bytes: [u8; SKI_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Ski {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; SKI_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidSkiLength {
            expected: SKI_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Ski {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Ski {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for Ski {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ski({})", self.to_key_id())
    }
}

/// Textual, reversible form of an [`Ski`].
///
/// A `KeyId` can only be obtained from an SKI or by parsing, and parsing checks both the alphabet
/// and the decoded length, so every value converts back to an SKI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId {
    text: String,
    ski: Ski,
}

impl KeyId {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn to_ski(&self) -> Ski {
        self.ski
    }
}

impl From<Ski> for KeyId {
    fn from(ski: Ski) -> Self {
        ski.to_key_id()
    }
}

impl From<&KeyId> for Ski {
    fn from(key_id: &KeyId) -> Self {
        key_id.to_ski()
    }
}

impl FromStr for KeyId {
    type Err = KeyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ski::from_key_id(s).map(|ski| ski.to_key_id())
    }
}

impl Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Serialize for KeyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for KeyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = KeyId;
            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("base-58 key ID")
            }
            fn visit_str<E: serde::de::Error>(self, string: &str) -> Result<Self::Value, E> {
                KeyId::from_str(string).map_err(serde::de::Error::custom)
            }
        }
        deserializer.deserialize_str(V)
    }
}

/// SHA-256 over the canonical public bytes of a key.
pub fn compute_ski(canonical_public_bytes: &[u8]) -> Ski {
    Ski(Sha256::digest(canonical_public_bytes).into())
}

pub fn key_id_from_ski(ski: &Ski) -> KeyId {
    ski.to_key_id()
}

/// Decode a key ID, rejecting foreign characters and anything that is not exactly one SKI long.
pub fn ski_from_key_id(key_id: &str) -> Result<Ski, KeyError> {
    Ski::from_key_id(key_id)
}
