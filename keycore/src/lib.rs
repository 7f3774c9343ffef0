//! Key lifecycle primitives for ECDSA (P-256, P-384, P-521) and RSA keys
//!
//! The crate covers generation, canonical byte codecs, SHA-256 based identification, at-rest
//! protection of private key bytes with AES-CTR, and signing/verification of pre-computed digests.
//! Storage, certificates and PEM/PKCS#8 containers are left to callers.
//!
//! # Assumptions
//!
//! ## Identification by SHA256
//!
//! Keys are identified by the SHA256 hash of their canonical public encoding (the SKI), shown to
//! humans and used in maps as its base-58 rendering (the key ID). Hash collisions would break the
//! code, e.g. by overwriting entries in maps.
//!
//! The private half of a key pair reports the identifier of its public half, so either can be
//! used to look up the other.
//!
//! ## Handling of key material
//!
//! Secret scalars live in types that zero their memory when dropped. Byte copies handed out by the
//! codecs are wrapped in [`zeroize::Zeroizing`] for the same reason. A key can be wiped explicitly;
//! afterwards it keeps its public half and identifier but refuses every secret operation with
//! [`KeyError::KeyWiped`] resp. [`SignError::KeyWiped`].
//!
//! # Signatures
//!
//! ECDSA signatures are ASN.1 DER encoded and deterministic (RFC 6979). RSA signatures use either
//! PSS or PKCS#1 v1.5 padding and are exactly as long as the modulus. Neither algorithm has a
//! default: the caller always names the padding and hash via [`SignOptions`].

mod config;
mod curve;
mod error;
mod fingerprint;
mod guard;
mod key;
mod options;
mod private;
mod public;
mod signer;

pub use config::{KeyConfig, MIN_CONFIG_RSA_BITS};
pub use curve::{CurveOption, UnknownCurve};
pub use error::{CipherError, ConfigError, Error, KeyError, SignError};
pub use fingerprint::{compute_ski, key_id_from_ski, ski_from_key_id, KeyId, Ski, SKI_LENGTH};
pub use guard::{
    decrypt_private_key, encrypt_private_key, protect, protect_with_rng, unprotect, EncryptedKey, BLOCK_LEN,
};
pub use key::{Key, PrivateKey, PublicKey};
pub use options::{Algorithm, HashAlgorithm, SaltLength, SignOptions, VerifyOptions};
pub use private::{decode_private, encode_private, generate, wipe, EcPrivateKey, RsaPrivateKey, MIN_RSA_BITS};
pub use public::{decode_public, encode_public, EcPublicKey, RsaPublicKey};
pub use signer::{sign, sign_ec, sign_rsa, verify, verify_ec, verify_rsa};
pub use zeroize::Zeroizing;
