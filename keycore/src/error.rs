use crate::{curve::CurveOption, options::Algorithm};
use derive_more::{Display, Error, From};

/// Rejections from the key codec and the identifier derivation.
///
/// None of these are worth retrying: they are deterministic functions of the input.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum KeyError {
    #[display(fmt = "expected {} key bytes for curve {}, received {}", expected, curve, actual)]
    InvalidLength {
        curve: CurveOption,
        expected: usize,
        actual: usize,
    },
    #[display(fmt = "private scalar is not smaller than the order of curve {}", _0)]
    ScalarOutOfRange(#[error(ignore)] CurveOption),
    #[display(fmt = "private scalar must be positive")]
    NonPositiveScalar,
    #[display(fmt = "private scalar does not yield a valid public point on curve {}", _0)]
    InvalidPublicDerivation(#[error(ignore)] CurveOption),
    #[display(fmt = "bytes are not an uncompressed point on curve {}", _0)]
    InvalidPoint(#[error(ignore)] CurveOption),
    #[display(fmt = "invalid RSA key: {}", _0)]
    InvalidRsaKey(#[error(ignore)] String),
    #[display(fmt = "key generation failed: {}", _0)]
    Generation(#[error(ignore)] String),
    #[display(fmt = "secret key material has been wiped")]
    KeyWiped,
    #[display(fmt = "key ID contains characters outside the base-58 alphabet")]
    InvalidEncoding,
    #[display(fmt = "expected a {} byte SKI, decoded {} bytes", expected, actual)]
    InvalidSkiLength { expected: usize, actual: usize },
}

/// Failures of the symmetric key guard.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum CipherError {
    #[display(fmt = "unsupported symmetric key size {} (expected 16, 24 or 32 bytes)", _0)]
    InvalidKeySize(#[error(ignore)] usize),
    #[display(fmt = "encrypted key too short: need at least {} bytes, got {}", expected, actual)]
    Truncated { expected: usize, actual: usize },
    #[display(fmt = "cannot draw a fresh IV: {}", _0)]
    RandomSource(#[error(ignore)] String),
}

/// Usage errors and malformed inputs of the signer/verifier.
///
/// An invalid signature is not an error: `verify` reports it as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SignError {
    #[display(fmt = "signing options are required")]
    MissingOptions,
    #[display(fmt = "options {} cannot be used with {} keys", options, algorithm)]
    UnsupportedOptions { algorithm: Algorithm, options: String },
    #[display(fmt = "digest must be {} bytes for {}, got {}", expected, hash, actual)]
    InvalidDigestLength {
        hash: String,
        expected: usize,
        actual: usize,
    },
    #[display(fmt = "malformed signature: {}", _0)]
    MalformedSignature(#[error(ignore)] String),
    #[display(fmt = "cannot sign with a wiped key")]
    KeyWiped,
    #[display(fmt = "signing failed: {}", _0)]
    Signing(#[error(ignore)] String),
}

/// Rejected [`KeyConfig`](crate::config::KeyConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigError {
    #[display(fmt = "RSA key size of {} bits is below the configurable minimum of {}", bits, min)]
    RsaBitsTooSmall { bits: usize, min: usize },
    #[display(fmt = "RSA key size of {} bits is not a whole number of bytes", _0)]
    RsaBitsNotByteAligned(#[error(ignore)] usize),
}

/// Umbrella error for operations that span several components.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum Error {
    Key(KeyError),
    Cipher(CipherError),
    Sign(SignError),
    Config(ConfigError),
}
