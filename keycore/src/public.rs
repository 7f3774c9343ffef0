use crate::{
    curve::CurveOption,
    error::KeyError,
    fingerprint::{compute_ski, Ski},
    key::{Key, PublicKey},
    options::Algorithm,
};
use elliptic_curve::sec1::ToEncodedPoint;
use rsa::{
    pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey},
    traits::PublicKeyParts,
};
use std::fmt::{self, Debug};

/// SEC1 tag byte of an uncompressed point
const UNCOMPRESSED: u8 = 0x04;

#[derive(Clone, PartialEq, Eq)]
pub(crate) enum EcPoint {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

/// An elliptic curve public key.
///
/// Holds only the public point; it can be freely copied around and carries no confidentiality
/// obligation.
#[derive(Clone, PartialEq, Eq)]
pub struct EcPublicKey {
    pub(crate) point: EcPoint,
}

impl EcPublicKey {
    pub fn curve(&self) -> CurveOption {
        match self.point {
            EcPoint::P256(_) => CurveOption::P256,
            EcPoint::P384(_) => CurveOption::P384,
            EcPoint::P521(_) => CurveOption::P521,
        }
    }

    /// Uncompressed SEC1 encoding: `0x04 || X || Y`, both coordinates zero-padded to the field length.
    pub fn to_bytes(&self) -> Vec<u8> {
        match &self.point {
            EcPoint::P256(p) => p.to_encoded_point(false).as_bytes().to_vec(),
            EcPoint::P384(p) => p.to_encoded_point(false).as_bytes().to_vec(),
            EcPoint::P521(p) => p.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Parse an uncompressed point, checking that it lies on `curve`.
    ///
    /// Compressed and identity encodings are rejected, only the canonical form is accepted.
    pub fn from_bytes(bytes: &[u8], curve: CurveOption) -> Result<Self, KeyError> {
        if bytes.len() != curve.public_len() || bytes[0] != UNCOMPRESSED {
            tracing::trace!(%curve, len = bytes.len(), "rejecting non-canonical point encoding");
            return Err(KeyError::InvalidPoint(curve));
        }
        let point = match curve {
            CurveOption::P256 => p256::PublicKey::from_sec1_bytes(bytes).map(EcPoint::P256),
            CurveOption::P384 => p384::PublicKey::from_sec1_bytes(bytes).map(EcPoint::P384),
            CurveOption::P521 => p521::PublicKey::from_sec1_bytes(bytes).map(EcPoint::P521),
        }
        .map_err(|_| KeyError::InvalidPoint(curve))?;
        Ok(Self { point })
    }
}

impl Debug for EcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPublicKey")
            .field("curve", &self.curve())
            .field("key_id", &self.key_id())
            .finish()
    }
}

impl Key for EcPublicKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ecdsa
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Ec(self.clone())
    }
}

/// An RSA public key.
///
/// The PKCS#1 `RSAPublicKey` DER encoding (modulus and public exponent) is produced once on
/// construction; it is both the canonical byte form and the fingerprint input.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub(crate) key: rsa::RsaPublicKey,
    der: Vec<u8>,
}

impl RsaPublicKey {
    pub(crate) fn new(key: rsa::RsaPublicKey) -> Result<Self, KeyError> {
        let der = key
            .to_pkcs1_der()
            .map_err(|e| KeyError::InvalidRsaKey(e.to_string()))?
            .into_vec();
        Ok(Self { key, der })
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.n().bits()
    }

    /// Size of a signature made with the matching private key, in bytes.
    pub fn signature_len(&self) -> usize {
        self.key.size()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.der.clone()
    }

    /// Parse a PKCS#1 `RSAPublicKey` DER structure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = rsa::RsaPublicKey::from_pkcs1_der(bytes).map_err(|e| KeyError::InvalidRsaKey(e.to_string()))?;
        Self::new(key)
    }
}

impl Debug for RsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPublicKey")
            .field("bits", &self.bits())
            .field("key_id", &self.key_id())
            .finish()
    }
}

impl Key for RsaPublicKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        self.der.clone()
    }

    fn ski(&self) -> Ski {
        compute_ski(&self.der)
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Rsa(self.clone())
    }
}

/// Canonical uncompressed encoding of an EC public key.
pub fn encode_public(key: &EcPublicKey) -> Vec<u8> {
    key.to_bytes()
}

pub fn decode_public(bytes: &[u8], curve: CurveOption) -> Result<EcPublicKey, KeyError> {
    EcPublicKey::from_bytes(bytes, curve)
}
