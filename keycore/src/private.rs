use crate::{
    curve::CurveOption,
    error::KeyError,
    key::{Key, PublicKey},
    options::Algorithm,
    public::{EcPoint, EcPublicKey, RsaPublicKey},
};
use elliptic_curve::{ff::PrimeField, group::Group, CurveArithmetic, FieldBytes, NonZeroScalar, SecretKey};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use std::fmt::{self, Debug};
use tracing::{debug, trace};
use zeroize::Zeroizing;

/// Upper bound for drawing a candidate scalar; any sane random source succeeds on the first try.
const MAX_GENERATION_ATTEMPTS: usize = 64;

pub const MIN_RSA_BITS: usize = 1024;

#[derive(Clone, PartialEq, Eq)]
pub(crate) enum EcSecret {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

impl EcSecret {
    fn decode(bytes: &[u8], curve: CurveOption) -> Result<Self, KeyError> {
        Ok(match curve {
            CurveOption::P256 => EcSecret::P256(decode_scalar(bytes, curve)?),
            CurveOption::P384 => EcSecret::P384(decode_scalar(bytes, curve)?),
            CurveOption::P521 => EcSecret::P521(decode_scalar(bytes, curve)?),
        })
    }

    fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match self {
            EcSecret::P256(s) => s.to_bytes().to_vec(),
            EcSecret::P384(s) => s.to_bytes().to_vec(),
            EcSecret::P521(s) => s.to_bytes().to_vec(),
        })
    }

    fn public(&self) -> EcPublicKey {
        let point = match self {
            EcSecret::P256(s) => EcPoint::P256(s.public_key()),
            EcSecret::P384(s) => EcPoint::P384(s.public_key()),
            EcSecret::P521(s) => EcPoint::P521(s.public_key()),
        };
        EcPublicKey { point }
    }
}

/// Turn big-endian scalar bytes into a secret key, checking in this order and stopping at the
/// first failure:
///
///  1. the length equals the field length of the curve
///  2. the scalar is smaller than the group order N
///  3. the scalar is not zero
///  4. the scalar times the base point is not the point at infinity
fn decode_scalar<C: CurveArithmetic>(bytes: &[u8], curve: CurveOption) -> Result<SecretKey<C>, KeyError> {
    let mut repr = FieldBytes::<C>::default();
    if bytes.len() != repr.len() {
        return Err(KeyError::InvalidLength {
            curve,
            expected: repr.len(),
            actual: bytes.len(),
        });
    }
    repr.copy_from_slice(bytes);
    let scalar = Option::<C::Scalar>::from(<C::Scalar as PrimeField>::from_repr(repr))
        .ok_or(KeyError::ScalarOutOfRange(curve))?;
    let scalar = Option::<NonZeroScalar<C>>::from(NonZeroScalar::new(scalar)).ok_or(KeyError::NonPositiveScalar)?;
    let public = <C::ProjectivePoint as Group>::generator() * *scalar;
    if bool::from(public.is_identity()) {
        return Err(KeyError::InvalidPublicDerivation(curve));
    }
    Ok(SecretKey::from(scalar))
}

/// An elliptic curve private key.
///
/// The key exclusively owns its scalar. [`wipe`](EcPrivateKey::wipe) destroys the scalar in
/// place and leaves the key in a terminal state where only the public half remains usable.
/// Since wiping needs `&mut self`, it cannot race with signing on the same key object.
#[derive(Clone, PartialEq, Eq)]
pub struct EcPrivateKey {
    curve: CurveOption,
    // boxed so the scalar never moves and dropping it zeroizes the only copy
    secret: Option<Box<EcSecret>>,
    public: EcPublicKey,
}

impl EcPrivateKey {
    /// Generate a fresh key pair from the operating system's random source.
    pub fn generate(curve: CurveOption) -> Result<Self, KeyError> {
        Self::generate_with_rng(curve, &mut OsRng)
    }

    /// Generate a fresh key pair, drawing the scalar from `rng`.
    ///
    /// Candidates go through the same validation as [`from_bytes`](EcPrivateKey::from_bytes),
    /// out of range candidates are drawn again.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(curve: CurveOption, rng: &mut R) -> Result<Self, KeyError> {
        let mut candidate = Zeroizing::new(vec![0u8; curve.field_len()]);
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            rng.try_fill_bytes(&mut candidate[..])
                .map_err(|e| KeyError::Generation(e.to_string()))?;
            candidate[0] &= curve.top_byte_mask();
            match EcSecret::decode(&candidate, curve) {
                Ok(secret) => {
                    let key = Self::from_secret(curve, secret);
                    debug!(%curve, key_id = %key.key_id(), "generated EC key");
                    return Ok(key);
                }
                Err(KeyError::ScalarOutOfRange(_)) | Err(KeyError::NonPositiveScalar) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(KeyError::Generation(format!(
            "random source produced no valid {} scalar in {} attempts",
            curve, MAX_GENERATION_ATTEMPTS
        )))
    }

    fn from_secret(curve: CurveOption, secret: EcSecret) -> Self {
        let public = secret.public();
        Self {
            curve,
            secret: Some(Box::new(secret)),
            public,
        }
    }

    /// Decode a big-endian private scalar of exactly `curve.field_len()` bytes.
    pub fn from_bytes(bytes: &[u8], curve: CurveOption) -> Result<Self, KeyError> {
        let secret = EcSecret::decode(bytes, curve).map_err(|e| {
            trace!(%curve, reason = %e, "rejecting private key bytes");
            e
        })?;
        Ok(Self::from_secret(curve, secret))
    }

    /// The private scalar as big-endian bytes, zero-filled to the field length of the curve.
    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        self.secret().map(|s| s.to_bytes())
    }

    pub fn curve(&self) -> CurveOption {
        self.curve
    }

    pub fn public(&self) -> EcPublicKey {
        self.public.clone()
    }

    /// Destroy the scalar in place.
    ///
    /// Afterwards signing and encoding fail with [`KeyError::KeyWiped`]; the public half and thus
    /// the SKI stay available. Wiping twice is a no-op.
    pub fn wipe(&mut self) {
        if self.secret.take().is_some() {
            debug!(curve = %self.curve, key_id = %self.key_id(), "wiped EC private key");
        }
    }

    pub fn is_wiped(&self) -> bool {
        self.secret.is_none()
    }

    pub(crate) fn secret(&self) -> Result<&EcSecret, KeyError> {
        self.secret.as_deref().ok_or(KeyError::KeyWiped)
    }
}

impl Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("curve", &self.curve)
            .field("key_id", &self.key_id())
            .field("wiped", &self.is_wiped())
            .finish()
    }
}

impl Key for EcPrivateKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ecdsa
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        self.public.to_bytes()
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Ec(self.public.clone())
    }
}

/// An RSA private key, encoded as PKCS#1 `RSAPrivateKey` DER.
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    private: Option<rsa::RsaPrivateKey>,
    public: RsaPublicKey,
}

impl RsaPrivateKey {
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        Self::generate_with_rng(bits, &mut OsRng)
    }

    pub fn generate_with_rng<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<Self, KeyError> {
        if bits < MIN_RSA_BITS {
            return Err(KeyError::Generation(format!(
                "RSA keys need at least {} bits, requested {}",
                MIN_RSA_BITS, bits
            )));
        }
        let private = rsa::RsaPrivateKey::new(rng, bits).map_err(|e| KeyError::Generation(e.to_string()))?;
        let key = Self::from_inner(private)?;
        debug!(bits, key_id = %key.key_id(), "generated RSA key");
        Ok(key)
    }

    fn from_inner(private: rsa::RsaPrivateKey) -> Result<Self, KeyError> {
        let public = RsaPublicKey::new(private.to_public_key())?;
        Ok(Self {
            private: Some(private),
            public,
        })
    }

    /// Decode and validate a PKCS#1 `RSAPrivateKey` DER structure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let private = rsa::RsaPrivateKey::from_pkcs1_der(bytes).map_err(|e| KeyError::InvalidRsaKey(e.to_string()))?;
        private.validate().map_err(|e| KeyError::InvalidRsaKey(e.to_string()))?;
        Self::from_inner(private)
    }

    pub fn to_bytes(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        let der = self
            .private()?
            .to_pkcs1_der()
            .map_err(|e| KeyError::InvalidRsaKey(e.to_string()))?;
        Ok(Zeroizing::new(der.as_bytes().to_vec()))
    }

    pub fn bits(&self) -> usize {
        self.public.bits()
    }

    pub fn public(&self) -> RsaPublicKey {
        self.public.clone()
    }

    /// Destroy the private exponent and primes, see [`EcPrivateKey::wipe`].
    pub fn wipe(&mut self) {
        if self.private.take().is_some() {
            debug!(key_id = %self.key_id(), "wiped RSA private key");
        }
    }

    pub fn is_wiped(&self) -> bool {
        self.private.is_none()
    }

    pub(crate) fn private(&self) -> Result<&rsa::RsaPrivateKey, KeyError> {
        self.private.as_ref().ok_or(KeyError::KeyWiped)
    }
}

impl Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("bits", &self.bits())
            .field("key_id", &self.key_id())
            .field("wiped", &self.is_wiped())
            .finish()
    }
}

impl Key for RsaPrivateKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        self.public.to_bytes()
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Rsa(self.public.clone())
    }
}

/// Generate a fresh EC key pair on `curve`.
pub fn generate(curve: CurveOption) -> Result<EcPrivateKey, KeyError> {
    EcPrivateKey::generate(curve)
}

pub fn encode_private(key: &EcPrivateKey) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    key.to_bytes()
}

pub fn decode_private(bytes: &[u8], curve: CurveOption) -> Result<EcPrivateKey, KeyError> {
    EcPrivateKey::from_bytes(bytes, curve)
}

pub fn wipe(key: &mut EcPrivateKey) {
    key.wipe()
}
