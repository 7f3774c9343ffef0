//! Signing and verification of pre-computed digests.
//!
//! Both operations are stateless and dispatch on the key's algorithm; the options must be given
//! and must belong to the same algorithm family as the key. The digest is used as is, the caller
//! is responsible for hashing the message with the hash function named in the options.
//!
//! ECDSA signatures are ASN.1 DER encoded `(r, s)` pairs with RFC 6979 nonces, RSA signatures are
//! the raw big-endian signature of modulus length.

use crate::{
    curve::CurveOption,
    error::{KeyError, SignError},
    key::{Key, PrivateKey, PublicKey},
    options::{Algorithm, HashAlgorithm, SaltLength, SignOptions, VerifyOptions},
    private::{EcPrivateKey, EcSecret, RsaPrivateKey},
    public::{EcPoint, EcPublicKey, RsaPublicKey},
};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, Pss};
use sha2::{Sha256, Sha384, Sha512};
use tracing::{debug, trace};

impl From<KeyError> for SignError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::KeyWiped => SignError::KeyWiped,
            e => SignError::Signing(e.to_string()),
        }
    }
}

fn unsupported(algorithm: Algorithm, options: SignOptions) -> SignError {
    SignError::UnsupportedOptions {
        algorithm,
        options: options.to_string(),
    }
}

fn require(options: Option<&SignOptions>, key: &impl Key) -> Result<SignOptions, SignError> {
    let options = *options.ok_or(SignError::MissingOptions)?;
    if options.algorithm() != key.algorithm() {
        return Err(unsupported(key.algorithm(), options));
    }
    Ok(options)
}

/// ECDSA refuses digests shorter than half the field size of the curve.
fn check_curve_hash(curve: CurveOption, options: SignOptions) -> Result<(), SignError> {
    if options.hash().output_len() < curve.field_len() / 2 {
        return Err(unsupported(Algorithm::Ecdsa, options));
    }
    Ok(())
}

fn check_digest(digest: &[u8], hash: HashAlgorithm) -> Result<(), SignError> {
    if digest.len() != hash.output_len() {
        return Err(SignError::InvalidDigestLength {
            hash: hash.to_string(),
            expected: hash.output_len(),
            actual: digest.len(),
        });
    }
    Ok(())
}

/// Sign `digest` with `key`.
///
/// Fails with [`SignError::MissingOptions`] without options and with
/// [`SignError::UnsupportedOptions`] if they belong to the other algorithm family or name a hash
/// too short for the curve.
pub fn sign(key: &PrivateKey, digest: &[u8], options: Option<&SignOptions>) -> Result<Vec<u8>, SignError> {
    match key {
        PrivateKey::Ec(k) => sign_ec(k, digest, options),
        PrivateKey::Rsa(k) => sign_rsa(k, digest, options),
    }
}

/// Verify `signature` over `digest` against `key`.
///
/// A signature that does not verify is `Ok(false)`. Errors are reserved for calling this wrong
/// (missing or mismatched options, digest of the wrong length) and for signatures that cannot even
/// be parsed.
pub fn verify(
    key: &PublicKey,
    signature: &[u8],
    digest: &[u8],
    options: Option<&VerifyOptions>,
) -> Result<bool, SignError> {
    match key {
        PublicKey::Ec(k) => verify_ec(k, signature, digest, options),
        PublicKey::Rsa(k) => verify_rsa(k, signature, digest, options),
    }
}

pub fn sign_ec(key: &EcPrivateKey, digest: &[u8], options: Option<&SignOptions>) -> Result<Vec<u8>, SignError> {
    let options = require(options, key)?;
    check_curve_hash(key.curve(), options)?;
    check_digest(digest, options.hash())?;
    let signing_error = |e: p256::ecdsa::Error| SignError::Signing(e.to_string());
    let der = match key.secret()? {
        EcSecret::P256(s) => {
            let signer = p256::ecdsa::SigningKey::from(s);
            let signature: p256::ecdsa::Signature = signer.sign_prehash(digest).map_err(signing_error)?;
            signature.to_der().as_bytes().to_vec()
        }
        EcSecret::P384(s) => {
            let signer = p384::ecdsa::SigningKey::from(s);
            let signature: p384::ecdsa::Signature = signer.sign_prehash(digest).map_err(signing_error)?;
            signature.to_der().as_bytes().to_vec()
        }
        EcSecret::P521(s) => {
            let signer = p521::ecdsa::SigningKey::from_bytes(&s.to_bytes()).map_err(signing_error)?;
            let signature: p521::ecdsa::Signature = signer.sign_prehash(digest).map_err(signing_error)?;
            signature.to_der().as_bytes().to_vec()
        }
    };
    debug!(curve = %key.curve(), %options, key_id = %key.key_id(), "signed digest");
    Ok(der)
}

pub fn verify_ec(
    key: &EcPublicKey,
    signature: &[u8],
    digest: &[u8],
    options: Option<&VerifyOptions>,
) -> Result<bool, SignError> {
    let options = require(options, key)?;
    check_curve_hash(key.curve(), options)?;
    check_digest(digest, options.hash())?;
    let malformed = |e: p256::ecdsa::Error| SignError::MalformedSignature(e.to_string());
    let valid = match &key.point {
        EcPoint::P256(p) => {
            let signature = p256::ecdsa::Signature::from_der(signature).map_err(malformed)?;
            p256::ecdsa::VerifyingKey::from(p)
                .verify_prehash(digest, &signature)
                .is_ok()
        }
        EcPoint::P384(p) => {
            let signature = p384::ecdsa::Signature::from_der(signature).map_err(malformed)?;
            p384::ecdsa::VerifyingKey::from(p)
                .verify_prehash(digest, &signature)
                .is_ok()
        }
        EcPoint::P521(p) => {
            let signature = p521::ecdsa::Signature::from_der(signature).map_err(malformed)?;
            p521::ecdsa::VerifyingKey::from_affine(*p.as_affine())
                .map_err(malformed)?
                .verify_prehash(digest, &signature)
                .is_ok()
        }
    };
    trace!(curve = %key.curve(), %options, valid, "verified ECDSA signature");
    Ok(valid)
}

fn pss(hash: HashAlgorithm, salt: SaltLength) -> Pss {
    match (hash, salt) {
        (HashAlgorithm::Sha256, SaltLength::EqualsHash) => Pss::new::<Sha256>(),
        (HashAlgorithm::Sha384, SaltLength::EqualsHash) => Pss::new::<Sha384>(),
        (HashAlgorithm::Sha512, SaltLength::EqualsHash) => Pss::new::<Sha512>(),
        (HashAlgorithm::Sha256, SaltLength::Fixed(len)) => Pss::new_with_salt::<Sha256>(len),
        (HashAlgorithm::Sha384, SaltLength::Fixed(len)) => Pss::new_with_salt::<Sha384>(len),
        (HashAlgorithm::Sha512, SaltLength::Fixed(len)) => Pss::new_with_salt::<Sha512>(len),
    }
}

fn pkcs1v15(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
    }
}

pub fn sign_rsa(key: &RsaPrivateKey, digest: &[u8], options: Option<&SignOptions>) -> Result<Vec<u8>, SignError> {
    let options = require(options, key)?;
    check_digest(digest, options.hash())?;
    let private = key.private()?;
    let signature = match options {
        SignOptions::RsaPss { hash, salt } => private.sign_with_rng(&mut OsRng, pss(hash, salt), digest),
        SignOptions::RsaPkcs1v15 { hash } => private.sign_with_rng(&mut OsRng, pkcs1v15(hash), digest),
        SignOptions::Ecdsa { .. } => return Err(unsupported(Algorithm::Rsa, options)),
    }
    .map_err(|e| SignError::Signing(e.to_string()))?;
    debug!(bits = key.bits(), %options, key_id = %key.key_id(), "signed digest");
    Ok(signature)
}

pub fn verify_rsa(
    key: &RsaPublicKey,
    signature: &[u8],
    digest: &[u8],
    options: Option<&VerifyOptions>,
) -> Result<bool, SignError> {
    let options = require(options, key)?;
    check_digest(digest, options.hash())?;
    if signature.len() != key.signature_len() {
        return Err(SignError::MalformedSignature(format!(
            "expected {} signature bytes, got {}",
            key.signature_len(),
            signature.len()
        )));
    }
    let result = match options {
        SignOptions::RsaPss { hash, salt } => key.key.verify(pss(hash, salt), digest, signature),
        SignOptions::RsaPkcs1v15 { hash } => key.key.verify(pkcs1v15(hash), digest, signature),
        SignOptions::Ecdsa { .. } => return Err(unsupported(Algorithm::Rsa, options)),
    };
    let valid = result.is_ok();
    trace!(bits = key.bits(), %options, valid, "verified RSA signature");
    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::private::MIN_RSA_BITS;

    fn ecdsa_options(curve: CurveOption) -> SignOptions {
        let hash = match curve {
            CurveOption::P256 => HashAlgorithm::Sha256,
            CurveOption::P384 => HashAlgorithm::Sha384,
            CurveOption::P521 => HashAlgorithm::Sha512,
        };
        SignOptions::Ecdsa { hash }
    }

    #[test]
    fn ecdsa_sign_and_verify() {
        for curve in CurveOption::ALL {
            let options = ecdsa_options(curve);
            let digest = options.hash().digest(b"hello world!");
            let key: PrivateKey = EcPrivateKey::generate(curve).unwrap().into();
            let other: PrivateKey = EcPrivateKey::generate(curve).unwrap().into();

            let signature = sign(&key, &digest, Some(&options)).unwrap();
            assert!(verify(&key.public_key(), &signature, &digest, Some(&options)).unwrap());
            assert!(!verify(&other.public_key(), &signature, &digest, Some(&options)).unwrap());

            let tampered = options.hash().digest(b"hello world?");
            assert!(!verify(&key.public_key(), &signature, &tampered, Some(&options)).unwrap());
        }
    }

    #[test]
    fn ecdsa_is_deterministic() {
        let options = ecdsa_options(CurveOption::P256);
        let digest = options.hash().digest(b"rfc6979");
        let key: PrivateKey = EcPrivateKey::generate(CurveOption::P256).unwrap().into();
        assert_eq!(
            sign(&key, &digest, Some(&options)).unwrap(),
            sign(&key, &digest, Some(&options)).unwrap()
        );
    }

    #[test]
    fn options_are_required_and_must_match() {
        let ec: PrivateKey = EcPrivateKey::generate(CurveOption::P256).unwrap().into();
        let digest = HashAlgorithm::Sha256.digest(b"x");
        assert_eq!(sign(&ec, &digest, None).unwrap_err(), SignError::MissingOptions);
        assert_eq!(
            verify(&ec.public_key(), &[0u8; 8], &digest, None).unwrap_err(),
            SignError::MissingOptions
        );
        let pss = SignOptions::RsaPss {
            hash: HashAlgorithm::Sha256,
            salt: SaltLength::EqualsHash,
        };
        assert_eq!(
            sign(&ec, &digest, Some(&pss)).unwrap_err(),
            SignError::UnsupportedOptions {
                algorithm: Algorithm::Ecdsa,
                options: "RSA-PSS/SHA-256/salt=hash".to_owned()
            }
        );
    }

    #[test]
    fn digest_length_must_match_hash() {
        let key: PrivateKey = EcPrivateKey::generate(CurveOption::P256).unwrap().into();
        let options = ecdsa_options(CurveOption::P256);
        assert!(matches!(
            sign(&key, b"too short", Some(&options)),
            Err(SignError::InvalidDigestLength {
                expected: 32,
                actual: 9,
                ..
            })
        ));
    }

    #[test]
    fn hash_too_short_for_curve_is_rejected() {
        let key: PrivateKey = EcPrivateKey::generate(CurveOption::P521).unwrap().into();
        let short = SignOptions::Ecdsa {
            hash: HashAlgorithm::Sha256,
        };
        let digest = short.hash().digest(b"x");
        let expected = SignError::UnsupportedOptions {
            algorithm: Algorithm::Ecdsa,
            options: "ECDSA/SHA-256".to_owned(),
        };
        assert_eq!(sign(&key, &digest, Some(&short)).unwrap_err(), expected);

        let long = ecdsa_options(CurveOption::P521);
        let long_digest = long.hash().digest(b"x");
        let signature = sign(&key, &long_digest, Some(&long)).unwrap();
        assert_eq!(
            verify(&key.public_key(), &signature, &digest, Some(&short)).unwrap_err(),
            expected
        );

        // half the P-384 field is 24 bytes, so SHA-256 is still fine there
        let p384: PrivateKey = EcPrivateKey::generate(CurveOption::P384).unwrap().into();
        let signature = sign(&p384, &digest, Some(&short)).unwrap();
        assert!(verify(&p384.public_key(), &signature, &digest, Some(&short)).unwrap());
    }

    #[test]
    fn malformed_signature_is_an_error() {
        let key: PrivateKey = EcPrivateKey::generate(CurveOption::P384).unwrap().into();
        let options = ecdsa_options(CurveOption::P384);
        let digest = options.hash().digest(b"x");
        assert!(matches!(
            verify(&key.public_key(), b"definitely not DER", &digest, Some(&options)),
            Err(SignError::MalformedSignature(_))
        ));
    }

    #[test]
    fn wiped_key_cannot_sign() {
        let mut key: PrivateKey = EcPrivateKey::generate(CurveOption::P256).unwrap().into();
        let options = ecdsa_options(CurveOption::P256);
        let digest = options.hash().digest(b"x");
        key.wipe();
        assert_eq!(sign(&key, &digest, Some(&options)).unwrap_err(), SignError::KeyWiped);
    }

    #[test]
    fn rsa_sign_and_verify() {
        let key: PrivateKey = RsaPrivateKey::generate(MIN_RSA_BITS).unwrap().into();
        let other: PrivateKey = RsaPrivateKey::generate(MIN_RSA_BITS).unwrap().into();
        let all = [
            SignOptions::RsaPss {
                hash: HashAlgorithm::Sha256,
                salt: SaltLength::EqualsHash,
            },
            SignOptions::RsaPss {
                hash: HashAlgorithm::Sha512,
                salt: SaltLength::Fixed(20),
            },
            SignOptions::RsaPkcs1v15 {
                hash: HashAlgorithm::Sha384,
            },
        ];
        for options in all {
            let digest = options.hash().digest(b"hello world!");
            let signature = sign(&key, &digest, Some(&options)).unwrap();
            assert_eq!(signature.len(), MIN_RSA_BITS / 8);
            assert!(verify(&key.public_key(), &signature, &digest, Some(&options)).unwrap());
            assert!(!verify(&other.public_key(), &signature, &digest, Some(&options)).unwrap());

            let mut broken = signature.clone();
            broken[10] ^= 0x55;
            assert!(!verify(&key.public_key(), &broken, &digest, Some(&options)).unwrap());
        }
    }

    #[test]
    fn rsa_pkcs1v15_is_deterministic_with_blinding() {
        let key: PrivateKey = RsaPrivateKey::generate(MIN_RSA_BITS).unwrap().into();
        let options = SignOptions::RsaPkcs1v15 {
            hash: HashAlgorithm::Sha256,
        };
        let digest = options.hash().digest(b"blinded");
        let a = sign(&key, &digest, Some(&options)).unwrap();
        let b = sign(&key, &digest, Some(&options)).unwrap();
        assert_eq!(a, b);
        assert!(verify(&key.public_key(), &a, &digest, Some(&options)).unwrap());
    }

    #[test]
    fn rsa_rejects_ecdsa_options_and_short_signatures() {
        let key: PrivateKey = RsaPrivateKey::generate(MIN_RSA_BITS).unwrap().into();
        let digest = HashAlgorithm::Sha256.digest(b"x");
        let ecdsa = SignOptions::Ecdsa {
            hash: HashAlgorithm::Sha256,
        };
        assert!(matches!(
            sign(&key, &digest, Some(&ecdsa)),
            Err(SignError::UnsupportedOptions {
                algorithm: Algorithm::Rsa,
                ..
            })
        ));
        let pkcs = SignOptions::RsaPkcs1v15 {
            hash: HashAlgorithm::Sha256,
        };
        assert!(matches!(
            verify(&key.public_key(), &[1u8; 16], &digest, Some(&pkcs)),
            Err(SignError::MalformedSignature(_))
        ));
    }
}
