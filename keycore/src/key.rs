use crate::{
    fingerprint::{compute_ski, KeyId, Ski},
    options::Algorithm,
    private::{EcPrivateKey, RsaPrivateKey},
    public::{EcPublicKey, RsaPublicKey},
};
use derive_more::From;

/// Capabilities shared by every kind of key.
pub trait Key {
    fn algorithm(&self) -> Algorithm;

    /// Canonical public bytes the identifier is derived from: the uncompressed point for EC keys,
    /// the PKCS#1 `RSAPublicKey` DER for RSA keys. Both halves of a pair yield the same bytes.
    fn fingerprint_bytes(&self) -> Vec<u8>;

    /// The public half; for a public key this is a copy of itself.
    fn public_key(&self) -> PublicKey;

    fn ski(&self) -> Ski {
        compute_ski(&self.fingerprint_bytes())
    }

    fn key_id(&self) -> KeyId {
        self.ski().to_key_id()
    }
}

/// A private key of any supported algorithm.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum PrivateKey {
    Ec(EcPrivateKey),
    Rsa(RsaPrivateKey),
}

impl PrivateKey {
    /// Destroy the secret material in place, see [`EcPrivateKey::wipe`].
    pub fn wipe(&mut self) {
        match self {
            PrivateKey::Ec(k) => k.wipe(),
            PrivateKey::Rsa(k) => k.wipe(),
        }
    }

    pub fn is_wiped(&self) -> bool {
        match self {
            PrivateKey::Ec(k) => k.is_wiped(),
            PrivateKey::Rsa(k) => k.is_wiped(),
        }
    }
}

impl Key for PrivateKey {
    fn algorithm(&self) -> Algorithm {
        match self {
            PrivateKey::Ec(k) => k.algorithm(),
            PrivateKey::Rsa(k) => k.algorithm(),
        }
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        match self {
            PrivateKey::Ec(k) => k.fingerprint_bytes(),
            PrivateKey::Rsa(k) => k.fingerprint_bytes(),
        }
    }

    fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Ec(k) => k.public_key(),
            PrivateKey::Rsa(k) => k.public_key(),
        }
    }
}

/// A public key of any supported algorithm.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum PublicKey {
    Ec(EcPublicKey),
    Rsa(RsaPublicKey),
}

impl Key for PublicKey {
    fn algorithm(&self) -> Algorithm {
        match self {
            PublicKey::Ec(k) => k.algorithm(),
            PublicKey::Rsa(k) => k.algorithm(),
        }
    }

    fn fingerprint_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Ec(k) => k.fingerprint_bytes(),
            PublicKey::Rsa(k) => k.fingerprint_bytes(),
        }
    }

    fn public_key(&self) -> PublicKey {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveOption;

    #[test]
    fn private_and_public_share_identifier() {
        let private: PrivateKey = EcPrivateKey::generate(CurveOption::P256).unwrap().into();
        let public = private.public_key();
        assert_eq!(private.algorithm(), Algorithm::Ecdsa);
        assert_eq!(public.algorithm(), Algorithm::Ecdsa);
        assert_eq!(private.ski(), public.ski());
        assert_eq!(private.key_id(), public.key_id());
        assert_eq!(public.public_key(), public);
    }

    #[test]
    fn distinct_keys_distinct_identifiers() {
        let a = EcPrivateKey::generate(CurveOption::P256).unwrap();
        let b = EcPrivateKey::generate(CurveOption::P256).unwrap();
        assert_ne!(a.ski(), b.ski());
    }

    #[test]
    fn wipe_keeps_identifier() {
        let mut private: PrivateKey = EcPrivateKey::generate(CurveOption::P384).unwrap().into();
        let ski = private.ski();
        assert!(!private.is_wiped());
        private.wipe();
        assert!(private.is_wiped());
        assert_eq!(private.ski(), ski);
    }
}
