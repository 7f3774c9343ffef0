use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Key algorithm family, used for signer dispatch and in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
pub enum Algorithm {
    #[display(fmt = "ECDSA")]
    Ecdsa,
    #[display(fmt = "RSA")]
    Rsa,
}

/// The hash function the caller used to produce a digest.
///
/// The signer never hashes by itself, this only tells it which digest length to expect and
/// which algorithm identifier to embed where the padding scheme requires one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[display(fmt = "SHA-256")]
    Sha256,
    #[display(fmt = "SHA-384")]
    Sha384,
    #[display(fmt = "SHA-512")]
    Sha512,
}

impl HashAlgorithm {
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Convenience for callers that still need to produce the digest.
    pub fn digest(self, message: impl AsRef<[u8]>) -> Vec<u8> {
        use sha2::Digest;
        match self {
            HashAlgorithm::Sha256 => sha2::Sha256::digest(message).to_vec(),
            HashAlgorithm::Sha384 => sha2::Sha384::digest(message).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(message).to_vec(),
        }
    }
}

/// Salt length of an RSA-PSS signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SaltLength {
    /// As many salt bytes as the digest is long.
    #[display(fmt = "salt=hash")]
    EqualsHash,
    #[display(fmt = "salt={}", _0)]
    Fixed(usize),
}

/// Algorithm specific signing parameters.
///
/// They are always passed explicitly; there is no default to fall back on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SignOptions {
    #[display(fmt = "ECDSA/{}", hash)]
    Ecdsa { hash: HashAlgorithm },
    #[display(fmt = "RSA-PSS/{}/{}", hash, salt)]
    RsaPss { hash: HashAlgorithm, salt: SaltLength },
    #[display(fmt = "RSA-PKCS1v15/{}", hash)]
    RsaPkcs1v15 { hash: HashAlgorithm },
}

/// Verification takes the same parameters as signing.
pub type VerifyOptions = SignOptions;

impl SignOptions {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SignOptions::Ecdsa { .. } => Algorithm::Ecdsa,
            SignOptions::RsaPss { .. } | SignOptions::RsaPkcs1v15 { .. } => Algorithm::Rsa,
        }
    }

    pub fn hash(&self) -> HashAlgorithm {
        match self {
            SignOptions::Ecdsa { hash } | SignOptions::RsaPss { hash, .. } | SignOptions::RsaPkcs1v15 { hash } => *hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lengths_match() {
        for hash in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            assert_eq!(hash.digest(b"abc").len(), hash.output_len());
        }
    }

    #[test]
    fn options_display() {
        let pss = SignOptions::RsaPss {
            hash: HashAlgorithm::Sha256,
            salt: SaltLength::EqualsHash,
        };
        assert_eq!(pss.to_string(), "RSA-PSS/SHA-256/salt=hash");
        assert_eq!(pss.algorithm(), Algorithm::Rsa);
        let ecdsa = SignOptions::Ecdsa {
            hash: HashAlgorithm::Sha384,
        };
        assert_eq!(ecdsa.to_string(), "ECDSA/SHA-384");
        assert_eq!(ecdsa.algorithm(), Algorithm::Ecdsa);
    }
}
