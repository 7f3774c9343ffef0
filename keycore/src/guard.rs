//! At-rest protection of private key bytes.
//!
//! Private key bytes are encrypted with AES in counter mode under a caller-supplied symmetric
//! key. The output is `IV || ciphertext`: a fresh random 16 byte IV followed by exactly as many
//! ciphertext bytes as there were plaintext bytes (no padding, no authentication tag).
//!
//! The IV is drawn anew for every call; encrypting two plaintexts under the same key and IV
//! would expose their XOR. Persisting the blobs is up to the caller.

use crate::{curve::CurveOption, error::CipherError, error::Error, private::EcPrivateKey};
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{rngs::OsRng, CryptoRng, RngCore};
use std::fmt::{self, Debug};
use tracing::debug;
use zeroize::Zeroizing;

/// AES block length, which is also the IV length.
pub const BLOCK_LEN: usize = 16;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes192Ctr = ctr::Ctr128BE<aes::Aes192>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Encrypted private key: `IV (16 bytes) || ciphertext`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedKey(Vec<u8>);

impl EncryptedKey {
    pub fn iv(&self) -> &[u8] {
        &self.0[..BLOCK_LEN]
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.0[BLOCK_LEN..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl TryFrom<Vec<u8>> for EncryptedKey {
    type Error = CipherError;
    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        check_len(&bytes)?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for EncryptedKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for EncryptedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedKey")
            .field("iv", &hex::encode(self.iv()))
            .field("len", &self.ciphertext().len())
            .finish()
    }
}

fn check_len(encrypted: &[u8]) -> Result<(), CipherError> {
    if encrypted.len() < BLOCK_LEN {
        return Err(CipherError::Truncated {
            expected: BLOCK_LEN,
            actual: encrypted.len(),
        });
    }
    Ok(())
}

fn apply_keystream(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError> {
    // new_from_slices cannot fail on these lengths: the key length is matched and the IV is one block
    let invalid = |_| CipherError::InvalidKeySize(key.len());
    match key.len() {
        16 => Aes128Ctr::new_from_slices(key, iv).map_err(invalid)?.apply_keystream(buf),
        24 => Aes192Ctr::new_from_slices(key, iv).map_err(invalid)?.apply_keystream(buf),
        32 => Aes256Ctr::new_from_slices(key, iv).map_err(invalid)?.apply_keystream(buf),
        n => return Err(CipherError::InvalidKeySize(n)),
    }
    Ok(())
}

/// Encrypt `plaintext` under `key` (16, 24 or 32 bytes) with a fresh IV from the OS random source.
pub fn protect(plaintext: &[u8], key: &[u8]) -> Result<EncryptedKey, CipherError> {
    protect_with_rng(plaintext, key, &mut OsRng)
}

pub fn protect_with_rng<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    key: &[u8],
    rng: &mut R,
) -> Result<EncryptedKey, CipherError> {
    if !matches!(key.len(), 16 | 24 | 32) {
        return Err(CipherError::InvalidKeySize(key.len()));
    }
    let mut out = vec![0u8; BLOCK_LEN + plaintext.len()];
    let (iv, body) = out.split_at_mut(BLOCK_LEN);
    rng.try_fill_bytes(iv)
        .map_err(|e| CipherError::RandomSource(e.to_string()))?;
    body.copy_from_slice(plaintext);
    apply_keystream(key, iv, body)?;
    debug!(len = plaintext.len(), key_len = key.len(), "protected key material");
    Ok(EncryptedKey(out))
}

/// Decrypt the output of [`protect`].
///
/// Inputs shorter than one IV are rejected with [`CipherError::Truncated`] before anything is
/// sliced; an input of exactly one IV decrypts to an empty plaintext.
pub fn unprotect(encrypted: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    if !matches!(key.len(), 16 | 24 | 32) {
        return Err(CipherError::InvalidKeySize(key.len()));
    }
    check_len(encrypted)?;
    let (iv, body) = encrypted.split_at(BLOCK_LEN);
    let mut plaintext = Zeroizing::new(body.to_vec());
    apply_keystream(key, iv, &mut plaintext)?;
    debug!(len = plaintext.len(), key_len = key.len(), "unprotected key material");
    Ok(plaintext)
}

/// Encrypt the canonical private scalar bytes of `private`.
pub fn encrypt_private_key(private: &EcPrivateKey, key: &[u8]) -> Result<EncryptedKey, Error> {
    let bytes = private.to_bytes()?;
    Ok(protect(&bytes, key)?)
}

/// Decrypt and validate a private key produced by [`encrypt_private_key`].
///
/// The decrypted bytes run through the full private key validation, so a wrong symmetric key
/// usually surfaces as a length or range error rather than as a bogus key.
pub fn decrypt_private_key(encrypted: &[u8], key: &[u8], curve: CurveOption) -> Result<EcPrivateKey, Error> {
    let bytes = unprotect(encrypted, key)?;
    Ok(EcPrivateKey::from_bytes(&bytes, curve)?)
}
