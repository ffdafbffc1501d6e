//! Document encryption using AES-256-CBC with PKCS#7 padding.
//!
//! CBC provides confidentiality only: there is no authentication tag, so
//! tampering surfaces as a padding failure at decrypt time, reported as an
//! integrity error. The IV is random per encryption and stored alongside
//! the ciphertext metadata; it is not secret.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::keys::DocumentKey;
use chainvault_common::{Error, Result};

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Initialization vector size in bytes.
pub const IV_LENGTH: usize = 16;

/// Initialization vector for one encryption.
pub type Iv = [u8; IV_LENGTH];

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypt plaintext under a document key with a fresh random IV.
///
/// # Postconditions
/// - Returns (ciphertext, iv); ciphertext length is the plaintext length
///   rounded up to the next multiple of [`BLOCK_SIZE`] (always at least
///   one block, even for empty input)
pub fn encrypt(key: &DocumentKey, plaintext: &[u8]) -> (Vec<u8>, Iv) {
    use rand::RngCore;
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    (ciphertext, iv)
}

/// Decrypt ciphertext and strip PKCS#7 padding.
///
/// # Preconditions
/// - `iv` must be the IV the ciphertext was produced with
///
/// # Errors
/// - `IntegrityFailure` if the ciphertext is empty, not block-aligned, or
///   the padding is malformed (wrong key, wrong IV, or tampered bytes)
pub fn decrypt(key: &DocumentKey, iv: &Iv, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::IntegrityFailure(
            "Ciphertext length is not a whole number of cipher blocks".to_string(),
        ));
    }

    Aes256CbcDec::new(key.as_bytes().into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::IntegrityFailure("Ciphertext padding is malformed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = DocumentKey::generate();
        let plaintext = b"Hello, ChainVault!";

        let (ciphertext, iv) = encrypt(&key, plaintext);
        let decrypted = decrypt(&key, &iv, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = DocumentKey::generate();

        let (ciphertext, iv) = encrypt(&key, b"");
        // PKCS#7 pads empty input to a full block
        assert_eq!(ciphertext.len(), BLOCK_SIZE);

        let decrypted = decrypt(&key, &iv, &ciphertext).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_fresh_iv_each_call() {
        let key = DocumentKey::generate();
        let plaintext = b"same plaintext";

        let (ct1, iv1) = encrypt(&key, plaintext);
        let (ct2, iv2) = encrypt(&key, plaintext);

        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = DocumentKey::from_bytes([1u8; 32]);
        let other = DocumentKey::from_bytes([2u8; 32]);

        let (ciphertext, iv) = encrypt(&key, b"secret data that spans blocks....");
        assert!(decrypt(&other, &iv, &ciphertext).is_err());
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let key = DocumentKey::generate();
        let (ciphertext, iv) = encrypt(&key, b"some content");

        assert!(decrypt(&key, &iv, &ciphertext[..ciphertext.len() - 1]).is_err());
        assert!(decrypt(&key, &iv, b"").is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_arbitrary_bytes(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let key = DocumentKey::generate();
            let (ciphertext, iv) = encrypt(&key, &plaintext);
            let decrypted = decrypt(&key, &iv, &ciphertext).unwrap();
            prop_assert_eq!(decrypted, plaintext);
        }
    }
}
