use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use x25519_dalek::StaticSecret;

use crate::domain::{
    errors::CryptoError,
    models::{AccountId, EncryptedData, MessageCrypto, PublicKey},
};

const AEAD_NONCE_LEN: usize = 24;

/// Account keys and message encryption over Curve25519.
///
/// The private key is the SHA-256 digest of the secret phrase. Both parties of a message
/// derive the same symmetric key from their Diffie-Hellman secret mixed with the message
/// nonce, and the payload is sealed with XChaCha20-Poly1305.
#[derive(Clone, Copy, Debug, Default)]
pub struct Curve25519Crypto;

impl Curve25519Crypto {
    /// Encrypts `plaintext` so that the owner of `public_key` and the owner of `secret_phrase`
    /// can both read it.
    pub fn encrypt_to(
        &self,
        plaintext: &[u8],
        public_key: &PublicKey,
        secret_phrase: &str,
    ) -> Result<EncryptedData, CryptoError> {
        let mut rng = rand::thread_rng();
        let mut nonce = [0u8; 32];
        rng.fill_bytes(&mut nonce);
        let mut aead_nonce = [0u8; AEAD_NONCE_LEN];
        rng.fill_bytes(&mut aead_nonce);

        let cipher = Self::cipher(public_key, secret_phrase, &nonce);
        let sealed = cipher
            .encrypt(XNonce::from_slice(&aead_nonce), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut data = Vec::with_capacity(AEAD_NONCE_LEN + sealed.len());
        data.extend_from_slice(&aead_nonce);
        data.extend_from_slice(&sealed);
        Ok(EncryptedData { data, nonce })
    }

    fn private_key(secret_phrase: &str) -> StaticSecret {
        let digest: [u8; 32] = Sha256::digest(secret_phrase.as_bytes()).into();
        StaticSecret::from(digest)
    }

    fn cipher(public_key: &PublicKey, secret_phrase: &str, nonce: &[u8; 32]) -> XChaCha20Poly1305 {
        let counterparty = x25519_dalek::PublicKey::from(*public_key.as_bytes());
        let shared = Self::private_key(secret_phrase).diffie_hellman(&counterparty);

        let mut mixed = *shared.as_bytes();
        for (byte, n) in mixed.iter_mut().zip(nonce.iter()) {
            *byte ^= n;
        }
        let key: [u8; 32] = Sha256::digest(mixed).into();
        XChaCha20Poly1305::new(Key::from_slice(&key))
    }
}

impl MessageCrypto for Curve25519Crypto {
    fn public_key(&self, secret_phrase: &str) -> PublicKey {
        let public = x25519_dalek::PublicKey::from(&Self::private_key(secret_phrase));
        PublicKey(public.to_bytes())
    }

    fn account_id(&self, public_key: &PublicKey) -> AccountId {
        let digest = Sha256::digest(public_key.as_bytes());
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(id)
    }

    fn decrypt_from(
        &self,
        data: &EncryptedData,
        public_key: &PublicKey,
        secret_phrase: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        if data.data.len() < AEAD_NONCE_LEN {
            return Err(CryptoError::DecryptionFailed);
        }
        let (aead_nonce, sealed) = data.data.split_at(AEAD_NONCE_LEN);
        Self::cipher(public_key, secret_phrase, &data.nonce)
            .decrypt(XNonce::from_slice(aead_nonce), sealed)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_is_deterministic() {
        let crypto = Curve25519Crypto;
        assert_eq!(crypto.public_key("alice"), crypto.public_key("alice"));
        assert_ne!(crypto.public_key("alice"), crypto.public_key("bob"));
    }

    #[test]
    fn test_account_id_follows_public_key() {
        let crypto = Curve25519Crypto;
        let alice = crypto.public_key("alice");
        let bob = crypto.public_key("bob");
        assert_eq!(crypto.account_id(&alice), crypto.account_id(&alice));
        assert_ne!(crypto.account_id(&alice), crypto.account_id(&bob));
    }

    #[test]
    fn test_both_parties_can_decrypt() {
        let crypto = Curve25519Crypto;
        let bob = crypto.public_key("bob");
        let alice = crypto.public_key("alice");

        let encrypted = crypto.encrypt_to(b"hello bob", &bob, "alice").unwrap();

        assert_eq!(
            crypto.decrypt_from(&encrypted, &alice, "bob").unwrap(),
            b"hello bob"
        );
        assert_eq!(
            crypto.decrypt_from(&encrypted, &bob, "alice").unwrap(),
            b"hello bob"
        );
    }

    #[test]
    fn test_wrong_secret_fails() {
        let crypto = Curve25519Crypto;
        let bob = crypto.public_key("bob");
        let alice = crypto.public_key("alice");

        let encrypted = crypto.encrypt_to(b"hello bob", &bob, "alice").unwrap();

        assert_eq!(
            crypto.decrypt_from(&encrypted, &alice, "mallory"),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn test_tampered_payload_fails() {
        let crypto = Curve25519Crypto;
        let alice = crypto.public_key("alice");

        let mut encrypted = crypto.encrypt_to(b"note", &alice, "alice").unwrap();
        let last = encrypted.data.len() - 1;
        encrypted.data[last] ^= 0xFF;

        assert!(crypto.decrypt_from(&encrypted, &alice, "alice").is_err());
    }

    #[test]
    fn test_short_payload_fails() {
        let crypto = Curve25519Crypto;
        let alice = crypto.public_key("alice");
        let encrypted = EncryptedData {
            data: vec![1, 2, 3],
            nonce: [0u8; 32],
        };

        assert_eq!(
            crypto.decrypt_from(&encrypted, &alice, "alice"),
            Err(CryptoError::DecryptionFailed)
        );
    }
}
