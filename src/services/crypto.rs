// src/services/crypto.rs
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Payload serialization failed: {0}")]
    SerializationFailed(String),
}

/// Wire shape of an encrypted user profile.
///
/// The client-side counterpart parses exactly these three fields, so the
/// names are part of the protocol and must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub encrypted_user_data: String,
    pub iv: String,
    pub key: String,
}

/// AES-256-CBC codec for the login/update response envelope.
///
/// The key lives for the process lifetime and is reused for every envelope;
/// it is also shipped to the client inside the envelope itself. That makes
/// the cipher an obfuscation of the wire format, not a confidentiality
/// boundary - the protocol is preserved as observed, warts included. The key
/// is injected at construction so tests and deployments control it.
pub struct SymmetricCodec {
    key: [u8; 32],
}

impl std::fmt::Debug for SymmetricCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricCodec")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SymmetricCodec {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Generate a fresh random 256-bit key
    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt a JSON payload under the process key with a fresh random IV
    pub fn encrypt(&self, payload: &serde_json::Value) -> Result<EncryptedEnvelope, CodecError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| CodecError::SerializationFailed(e.to_string()))?;

        let mut iv = [0u8; 16];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext);

        Ok(EncryptedEnvelope {
            encrypted_user_data: hex::encode(ciphertext),
            iv: hex::encode(iv),
            key: hex::encode(self.key),
        })
    }

    /// Decrypt an envelope back into its JSON payload.
    ///
    /// Soft-fail contract: any malformed hex, wrong-length key/IV, padding
    /// error, or non-JSON plaintext yields `None` rather than partial data.
    pub fn decrypt(cipher_hex: &str, iv_hex: &str, key_hex: &str) -> Option<serde_json::Value> {
        let ciphertext = hex::decode(cipher_hex).ok()?;
        let iv: [u8; 16] = hex::decode(iv_hex).ok()?.try_into().ok()?;
        let key: [u8; 32] = hex::decode(key_hex).ok()?.try_into().ok()?;

        let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .ok()?;

        serde_json::from_slice(&plaintext).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());

        let payload = json!({
            "name": "Ann",
            "email": "ann@x.com",
            "role": "user",
            "loginType": "local",
        });

        let envelope = codec.encrypt(&payload).unwrap();
        let decrypted =
            SymmetricCodec::decrypt(&envelope.encrypted_user_data, &envelope.iv, &envelope.key)
                .unwrap();

        assert_eq!(decrypted, payload);
    }

    #[test]
    fn test_key_is_reused_across_envelopes() {
        // Protocol-as-built: one key per codec instance, shipped in-band.
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());

        let first = codec.encrypt(&json!({"a": 1})).unwrap();
        let second = codec.encrypt(&json!({"b": 2})).unwrap();

        assert_eq!(first.key, second.key);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());

        let first = codec.encrypt(&json!({"a": 1})).unwrap();
        let second = codec.encrypt(&json!({"a": 1})).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.encrypted_user_data, second.encrypted_user_data);
    }

    #[test]
    fn test_decrypt_rejects_corrupt_ciphertext() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());
        let envelope = codec.encrypt(&json!({"a": 1})).unwrap();

        // Flip bytes in the ciphertext; padding check should refuse it
        let mut corrupted = hex::decode(&envelope.encrypted_user_data).unwrap();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xff;

        let result =
            SymmetricCodec::decrypt(&hex::encode(corrupted), &envelope.iv, &envelope.key);
        assert!(result.is_none());
    }

    #[test]
    fn test_decrypt_rejects_truncated_ciphertext() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());
        let envelope = codec.encrypt(&json!({"name": "Ann", "email": "ann@x.com"})).unwrap();

        // Drop the final block
        let truncated = &envelope.encrypted_user_data[..envelope.encrypted_user_data.len() - 32];

        let result = SymmetricCodec::decrypt(truncated, &envelope.iv, &envelope.key);
        assert!(result.is_none());
    }

    #[test]
    fn test_decrypt_rejects_garbage_hex() {
        assert!(SymmetricCodec::decrypt("zz-not-hex", "00", "00").is_none());
    }

    #[test]
    fn test_decrypt_rejects_wrong_length_key() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());
        let envelope = codec.encrypt(&json!({"a": 1})).unwrap();

        let result =
            SymmetricCodec::decrypt(&envelope.encrypted_user_data, &envelope.iv, "deadbeef");
        assert!(result.is_none());
    }

    #[test]
    fn test_envelope_wire_field_names() {
        let codec = SymmetricCodec::new(SymmetricCodec::generate_key());
        let envelope = codec.encrypt(&json!({"a": 1})).unwrap();

        let wire = serde_json::to_value(&envelope).unwrap();
        assert!(wire.get("encryptedUserData").is_some());
        assert!(wire.get("iv").is_some());
        assert!(wire.get("key").is_some());
    }
}
