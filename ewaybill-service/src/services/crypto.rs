//! Cryptographic envelope for the authority's protocol.
//!
//! The handshake encrypts credentials with the authority's published RSA
//! key (PKCS#1 v1.5); every payload after that is AES-256-ECB with PKCS7
//! padding under the session key, framed as payload → base64 → AES →
//! base64 as the wire format requires.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::Aes256;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use compliance_core::ComplianceError;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

/// AES-256 keys are 32 bytes.
pub const KEY_LEN: usize = 32;

fn key_of(bytes: &[u8]) -> Result<&[u8; KEY_LEN], ComplianceError> {
    bytes.try_into().map_err(|_| {
        ComplianceError::Crypto(format!("key must be {} bytes, got {}", KEY_LEN, bytes.len()))
    })
}

/// Encrypt `plaintext` with the authority's RSA public key and return it
/// base64-encoded for the handshake body.
pub fn rsa_encrypt_b64(public_key_pem: &str, plaintext: &[u8]) -> Result<String, ComplianceError> {
    let key = RsaPublicKey::from_public_key_pem(public_key_pem)
        .map_err(|e| ComplianceError::Crypto(format!("invalid authority public key: {}", e)))?;
    let ciphertext = key
        .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, plaintext)
        .map_err(|e| ComplianceError::Crypto(format!("RSA encryption failed: {}", e)))?;
    Ok(BASE64.encode(ciphertext))
}

pub fn aes_encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, ComplianceError> {
    let key = key_of(key)?;
    Ok(Aes256EcbEnc::new(key.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

pub fn aes_decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, ComplianceError> {
    let key = key_of(key)?;
    Aes256EcbDec::new(key.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| ComplianceError::Crypto(format!("AES decryption failed: {}", e)))
}

/// Encrypt an outgoing JSON payload: base64 the plaintext, AES it under
/// the session key, base64 the ciphertext.
pub fn seal_payload(key: &[u8], payload: &[u8]) -> Result<String, ComplianceError> {
    let inner = BASE64.encode(payload);
    let ciphertext = aes_encrypt(key, inner.as_bytes())?;
    Ok(BASE64.encode(ciphertext))
}

/// Reverse of [`seal_payload`] for a response's `data` field.
pub fn open_payload(key: &[u8], data: &str) -> Result<Vec<u8>, ComplianceError> {
    let ciphertext = BASE64
        .decode(data.trim())
        .map_err(|e| ComplianceError::Crypto(format!("response data is not base64: {}", e)))?;
    let inner = aes_decrypt(key, &ciphertext)?;
    BASE64
        .decode(&inner)
        .map_err(|e| ComplianceError::Crypto(format!("decrypted payload is not base64: {}", e)))
}

/// Decrypt the handshake's session-key field with the app key. The `sek`
/// arrives as base64 ciphertext whose plaintext is the base64 of the raw
/// session key.
pub fn open_session_key(app_key: &[u8], sek: &str) -> Result<Vec<u8>, ComplianceError> {
    let ciphertext = BASE64
        .decode(sek.trim())
        .map_err(|e| ComplianceError::Crypto(format!("sek is not base64: {}", e)))?;
    let inner = aes_decrypt(app_key, &ciphertext)?;
    let session_key = BASE64
        .decode(&inner)
        .map_err(|e| ComplianceError::Crypto(format!("decrypted sek is not base64: {}", e)))?;
    if session_key.len() != KEY_LEN {
        return Err(ComplianceError::Crypto(format!(
            "session key must be {} bytes, got {}",
            KEY_LEN,
            session_key.len()
        )));
    }
    Ok(session_key)
}

/// Seal a raw session key for tests and tooling that emulate the
/// authority side of the handshake.
pub fn seal_session_key(app_key: &[u8], session_key: &[u8]) -> Result<String, ComplianceError> {
    let inner = BASE64.encode(session_key);
    let ciphertext = aes_encrypt(app_key, inner.as_bytes())?;
    Ok(BASE64.encode(ciphertext))
}

/// Generate a fresh 32-character alphanumeric app key.
pub fn generate_app_key() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}
