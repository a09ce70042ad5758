//! Cryptographic Utilities
//!
//! - Random material and digests used for access tokens
//! - HMAC-signed tokens carried in cookies (OAuth state, pending registration)
//! - Password-based paste encryption (PBKDF2-HMAC-SHA512 + AES-256-CBC)

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Version tag stored next to encrypted paste data
pub const ENCRYPTION_VERSION: i16 = 3;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 32;
const IV_LEN: usize = 16;
const KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid key length")]
    InvalidKey,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Invalid base64 input")]
    Base64,

    #[error("Decryption failed")]
    Decrypt,
}

// ============================================================================
// Random / digests
// ============================================================================

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Random lowercase hex string of exactly `len` characters
pub fn random_hex(len: usize) -> String {
    let mut s = hex::encode(random_bytes(len.div_ceil(2)));
    s.truncate(len);
    s
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-512 digest as lowercase hex
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// Encode bytes as base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Compute HMAC-SHA256
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Signed tokens
// ============================================================================

/// Sign a JSON payload: `base64url(json).base64url(hmac)`
pub fn sign_token<T: Serialize>(secret: &[u8], payload: &T) -> Result<String, CryptoError> {
    let json = serde_json::to_vec(payload).map_err(|_| CryptoError::MalformedToken)?;
    let body = general_purpose::URL_SAFE_NO_PAD.encode(json);
    let sig = hmac_sha256(secret, body.as_bytes())?;
    Ok(format!(
        "{}.{}",
        body,
        general_purpose::URL_SAFE_NO_PAD.encode(sig)
    ))
}

/// Verify a token produced by [`sign_token`] and decode its payload
pub fn verify_token<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, CryptoError> {
    let (body, sig_b64) = token.split_once('.').ok_or(CryptoError::MalformedToken)?;

    let sig = general_purpose::URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| CryptoError::Base64)?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| CryptoError::InvalidKey)?;
    mac.update(body.as_bytes());
    mac.verify_slice(&sig)
        .map_err(|_| CryptoError::BadSignature)?;

    let json = general_purpose::URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|_| CryptoError::Base64)?;
    serde_json::from_slice(&json).map_err(|_| CryptoError::MalformedToken)
}

// ============================================================================
// Paste encryption
// ============================================================================

/// Ciphertext with its per-encryption parameters, all standard base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct EncryptedBlob {
    pub data: String,
    pub iv: String,
    pub salt: String,
}

fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt with a fresh salt and IV
pub fn encrypt(passphrase: &str, plaintext: &[u8]) -> EncryptedBlob {
    let salt = random_bytes(SALT_LEN);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(passphrase, &salt);
    let data = Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    EncryptedBlob {
        data: to_base64(&data),
        iv: to_base64(&iv),
        salt: to_base64(&salt),
    }
}

/// Decrypt a blob produced by [`encrypt`]. A wrong passphrase yields `Decrypt`
/// in most cases; callers should still treat unparsable plaintext as a bad key.
pub fn decrypt(passphrase: &str, blob: &EncryptedBlob) -> Result<Vec<u8>, CryptoError> {
    let data = from_base64(&blob.data).map_err(|_| CryptoError::Base64)?;
    let salt = from_base64(&blob.salt).map_err(|_| CryptoError::Base64)?;
    let iv: [u8; IV_LEN] = from_base64(&blob.iv)
        .map_err(|_| CryptoError::Base64)?
        .try_into()
        .map_err(|_| CryptoError::Decrypt)?;

    let key = derive_key(passphrase, &salt);
    Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&data)
        .map_err(|_| CryptoError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_sha512_hex_known_value() {
        assert_eq!(
            sha512_hex(b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_random_hex() {
        let s = random_hex(64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(random_hex(7).len(), 7);
        assert_ne!(random_hex(32), random_hex(32));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_eq(&[1, 2], &[1, 2, 3]));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Claims {
        provider: String,
        exp: i64,
    }

    #[test]
    fn test_signed_token_verifies() {
        let secret = [7u8; 32];
        let claims = Claims {
            provider: "github".into(),
            exp: 1_700_000_000,
        };
        let token = sign_token(&secret, &claims).unwrap();
        let decoded: Claims = verify_token(&secret, &token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_signed_token_rejects_tampering() {
        let secret = [7u8; 32];
        let token = sign_token(&secret, &"state-1").unwrap();

        let other = sign_token(&secret, &"state-2").unwrap();
        let forged = format!(
            "{}.{}",
            other.split_once('.').unwrap().0,
            token.split_once('.').unwrap().1
        );
        assert_eq!(
            verify_token::<String>(&secret, &forged),
            Err(CryptoError::BadSignature)
        );
        assert_eq!(
            verify_token::<String>(&[8u8; 32], &token),
            Err(CryptoError::BadSignature)
        );
        assert_eq!(
            verify_token::<String>(&secret, "no-dot"),
            Err(CryptoError::MalformedToken)
        );
    }

    #[test]
    fn test_encrypt_uses_fresh_parameters() {
        let a = encrypt("key", b"same text");
        let b = encrypt("key", b"same text");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.data, b.data);
        assert_eq!(from_base64(&a.salt).unwrap().len(), SALT_LEN);
        assert_eq!(from_base64(&a.iv).unwrap().len(), IV_LEN);
    }

    #[test]
    fn test_decrypt_with_right_and_wrong_key() {
        let plaintext = br#"{"pasties":[],"history":[]}"#;
        let blob = encrypt("correct horse", plaintext);
        assert_eq!(decrypt("correct horse", &blob).unwrap(), plaintext);

        // Wrong key either fails padding or produces garbage
        match decrypt("battery staple", &blob) {
            Err(e) => assert_eq!(e, CryptoError::Decrypt),
            Ok(bytes) => assert_ne!(bytes, plaintext),
        }
    }

    #[test]
    fn test_decrypt_rejects_corrupt_blob() {
        let mut blob = encrypt("k", b"data");
        blob.iv = to_base64(&[0u8; 4]);
        assert_eq!(decrypt("k", &blob), Err(CryptoError::Decrypt));
        blob.data = "not base64!!".into();
        assert_eq!(decrypt("k", &blob), Err(CryptoError::Base64));
    }
}
