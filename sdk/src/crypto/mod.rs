//! Client-side encryption of session content. The server never sees plaintext,
//! the session password, or any key that decrypts content.
//!
//! The session password is stretched with PBKDF2-HMAC-SHA-256 (600000 iterations,
//! 16-byte random salt) into 256 master key bits. The KDF parameters are stored with
//! the session so that other clients can repeat the derivation. The bits are used twice:
//!
//! - imported as an AES-KW key-encryption key (the [`MasterKey`]), which can only wrap
//!   and unwrap other keys;
//! - fed as the salt of a second PBKDF2 pass over a fixed public string, producing the
//!   [`AuthToken`](webdrop_protocol::AuthToken) that the server stores and compares.
//!   The server can check a client against it but cannot reverse it into the master key.
//!
//! Each uploaded item gets its own random AES-256-GCM content key and 96-bit IV.
//! The item is serialized to JSON, encrypted with the content key, and the content key
//! is wrapped under the master key. The resulting envelope carries the IV, the
//! ciphertext (with the GCM tag) and the wrapped key, each in base64.
//!
//! Integrity is enforced twice on decryption: AES-KW checks the wrapped key, GCM checks
//! the payload. Either failure surfaces as [`CryptoError::Decryption`].

mod cipher;
mod error;
mod kdf;
mod master_key;
mod params;

pub use {
    cipher::{
        CONTENT_KEY_LENGTH, ContentKey, UnwrappedContentKey, decrypt_content, decrypt_object,
        encrypt_upload, maybe_decrypt_object, maybe_encrypt_upload,
    },
    error::{CryptoError, CryptoResult},
    kdf::{
        MASTER_KEY_LENGTH, MasterKeyBits, Password, derive_auth_token,
        derive_auth_token_blocking, derive_master_key_bits, derive_master_key_bits_blocking,
    },
    master_key::{MasterKey, WRAPPED_KEY_LENGTH},
    params::{
        CIPHER_NAME, CipherParams, IV_LENGTH, KDF_HASH, KDF_ITERATIONS, KDF_NAME, KdfParams,
        SALT_LENGTH,
    },
};

/// Runs CPU-bound crypto off the async executor threads.
async fn run_blocking<T, F>(f: F) -> CryptoResult<T>
where
    F: FnOnce() -> CryptoResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| CryptoError::Task(err.to_string()))?
}
