use {thiserror::Error, webdrop_protocol::codec::InvalidEncoding};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error(transparent)]
    InvalidEncoding(#[from] InvalidEncoding),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("key import failed: {0}")]
    KeyImport(String),

    /// Authentication failed while opening a content key or payload.
    ///
    /// This is the only signal a client gets for a wrong session password, so it
    /// carries no detail about which step rejected the input.
    #[error("cannot decrypt: wrong password or corrupted data")]
    Decryption,

    #[error("key wrap failed: {0}")]
    WrapUnwrap(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("secure random source unavailable: {0}")]
    Randomness(String),

    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("crypto worker failed: {0}")]
    Task(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
