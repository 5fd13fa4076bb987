use {
    crate::crypto::{CryptoError, CryptoResult},
    rand::{TryRngCore, rngs::OsRng},
    webdrop_protocol::{EncodedCipherParams, EncodedKdfParams, codec},
};

pub const KDF_NAME: &str = "PBKDF2";
pub const KDF_HASH: &str = "SHA-256";
pub const KDF_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;

pub const CIPHER_NAME: &str = "AES-GCM";
pub const IV_LENGTH: usize = 12;

/// Fills `buf` from the operating system's CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|err| CryptoError::Randomness(err.to_string()))
}

/// Parameters for stretching a session password into master key bits.
///
/// Always stored with the session, so a future change of the defaults does not
/// lock out existing sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    pub name: String,
    pub hash: String,
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl KdfParams {
    /// Parameters for a brand-new session, with a fresh random salt.
    #[inline]
    pub fn generate() -> CryptoResult<Self> {
        let mut salt = vec![0; SALT_LENGTH];
        fill_random(&mut salt)?;
        Ok(Self::with_salt(salt))
    }

    #[must_use]
    #[inline]
    pub fn with_salt(salt: impl Into<Vec<u8>>) -> Self {
        Self {
            name: KDF_NAME.into(),
            hash: KDF_HASH.into(),
            salt: salt.into(),
            iterations: KDF_ITERATIONS,
        }
    }

    #[must_use]
    #[inline]
    pub fn encode(&self) -> EncodedKdfParams {
        EncodedKdfParams {
            name: self.name.clone(),
            hash: self.hash.clone(),
            iterations: self.iterations,
            salt: codec::encode(&self.salt),
        }
    }

    #[inline]
    pub fn decode(encoded: &EncodedKdfParams) -> CryptoResult<Self> {
        Ok(Self {
            name: encoded.name.clone(),
            hash: encoded.hash.clone(),
            salt: codec::decode(&encoded.salt)?,
            iterations: encoded.iterations,
        })
    }

    /// Rejects bundles this client cannot derive with.
    pub(crate) fn check(&self) -> CryptoResult<()> {
        if self.name != KDF_NAME {
            return Err(CryptoError::KeyDerivation(format!(
                "unsupported algorithm `{}`",
                self.name
            )));
        }
        if self.hash != KDF_HASH {
            return Err(CryptoError::KeyDerivation(format!(
                "unsupported hash `{}`",
                self.hash
            )));
        }
        if self.iterations == 0 {
            return Err(CryptoError::KeyDerivation(
                "iteration count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// AES-GCM parameters of one encrypted item. The IV is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherParams {
    pub name: String,
    pub iv: Vec<u8>,
}

impl CipherParams {
    #[inline]
    pub fn generate() -> CryptoResult<Self> {
        let mut iv = vec![0; IV_LENGTH];
        fill_random(&mut iv)?;
        Ok(Self {
            name: CIPHER_NAME.into(),
            iv,
        })
    }

    #[must_use]
    #[inline]
    pub fn encode(&self) -> EncodedCipherParams {
        EncodedCipherParams {
            name: self.name.clone(),
            iv: codec::encode(&self.iv),
        }
    }

    #[inline]
    pub fn decode(encoded: &EncodedCipherParams) -> CryptoResult<Self> {
        Ok(Self {
            name: encoded.name.clone(),
            iv: codec::decode(&encoded.iv)?,
        })
    }

    pub(crate) fn check(&self) -> CryptoResult<()> {
        if self.name != CIPHER_NAME || self.iv.len() != IV_LENGTH {
            return Err(CryptoError::Decryption);
        }
        Ok(())
    }
}
