use {
    crate::crypto::{
        CryptoError, CryptoResult,
        cipher::{CONTENT_KEY_LENGTH, ContentKey, UnwrappedContentKey},
        kdf::MASTER_KEY_LENGTH,
    },
    aes_gcm::aead::generic_array::GenericArray,
    aes_kw::KekAes256,
    std::{
        fmt::{self, Debug},
        sync::Arc,
    },
    zeroize::Zeroizing,
};

/// AES-KW adds one 64-bit integrity block to the wrapped key.
pub const WRAPPED_KEY_LENGTH: usize = CONTENT_KEY_LENGTH + 8;

/// Session master key, imported for key wrapping only.
///
/// There is no way to get the key bytes back out, and no way to encrypt data with it
/// directly: it only wraps and unwraps per-item content keys.
#[derive(Clone)]
pub struct MasterKey(Arc<KekAes256>);

impl MasterKey {
    #[inline]
    pub fn import(raw: &[u8]) -> CryptoResult<Self> {
        if raw.len() != MASTER_KEY_LENGTH {
            return Err(CryptoError::KeyImport(format!(
                "invalid length; got {}, expected {MASTER_KEY_LENGTH}",
                raw.len()
            )));
        }
        Ok(Self(Arc::new(KekAes256::new(GenericArray::from_slice(raw)))))
    }

    pub(crate) fn wrap(&self, key: &ContentKey) -> CryptoResult<Vec<u8>> {
        self.0
            .wrap_vec(key.as_bytes())
            .map_err(|err| CryptoError::WrapUnwrap(err.to_string()))
    }

    /// Fails with [`CryptoError::Decryption`] if the blob was wrapped under another
    /// master key or was altered.
    pub(crate) fn unwrap(&self, wrapped: &[u8]) -> CryptoResult<UnwrappedContentKey> {
        if wrapped.len() != WRAPPED_KEY_LENGTH {
            return Err(CryptoError::WrapUnwrap(format!(
                "invalid wrapped key length; got {}, expected {WRAPPED_KEY_LENGTH}",
                wrapped.len()
            )));
        }
        let mut raw = Zeroizing::new([0; CONTENT_KEY_LENGTH]);
        self.0
            .unwrap(wrapped, raw.as_mut_slice())
            .map_err(|err| match err {
                aes_kw::Error::IntegrityCheckFailed => CryptoError::Decryption,
                other => CryptoError::WrapUnwrap(other.to_string()),
            })?;
        Ok(UnwrappedContentKey::new(&raw))
    }
}

impl Debug for MasterKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey").finish()
    }
}
