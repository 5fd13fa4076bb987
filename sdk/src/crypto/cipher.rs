use {
    crate::{
        context::CryptoConfig,
        crypto::{CipherParams, CryptoError, CryptoResult, MasterKey, params::fill_random, run_blocking},
    },
    aes_gcm::{
        Aes256Gcm, KeyInit, Nonce,
        aead::{Aead, generic_array::GenericArray},
    },
    std::fmt::{self, Debug},
    tracing::trace,
    webdrop_protocol::{Content, EncryptedContent, FileObject, Upload, codec},
    zeroize::Zeroizing,
};

pub const CONTENT_KEY_LENGTH: usize = 32;

/// Single-use AES-256-GCM key for one item. Extractable, so it can be wrapped.
pub struct ContentKey(Zeroizing<[u8; CONTENT_KEY_LENGTH]>);

impl ContentKey {
    #[inline]
    pub fn generate() -> CryptoResult<Self> {
        let mut key = Zeroizing::new([0; CONTENT_KEY_LENGTH]);
        fill_random(key.as_mut_slice())?;
        Ok(Self(key))
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; CONTENT_KEY_LENGTH]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Output is the ciphertext with the 16-byte tag appended.
    #[inline]
    pub fn encrypt(&self, params: &CipherParams, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        params.check().map_err(|_err| {
            CryptoError::Encryption(format!(
                "unsupported parameters `{}` with {}-byte IV",
                params.name,
                params.iv.len()
            ))
        })?;
        Aes256Gcm::new(GenericArray::from_slice(self.as_bytes()))
            .encrypt(Nonce::from_slice(&params.iv), plaintext)
            .map_err(|err| CryptoError::Encryption(err.to_string()))
    }
}

impl Debug for ContentKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentKey").finish()
    }
}

/// Content key recovered from a wrapped blob. Can only decrypt.
pub struct UnwrappedContentKey(Aes256Gcm);

impl UnwrappedContentKey {
    pub(crate) fn new(raw: &[u8; CONTENT_KEY_LENGTH]) -> Self {
        Self(Aes256Gcm::new(GenericArray::from_slice(raw)))
    }

    /// Never returns partial plaintext: any tag mismatch is [`CryptoError::Decryption`].
    #[inline]
    pub fn decrypt(&self, params: &CipherParams, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        params.check()?;
        self.0
            .decrypt(Nonce::from_slice(&params.iv), ciphertext)
            .map_err(|_err| CryptoError::Decryption)
    }
}

impl Debug for UnwrappedContentKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnwrappedContentKey").finish()
    }
}

/// Encrypts `upload` into a ciphertext envelope under a fresh content key.
#[inline]
pub fn encrypt_upload(master_key: &MasterKey, upload: &Upload) -> CryptoResult<Upload> {
    let key = ContentKey::generate()?;
    let params = CipherParams::generate()?;
    let payload = Zeroizing::new(serde_json::to_vec(upload)?);
    let ciphertext = key.encrypt(&params, &payload)?;
    let wrapped_key = master_key.wrap(&key)?;
    Ok(Upload::ciphertext(EncryptedContent {
        cipher: params.encode(),
        ciphertext: codec::encode(ciphertext),
        wrapped_key: codec::encode(wrapped_key),
    }))
}

/// Opens a ciphertext envelope back into the upload it was made from.
#[inline]
pub fn decrypt_content(master_key: &MasterKey, content: &EncryptedContent) -> CryptoResult<Upload> {
    let key = master_key.unwrap(&codec::decode(&content.wrapped_key)?)?;
    let params = CipherParams::decode(&content.cipher)?;
    let payload = Zeroizing::new(key.decrypt(&params, &codec::decode(&content.ciphertext)?)?);
    Ok(serde_json::from_slice(&payload)?)
}

/// Replaces the ciphertext placeholder of `obj` with the decrypted `mime` and
/// `content`. Objects that are not encrypted are returned as is.
#[inline]
pub fn decrypt_object(master_key: &MasterKey, obj: FileObject) -> CryptoResult<FileObject> {
    let encrypted = match obj.content {
        Content::Ciphertext(encrypted) => encrypted,
        content @ (Content::Text { .. } | Content::Link { .. } | Content::File { .. }) => {
            return Ok(FileObject { content, ..obj });
        }
    };
    let upload = decrypt_content(master_key, &encrypted)?;
    Ok(FileObject {
        mime: upload.mime,
        content: upload.content,
        ..obj
    })
}

/// Encrypts `upload` when a session key is active, otherwise passes it through.
#[inline]
pub async fn maybe_encrypt_upload(
    config: Option<&CryptoConfig>,
    upload: Upload,
) -> CryptoResult<Upload> {
    let Some(config) = config else {
        trace!("no session key, sending plaintext");
        return Ok(upload);
    };
    let master_key = config.master_key().clone();
    run_blocking(move || encrypt_upload(&master_key, &upload)).await
}

/// Decrypts `obj` when a session key is active and the object is a ciphertext
/// envelope, otherwise passes it through.
#[inline]
pub async fn maybe_decrypt_object(
    config: Option<&CryptoConfig>,
    obj: FileObject,
) -> CryptoResult<FileObject> {
    let Some(config) = config else {
        return Ok(obj);
    };
    if !obj.content.is_ciphertext() {
        return Ok(obj);
    }
    let master_key = config.master_key().clone();
    run_blocking(move || decrypt_object(&master_key, obj)).await
}
