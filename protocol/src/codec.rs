//! Text encoding for binary fields that cross the JSON boundary.
//!
//! Envelope fields (IVs, salts, ciphertexts, wrapped keys) use standard base64 with
//! padding, which is what the browser client produces. Decoding accepts input with or
//! without padding. Values that end up in URLs (share-link fragments, the `auth` query
//! parameter) use the URL-safe alphabet without padding.

use {
    base64::{
        Engine,
        alphabet,
        engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    },
    thiserror::Error,
};

const STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Input text is not valid base64.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid encoding: {0}")]
pub struct InvalidEncoding(#[from] base64::DecodeError);

#[must_use]
#[inline]
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

#[inline]
pub fn decode(text: &str) -> Result<Vec<u8>, InvalidEncoding> {
    Ok(STANDARD.decode(text)?)
}

#[must_use]
#[inline]
pub fn encode_url_safe(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(bytes)
}

#[inline]
pub fn decode_url_safe(text: &str) -> Result<Vec<u8>, InvalidEncoding> {
    Ok(URL_SAFE.decode(text)?)
}
