use {
    crate::codec::{self, InvalidEncoding},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::{
        borrow::Cow,
        fmt::{self, Debug},
        str::FromStr,
    },
    subtle::ConstantTimeEq,
    thiserror::Error,
};

/// Header carrying the header-safe form of the token.
pub const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// Query parameter carrying the URL-safe form of the token, for contexts where
/// custom headers cannot be set (media links, websockets).
pub const AUTH_QUERY_PARAM: &str = "auth";

pub const AUTH_TOKEN_LENGTH: usize = 32;

/// Proof of possession of a session master key.
///
/// Derived one-way from the master key bits, so the server can store and compare it
/// without learning anything that decrypts session content.
#[derive(Clone)]
pub struct AuthToken([u8; AUTH_TOKEN_LENGTH]);

#[derive(Debug, Error)]
pub enum InvalidAuthToken {
    #[error(transparent)]
    Encoding(#[from] InvalidEncoding),
    #[error("invalid length; got {0}, expected {AUTH_TOKEN_LENGTH}")]
    Length(usize),
}

impl AuthToken {
    #[must_use]
    #[inline]
    pub fn from_bytes(bytes: [u8; AUTH_TOKEN_LENGTH]) -> Self {
        Self(bytes)
    }

    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8; AUTH_TOKEN_LENGTH] {
        &self.0
    }

    /// Value for the [`AUTH_KEY_HEADER`] header: standard base64.
    #[must_use]
    #[inline]
    pub fn to_header_value(&self) -> String {
        codec::encode(self.0)
    }

    /// Value for the [`AUTH_QUERY_PARAM`] query parameter: URL-safe base64, unpadded.
    #[must_use]
    #[inline]
    pub fn to_query_value(&self) -> String {
        codec::encode_url_safe(self.0)
    }

    /// Parses either the header or the query form.
    #[inline]
    pub fn parse(value: &str) -> Result<Self, InvalidAuthToken> {
        let bytes = if value.contains(['-', '_']) {
            codec::decode_url_safe(value)?
        } else {
            codec::decode(value)?
        };
        let array = <[u8; AUTH_TOKEN_LENGTH]>::try_from(bytes)
            .map_err(|bytes| InvalidAuthToken::Length(bytes.len()))?;
        Ok(Self(array))
    }
}

impl PartialEq for AuthToken {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for AuthToken {}

impl FromStr for AuthToken {
    type Err = InvalidAuthToken;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Debug for AuthToken {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken").finish()
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Cow::<'_, str>::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

impl Serialize for AuthToken {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_header_value().serialize(serializer)
    }
}
