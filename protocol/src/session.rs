use {
    crate::{DateTimeUtc, SessionId, params::EncodedKdfParams},
    serde::{Deserialize, Serialize},
};

/// Session record as returned by the server.
///
/// `crypto` is present only for encrypted sessions; it carries what a joining client
/// needs to re-derive the master key from the session password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub creation_time: DateTimeUtc,
    #[serde(default)]
    pub crypto: Option<SessionCrypto>,
}

impl Session {
    #[must_use]
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.crypto.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCrypto {
    pub kdf_params: EncodedKdfParams,
}

/// Body of a request creating an encrypted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    /// Header form of the authentication token.
    pub auth_key: String,
    pub kdf_params: EncodedKdfParams,
}
