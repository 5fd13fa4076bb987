use {
    crate::crypto::{
        CryptoError, CryptoResult, KdfParams, MasterKey, Password, derive_auth_token,
        derive_master_key_bits,
    },
    parking_lot::RwLock,
    reqwest::header::{HeaderMap, HeaderName, HeaderValue},
    std::sync::Arc,
    tracing::debug,
    url::Url,
    webdrop_protocol::{
        AuthToken,
        credentials::{AUTH_KEY_HEADER, AUTH_QUERY_PARAM},
    },
};

static AUTH_KEY_HEADER_NAME: HeaderName = HeaderName::from_static("x-auth-key");

/// Key material of an active encrypted session.
///
/// Lives only in memory, for as long as the session is open; nothing here is ever
/// written to disk.
#[derive(Debug, Clone)]
pub struct CryptoConfig {
    master_key: MasterKey,
    auth_token: AuthToken,
    auth_header: HeaderValue,
}

impl CryptoConfig {
    #[inline]
    pub fn new(master_key: MasterKey, auth_token: AuthToken) -> CryptoResult<Self> {
        let mut auth_header = HeaderValue::from_str(&auth_token.to_header_value())
            .map_err(|err| CryptoError::KeyImport(format!("invalid {AUTH_KEY_HEADER}: {err}")))?;
        auth_header.set_sensitive(true);
        Ok(Self {
            master_key,
            auth_token,
            auth_header,
        })
    }

    /// Derives the session keys from `password`.
    ///
    /// Pass the session's stored parameters when joining; pass `None` when creating a
    /// session, and store the returned parameters with it.
    #[inline]
    pub async fn derive(
        password: &Password,
        params: Option<KdfParams>,
    ) -> CryptoResult<(Self, KdfParams)> {
        let is_new = params.is_none();
        let (bits, params) = derive_master_key_bits(password, params).await?;
        let auth_token = derive_auth_token(&bits).await?;
        let master_key = MasterKey::import(bits.as_bytes())?;
        debug!(is_new, iterations = params.iterations, "derived session keys");
        Ok((Self::new(master_key, auth_token)?, params))
    }

    #[must_use]
    #[inline]
    pub fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    #[must_use]
    #[inline]
    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    /// Header form of the token.
    #[must_use]
    #[inline]
    pub fn auth_key(&self) -> String {
        self.auth_token.to_header_value()
    }

    /// URL-safe form of the token.
    #[must_use]
    #[inline]
    pub fn auth_key_url(&self) -> String {
        self.auth_token.to_query_value()
    }
}

/// Holder of the active session's [`CryptoConfig`].
///
/// The session activation flow is the only writer; everything else takes a snapshot
/// with [`get`](Self::get) and works with that, so a concurrent `set` never tears a read.
#[derive(Debug, Default)]
pub struct CryptoSlot(RwLock<Option<Arc<CryptoConfig>>>);

impl CryptoSlot {
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(None))
    }

    /// Replaces the active config; last write wins.
    #[inline]
    pub fn set(&self, config: CryptoConfig) -> Arc<CryptoConfig> {
        let config = Arc::new(config);
        *self.0.write() = Some(Arc::clone(&config));
        config
    }

    #[inline]
    pub fn clear(&self) {
        *self.0.write() = None;
    }

    #[must_use]
    #[inline]
    pub fn get(&self) -> Option<Arc<CryptoConfig>> {
        self.0.read().clone()
    }
}

/// Adds the auth token header to `base` when a session key is active.
#[must_use]
#[inline]
pub fn authorized_request_headers(config: Option<&CryptoConfig>, mut base: HeaderMap) -> HeaderMap {
    if let Some(config) = config {
        base.insert(AUTH_KEY_HEADER_NAME.clone(), config.auth_header.clone());
    }
    base
}

/// Sets the `auth` query parameter of `url` when a session key is active.
/// An existing `auth` parameter is replaced; other parameters are kept in order.
#[must_use]
#[inline]
pub fn authorized_url(config: Option<&CryptoConfig>, mut url: Url) -> Url {
    let Some(config) = config else {
        return url;
    };
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != AUTH_QUERY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(AUTH_QUERY_PARAM, &config.auth_key_url());
    url
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use {super::*, reqwest::header::CONTENT_TYPE, webdrop_protocol::credentials::AUTH_TOKEN_LENGTH};

    fn config() -> CryptoConfig {
        CryptoConfig::new(
            MasterKey::import(&[1; 32]).unwrap(),
            AuthToken::from_bytes([0xfb; AUTH_TOKEN_LENGTH]),
        )
        .unwrap()
    }

    #[test]
    fn headers_without_config() {
        let mut base = HeaderMap::new();
        base.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let headers = authorized_request_headers(None, base.clone());
        assert_eq!(headers, base);
    }

    #[test]
    fn headers_with_config() {
        let mut base = HeaderMap::new();
        base.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let config = config();
        let headers = authorized_request_headers(Some(&config), base);
        assert_eq!(headers.len(), 2);
        let value = headers.get(AUTH_KEY_HEADER).unwrap();
        assert_eq!(value, config.auth_key().as_str());
        assert!(value.is_sensitive());
    }

    #[test]
    fn url_without_config() {
        let url = Url::parse("https://drop.example/s/1/2/a.png?x=1").unwrap();
        assert_eq!(authorized_url(None, url.clone()), url);
    }

    #[test]
    fn url_with_config() {
        let config = config();
        let url = authorized_url(
            Some(&config),
            Url::parse("https://drop.example/s/1/2/a.png").unwrap(),
        );
        assert_eq!(
            url.as_str(),
            format!("https://drop.example/s/1/2/a.png?auth={}", config.auth_key_url()),
        );

        let url = authorized_url(
            Some(&config),
            Url::parse("https://drop.example/s/1?x=1&auth=old&y=2").unwrap(),
        );
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("x".to_owned(), "1".to_owned()),
                ("y".to_owned(), "2".to_owned()),
                ("auth".to_owned(), config.auth_key_url()),
            ],
        );
    }

    #[test]
    fn slot_last_write_wins() {
        let slot = CryptoSlot::new();
        assert!(slot.get().is_none());
        let first = slot.set(config());
        assert_eq!(slot.get().unwrap().auth_key(), first.auth_key());
        let second = CryptoConfig::new(
            MasterKey::import(&[2; 32]).unwrap(),
            AuthToken::from_bytes([1; AUTH_TOKEN_LENGTH]),
        )
        .unwrap();
        slot.set(second);
        assert_ne!(slot.get().unwrap().auth_key(), first.auth_key());
        // Snapshots taken earlier stay valid.
        assert_eq!(first.auth_key(), config().auth_key());
        slot.clear();
        assert!(slot.get().is_none());
    }
}
