mod session;

pub use self::session::{activate_session, create_encrypted_session, join_session};
use {
    crate::{
        context::{CryptoConfig, CryptoSlot, authorized_request_headers, authorized_url},
        crypto::{maybe_decrypt_object, maybe_encrypt_upload},
    },
    anyhow::{Error, Result, format_err},
    futures::future::try_join_all,
    reqwest::{
        Method, Url,
        header::{CONTENT_TYPE, HeaderMap, HeaderValue},
    },
    serde::{Serialize, de::DeserializeOwned},
    std::{future::Future, sync::Arc, time::Duration},
    tokio::time::sleep,
    tracing::{debug, instrument, warn},
    webdrop_protocol::{
        CreateSession, FileObject, ObjectId, Session, SessionId, Upload, endpoints,
    },
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Session API client.
///
/// Clones share the connection pool and the active session key, so a key set through
/// one clone is used by all of them.
#[derive(Debug, Clone)]
pub struct Client {
    reqwest: reqwest::Client,
    server_url: Url,
    crypto: Arc<CryptoSlot>,
}

impl Client {
    #[inline]
    pub fn new(mut server_url: Url, timeout: Duration) -> Result<Self> {
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }
        Ok(Self {
            server_url,
            crypto: Arc::new(CryptoSlot::new()),
            reqwest: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    #[must_use]
    #[inline]
    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Key of the active session, if it is encrypted and has been activated.
    #[must_use]
    #[inline]
    pub fn crypto(&self) -> Option<Arc<CryptoConfig>> {
        self.crypto.get()
    }

    #[inline]
    pub fn set_crypto(&self, config: CryptoConfig) -> Arc<CryptoConfig> {
        self.crypto.set(config)
    }

    #[inline]
    pub fn clear_crypto(&self) {
        self.crypto.clear();
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.server_url.join(path)?)
    }

    #[instrument(skip(self, config, body), fields(authorized = config.is_some()))]
    #[inline(never)]
    async fn send(
        &self,
        method: Method,
        path: &str,
        config: Option<&CryptoConfig>,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        let mut headers = HeaderMap::new();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let headers = authorized_request_headers(config, headers);
        let bytes = ok_or_retry(|| async {
            let mut request = self
                .reqwest
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = &body {
                request = request.body(body.clone());
            }
            request
                .send()
                .await
                .map_err(RequestError::transport)?
                .error_for_status()
                .map_err(RequestError::application)?
                .bytes()
                .await
                .map_err(RequestError::transport)
        })
        .await?;
        debug!(len = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: Option<&CryptoConfig>,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T> {
        let body = body.map(serde_json::to_vec).transpose()?;
        let bytes = self.send(method, path, config, body).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| format_err!("invalid response from {path}: {err}"))
    }

    /// Creates a session. `crypto` is `None` for a plaintext session.
    #[inline]
    pub async fn create_session(&self, crypto: Option<&CreateSession>) -> Result<Session> {
        self.request(Method::POST, endpoints::SESSIONS, None, crypto)
            .await
    }

    /// Fetches the session record. Not authorized: the KDF parameters inside are
    /// needed before any key exists.
    #[inline]
    pub async fn get_session(&self, sid: SessionId) -> Result<Session> {
        self.request(Method::GET, &endpoints::session(sid), None, None::<&()>)
            .await
    }

    /// Lists the objects of a session, decrypted with the active key.
    #[inline]
    pub async fn get_objects(&self, sid: SessionId) -> Result<Vec<FileObject>> {
        let config = self.crypto();
        let config = config.as_deref();
        let objects: Vec<FileObject> = self
            .request(Method::GET, &endpoints::objects(sid), config, None::<&()>)
            .await?;
        let objects =
            try_join_all(objects.into_iter().map(|obj| maybe_decrypt_object(config, obj)))
                .await?;
        Ok(objects)
    }

    #[inline]
    pub async fn get_object(&self, sid: SessionId, oid: ObjectId) -> Result<FileObject> {
        let config = self.crypto();
        let config = config.as_deref();
        let obj = self
            .request(Method::GET, &endpoints::object(sid, oid), config, None::<&()>)
            .await?;
        Ok(maybe_decrypt_object(config, obj).await?)
    }

    /// Stores `upload` in the session, encrypting it first when a key is active.
    /// Returns the stored object as the owner sees it, i.e. decrypted.
    #[inline]
    pub async fn create_object(&self, sid: SessionId, upload: Upload) -> Result<FileObject> {
        let config = self.crypto();
        let config = config.as_deref();
        let upload = maybe_encrypt_upload(config, upload).await?;
        let obj = self
            .request(Method::POST, &endpoints::session(sid), config, Some(&upload))
            .await?;
        Ok(maybe_decrypt_object(config, obj).await?)
    }

    #[inline]
    pub async fn delete_object(&self, sid: SessionId, oid: ObjectId) -> Result<()> {
        let config = self.crypto();
        self.send(
            Method::DELETE,
            &endpoints::object(sid, oid),
            config.as_deref(),
            None,
        )
        .await?;
        Ok(())
    }

    #[inline]
    pub async fn delete_session(&self, sid: SessionId) -> Result<()> {
        let config = self.crypto();
        self.send(
            Method::DELETE,
            &endpoints::session(sid),
            config.as_deref(),
            None,
        )
        .await?;
        Ok(())
    }

    /// Link to the raw bytes of a file object, usable without custom headers.
    #[inline]
    pub fn download_url(&self, sid: SessionId, oid: ObjectId, name: &str) -> Result<Url> {
        let mut url = self.url(&endpoints::download_dir(sid, oid))?;
        url.path_segments_mut()
            .map_err(|()| format_err!("failed server URL extension"))?
            .pop_if_empty()
            .push(name);
        Ok(authorized_url(self.crypto().as_deref(), url))
    }

    /// Share link of a session. For encrypted sessions the fragment carries the
    /// password; browsers never send it to the server.
    #[inline]
    pub fn share_url(&self, sid: SessionId, fragment: Option<&str>) -> Result<Url> {
        let mut url = self.url(&endpoints::share_page(sid))?;
        url.set_fragment(fragment);
        Ok(url)
    }
}

/// Retries the request if an error arises due to the transport.
async fn ok_or_retry<T, F, Fut>(mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    const NUM_RETRIES: usize = 3;
    const RETRY_PERIOD: Duration = Duration::from_secs(2);
    let mut attempt = 0_usize;
    loop {
        attempt = attempt.saturating_add(1);
        let transport_err = match f().await {
            Ok(x) => break Ok(x),
            Err(RequestError::Application(err)) => break Err(err),
            Err(RequestError::Transport(err)) => err,
        };
        if attempt >= NUM_RETRIES {
            break Err(transport_err);
        }
        warn!(error = %transport_err, attempt, "transport failed, will retry");
        sleep(RETRY_PERIOD).await;
    }
}

enum RequestError {
    Transport(Error),
    Application(Error),
}

impl RequestError {
    fn application(err: impl Into<Error>) -> Self {
        Self::Application(err.into())
    }

    fn transport(err: impl Into<Error>) -> Self {
        Self::Transport(err.into())
    }
}

impl From<RequestError> for Error {
    #[inline]
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Transport(err) | RequestError::Application(err) => err,
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use {
        super::*,
        crate::crypto::MasterKey,
        std::sync::atomic::{AtomicUsize, Ordering},
        webdrop_protocol::{AuthToken, credentials::AUTH_TOKEN_LENGTH},
    };

    fn client() -> Client {
        Client::new(
            Url::parse("https://drop.example/base").unwrap(),
            DEFAULT_TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn server_url_gets_trailing_slash() {
        assert_eq!(client().server_url().as_str(), "https://drop.example/base/");
        assert_eq!(
            client().url(&endpoints::session(SessionId(5))).unwrap().as_str(),
            "https://drop.example/base/api/session/5",
        );
    }

    #[test]
    fn download_url_plain_and_authorized() {
        let client = client();
        let url = client
            .download_url(SessionId(1), ObjectId(2), "my file?.txt")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://drop.example/base/s/1/2/my%20file%3F.txt"
        );

        let config = client.set_crypto(
            CryptoConfig::new(
                MasterKey::import(&[0; 32]).unwrap(),
                AuthToken::from_bytes([0xff; AUTH_TOKEN_LENGTH]),
            )
            .unwrap(),
        );
        // Clones share the key.
        let url = client
            .clone()
            .download_url(SessionId(1), ObjectId(2), "a.txt")
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://drop.example/base/s/1/2/a.txt?auth={}",
                config.auth_key_url()
            ),
        );
        client.clear_crypto();
        assert!(client.crypto().is_none());
    }

    #[test]
    fn share_url_fragment() {
        let url = client().share_url(SessionId(3), Some("c2VjcmV0")).unwrap();
        assert_eq!(url.as_str(), "https://drop.example/base/s/3#c2VjcmV0");
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transport_errors_only() {
        let transport_calls = AtomicUsize::new(0);
        let calls = &transport_calls;
        ok_or_retry(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(RequestError::transport(format_err!("connection reset")))
        })
        .await
        .unwrap_err();
        assert_eq!(transport_calls.load(Ordering::SeqCst), 3);

        let application_calls = AtomicUsize::new(0);
        let calls = &application_calls;
        ok_or_retry(|| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(RequestError::application(format_err!("403 Forbidden")))
        })
        .await
        .unwrap_err();
        assert_eq!(application_calls.load(Ordering::SeqCst), 1);
    }
}
