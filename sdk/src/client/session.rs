use {
    crate::{
        client::Client,
        context::CryptoConfig,
        crypto::{KdfParams, Password},
    },
    anyhow::Result,
    std::sync::Arc,
    tracing::info,
    webdrop_protocol::{CreateSession, Session, SessionId},
};

/// Fetches the session and, if it is encrypted, derives its key from `password` and
/// makes it the client's active key.
///
/// Returns `None` for a plaintext session; the client's key is cleared in that case.
#[inline]
pub async fn activate_session(
    client: &Client,
    sid: SessionId,
    password: &Password,
) -> Result<Option<Arc<CryptoConfig>>> {
    let session = client.get_session(sid).await?;
    join_session(client, &session, password).await
}

/// Same as [`activate_session`] for a session record the caller already has.
#[inline]
pub async fn join_session(
    client: &Client,
    session: &Session,
    password: &Password,
) -> Result<Option<Arc<CryptoConfig>>> {
    let Some(crypto) = &session.crypto else {
        info!(sid = %session.id, "session is not encrypted");
        client.clear_crypto();
        return Ok(None);
    };
    let params = KdfParams::decode(&crypto.kdf_params)?;
    let (config, _) = CryptoConfig::derive(password, Some(params)).await?;
    info!(sid = %session.id, "session key activated");
    Ok(Some(client.set_crypto(config)))
}

/// Creates an encrypted session protected by `password` and activates its key.
///
/// Only the auth token and the KDF parameters reach the server.
#[inline]
pub async fn create_encrypted_session(
    client: &Client,
    password: &Password,
) -> Result<(Session, Arc<CryptoConfig>)> {
    let (config, params) = CryptoConfig::derive(password, None).await?;
    let request = CreateSession {
        auth_key: config.auth_key(),
        kdf_params: params.encode(),
    };
    let session = client.create_session(Some(&request)).await?;
    info!(sid = %session.id, "created encrypted session");
    Ok((session, client.set_crypto(config)))
}
