pub mod cli;
pub mod config;

use {
    anyhow::{Result, bail},
    cli::{Cli, Command},
    config::Config,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt},
    webdrop_protocol::{Content, FileObject, SessionId, Upload, codec},
    webdrop_sdk::{
        client::{Client, create_encrypted_session, join_session},
        context::CryptoConfig,
        crypto::{KdfParams, Password},
    },
};

#[inline]
pub fn setup_logger(log_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .with(EnvFilter::try_new(log_filter)?)
        .init();
    Ok(())
}

#[inline]
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let Cli { key, command, .. } = cli;
    let client = Client::new(config.server_url, config.request_timeout)?;
    match command {
        Command::NewSession { plain } => new_session(&client, plain).await?,
        Command::Ls { session } => {
            open_session(&client, session, key).await?;
            let objects = client.get_objects(session).await?;
            if objects.is_empty() {
                info!("session {session} is empty");
            }
            for obj in &objects {
                info!("{}", describe(&client, session, obj));
            }
        }
        Command::SendText { session, text } => {
            open_session(&client, session, key).await?;
            let obj = client.create_object(session, Upload::text(text)).await?;
            info!("created object {}", obj.id);
        }
        Command::SendLink {
            session,
            url,
            title,
        } => {
            open_session(&client, session, key).await?;
            let title = title.unwrap_or_else(|| url.to_string());
            let obj = client
                .create_object(session, Upload::link(url, title))
                .await?;
            info!("created object {}", obj.id);
        }
        Command::Rm { session, object } => {
            open_session(&client, session, key).await?;
            client.delete_object(session, object).await?;
            info!("deleted object {object}");
        }
        Command::RmSession { session } => {
            open_session(&client, session, key).await?;
            client.delete_session(session).await?;
            info!("deleted session {session}");
        }
        Command::Derive { salt, iterations } => derive(key, &salt, iterations).await?,
    }
    Ok(())
}

async fn new_session(client: &Client, plain: bool) -> Result<()> {
    let (session, fragment) = if plain {
        (client.create_session(None).await?, None)
    } else {
        let password = Password::generate()?;
        let (session, _) = create_encrypted_session(client, &password).await?;
        (session, Some(password.to_fragment()))
    };
    info!("session {}", session.id);
    info!(
        "share link: {}",
        client.share_url(session.id, fragment.as_deref())?
    );
    Ok(())
}

/// Fetches the session and activates its key if it is encrypted.
async fn open_session(client: &Client, sid: SessionId, key: Option<String>) -> Result<()> {
    let session = client.get_session(sid).await?;
    if session.is_encrypted() {
        let password = session_password(key)?;
        join_session(client, &session, &password).await?;
    } else if key.is_some() {
        warn!("session {sid} is not encrypted, ignoring the key");
    }
    Ok(())
}

fn session_password(key: Option<String>) -> Result<Password> {
    let key = match key {
        Some(key) => key,
        None => rpassword::prompt_password("Session key: ")?,
    };
    let fragment = key_fragment(key.trim());
    if fragment.is_empty() {
        bail!("no key provided");
    }
    Ok(Password::from_fragment(fragment)?)
}

/// Accepts a bare key or a whole share link.
fn key_fragment(key: &str) -> &str {
    key.rsplit_once('#').map_or(key, |(_, fragment)| fragment)
}

async fn derive(key: Option<String>, salt: &str, iterations: Option<u32>) -> Result<()> {
    let password = session_password(key)?;
    let mut params = KdfParams::with_salt(codec::decode(salt)?);
    if let Some(iterations) = iterations {
        params.iterations = iterations;
    }
    let (config, params) = CryptoConfig::derive(&password, Some(params)).await?;
    info!("kdf params: {}", serde_json::to_string(&params.encode())?);
    info!("auth header: {}", config.auth_key());
    info!("auth query: {}", config.auth_key_url());
    Ok(())
}

fn describe(client: &Client, sid: SessionId, obj: &FileObject) -> String {
    let summary = match &obj.content {
        Content::Text { data } => format!("{data:?}"),
        Content::Link { url, title } if title == url => url.clone(),
        Content::Link { url, title } => format!("{title} <{url}>"),
        Content::File { name } => match client.download_url(sid, obj.id, name) {
            Ok(url) => format!("{name} {url}"),
            Err(err) => format!("{name} (no download link: {err})"),
        },
        Content::Ciphertext(_) => "<encrypted, key required>".into(),
    };
    format!("{} {} {} {summary}", obj.id, obj.timestamp, obj.mime)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use {
        super::*,
        webdrop_protocol::ObjectId,
        webdrop_sdk::client::DEFAULT_TIMEOUT,
    };

    fn object(mime: &str, content: Content) -> FileObject {
        FileObject {
            id: ObjectId(9),
            mime: mime.into(),
            timestamp: "2024-06-03T10:00:00Z".parse().unwrap(),
            content,
        }
    }

    #[test]
    fn key_from_link_or_fragment() {
        assert_eq!(key_fragment("c2VjcmV0"), "c2VjcmV0");
        assert_eq!(key_fragment("https://drop.example/s/1#c2VjcmV0"), "c2VjcmV0");
        assert_eq!(
            session_password(Some("#c2VjcmV0".into()))
                .unwrap()
                .as_bytes(),
            b"secret"
        );
        session_password(Some("https://drop.example/s/1#".into())).unwrap_err();
    }

    #[test]
    fn describe_objects() {
        let client = Client::new("https://drop.example/".parse().unwrap(), DEFAULT_TIMEOUT).unwrap();
        let sid = SessionId(1);
        assert_eq!(
            describe(
                &client,
                sid,
                &object("text/plain", Content::Text { data: "hi".into() })
            ),
            "9 2024-06-03 10:00:00 UTC text/plain \"hi\""
        );
        assert_eq!(
            describe(
                &client,
                sid,
                &object(
                    "text/uri-list",
                    Content::Link {
                        url: "https://a.example/".into(),
                        title: "A".into()
                    }
                )
            ),
            "9 2024-06-03 10:00:00 UTC text/uri-list A <https://a.example/>"
        );
        assert_eq!(
            describe(
                &client,
                sid,
                &object("image/png", Content::File { name: "a.png".into() })
            ),
            "9 2024-06-03 10:00:00 UTC image/png a.png https://drop.example/s/1/9/a.png"
        );
    }
}
