use {
    anyhow::{Result, anyhow},
    serde::{Deserialize, Serialize},
    std::{path::PathBuf, time::Duration},
    url::Url,
    webdrop_sdk::client::DEFAULT_TIMEOUT,
};

/// Client settings. Holds no secrets: session keys only come from the command line
/// or a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server_url: Url,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_log_filter() -> String {
    "info".into()
}

fn default_request_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Config {
    #[inline]
    pub fn parse(text: &str) -> Result<Self> {
        Ok(json5::from_str(text)?)
    }

    #[inline]
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => default_config_path()?,
        };
        Self::parse(&fs_err::read_to_string(path)?)
    }
}

#[inline]
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| anyhow!("cannot find config dir"))?;
    Ok(config_dir.join("webdrop.json5"))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test")]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse(
            r#"{
                // comments are allowed
                server_url: "https://drop.example/",
            }"#,
        )
        .unwrap();
        assert_eq!(config.server_url.as_str(), "https://drop.example/");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn explicit_values() {
        let config = Config::parse(
            r#"{
                server_url: "http://localhost:8080",
                log_filter: "webdrop_sdk=debug,info",
                request_timeout: "1m 30s",
            }"#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "webdrop_sdk=debug,info");
        assert_eq!(config.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn server_url_is_required() {
        Config::parse("{}").unwrap_err();
        Config::parse(r#"{ server_url: "not a url" }"#).unwrap_err();
    }
}
