use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Connection settings for the backend API
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the backend
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Session id from a previous login, sent as the `sid` cookie
    #[serde(default)]
    pub session_id: Option<SecretString>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_id: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL must parse")
}
