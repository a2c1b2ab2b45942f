use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the server, without the `/_api` prefix
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_url() -> String {
    "http://localhost:8529".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Read the connection settings from `ARANGODB_*` variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup("ARANGODB_URL").unwrap_or_else(|| {
            let port = lookup("ARANGODB_PORT").unwrap_or_else(|| "8529".to_string());
            format!("http://localhost:{}", port)
        });

        let (username, password) = if lookup("ARANGODB_DISABLE_AUTHENTIFICATION").is_some() {
            (None, None)
        } else {
            (
                Some(lookup("ARANGODB_USERNAME").unwrap_or_else(|| "root".to_string())),
                Some(lookup("ARANGODB_PASSWORD").unwrap_or_default()),
            )
        };

        Self {
            url,
            username,
            password,
            ..Self::default()
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}/_api{}", self.url.trim_end_matches('/'), path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            insecure_skip_verify: false,
        }
    }
}
