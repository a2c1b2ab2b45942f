use std::time::Duration;

use ashikawa_core::{Config, Error, Method, Request, Result, Transport};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

/// ArangoDB REST API transport over HTTP
pub struct HttpTransport {
    config: Config,
    client: HttpClient,
}

/// Error body the server sends with non-2xx responses
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorMessage")]
    error_message: String,
}

impl HttpTransport {
    /// Create a transport for the server described by `config`
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(Error::request)?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: Request) -> Result<Value> {
        let url = self.config.api_url(&request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_ref());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(Error::request)?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error_message)
                .unwrap_or(text);
            tracing::debug!(status = status.as_u16(), %message, "Server returned an error");
            return Err(Error::Server {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(Error::request)?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
