//! `reqwest`-backed transport.

use crate::config::WbiConfig;
use crate::error::TransportError;
use crate::transport::{ANONYMOUS_TOKEN, ApiTransport, Login, Payload};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Posts payloads as `application/x-www-form-urlencoded` to the action API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the configured user agent and timeout.
    pub fn new(config: &WbiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn call(
        &self,
        payload: &Payload,
        endpoint: &str,
        login: Option<&Login>,
        allow_anonymous: bool,
    ) -> Result<Value, TransportError> {
        let mut form = payload.clone();
        let token = match login {
            Some(login) => login.edit_token.clone(),
            None if allow_anonymous => ANONYMOUS_TOKEN.to_string(),
            None => return Err(TransportError::AnonymousNotAllowed),
        };
        form.insert("token".to_string(), token);

        debug!(
            endpoint,
            action = payload.get("action").map(String::as_str),
            anonymous = login.is_none(),
            "calling MediaWiki API"
        );

        let response = self.client.post(endpoint).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
