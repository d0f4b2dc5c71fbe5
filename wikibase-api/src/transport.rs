//! API transport abstraction.
//!
//! The write pipeline and entity reads speak to the MediaWiki action API only
//! through [`ApiTransport`], so the HTTP client can be swapped for the
//! scripted [`mock::MockTransport`] in tests.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Form fields of one API request.
pub type Payload = BTreeMap<String, String>;

/// Token sent in place of an edit token for anonymous requests.
pub const ANONYMOUS_TOKEN: &str = "+\\";

/// Credentials of a logged-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct Login {
    pub username: String,
    /// CSRF token attached to every authenticated request.
    pub edit_token: String,
}

impl Login {
    pub fn new(username: impl Into<String>, edit_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            edit_token: edit_token.into(),
        }
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .field("edit_token", &"<redacted>")
            .finish()
    }
}

/// Performs one request against a MediaWiki action API endpoint.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends `payload` to `endpoint` and returns the decoded JSON body.
    ///
    /// Bodies carrying an API-level `error` object are returned as `Ok`; the
    /// caller classifies them. Without a `login`, the request is only made
    /// when `allow_anonymous` is set.
    async fn call(
        &self,
        payload: &Payload,
        endpoint: &str,
        login: Option<&Login>,
        allow_anonymous: bool,
    ) -> Result<Value, TransportError>;
}

/// A mock transport for testing.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    /// One request seen by a [`MockTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub payload: Payload,
        pub endpoint: String,
        pub login: Option<Login>,
        pub allow_anonymous: bool,
    }

    /// Answers calls from a queue of scripted responses and records every call.
    ///
    /// A call made with the queue empty fails with [`TransportError::Network`].
    #[derive(Debug, Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<Result<Value, TransportError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a transport that answers its first call with `response`.
        pub fn replying(response: Value) -> Self {
            let transport = Self::new();
            transport.push_response(response);
            transport
        }

        /// Queues a response body.
        pub fn push_response(&self, response: Value) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Ok(response));
        }

        /// Queues a transport failure.
        pub fn push_error(&self, error: TransportError) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Err(error));
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        pub fn last_call(&self) -> Option<RecordedCall> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn call(
            &self,
            payload: &Payload,
            endpoint: &str,
            login: Option<&Login>,
            allow_anonymous: bool,
        ) -> Result<Value, TransportError> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedCall {
                    payload: payload.clone(),
                    endpoint: endpoint.to_string(),
                    login: login.cloned(),
                    allow_anonymous,
                });
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
        }
    }
}
