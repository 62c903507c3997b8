//! Endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where to reach the chat-bot server.
///
/// Serde-derived so applications can embed it in whatever configuration
/// layer they use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEndpoint {
    /// Websocket URL, e.g. `ws://127.0.0.1:6700`.
    pub url: String,

    /// Carried as a bearer credential during connection setup when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl WsEndpoint {
    /// Endpoint without credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Attach a bearer access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}
