//! The platform HTTP client.
//!
//! Endpoints: `POST /add_message`, `POST /add_error_message`,
//! `GET /get_em_message`, with JSON bodies of the form `{"text": …}`.
//! Reachability is probed once with `HEAD /` when the client is built and
//! latched: an offline client silently no-ops every send. The client is an
//! owned value injected by the session; its lifetime is the session's.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::Result;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

/// Blocking client for the evaluation platform API.
pub struct PlatformClient {
    base_url: String,
    http: Client,
    online: bool,
}

impl PlatformClient {
    /// Build a client against `base_url` and probe it once.
    ///
    /// An unreachable platform is not an error: the client comes back
    /// offline and every send becomes a no-op.
    ///
    /// # Errors
    /// [`crate::PlatformError::Http`] only when the HTTP client itself
    /// cannot be constructed.
    pub fn connect(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let http = Client::builder().timeout(PROBE_TIMEOUT).build()?;
        let online = Self::probe(&http, &base_url);
        if online {
            info!(%base_url, "evaluation platform online");
        } else {
            info!(%base_url, "evaluation platform unreachable, messages will be dropped");
        }
        Ok(Self {
            base_url,
            http,
            online,
        })
    }

    /// A client that is offline by configuration: no probe, every call a
    /// no-op.
    ///
    /// # Errors
    /// [`crate::PlatformError::Http`] only when the HTTP client itself
    /// cannot be constructed.
    pub fn disabled() -> Result<Self> {
        Ok(Self {
            base_url: String::new(),
            http: Client::builder().timeout(PROBE_TIMEOUT).build()?,
            online: false,
        })
    }

    fn probe(http: &Client, base_url: &str) -> bool {
        http.head(format!("{base_url}/"))
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }

    /// Whether the construction-time probe succeeded.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Send a free-text message. No-op when offline.
    ///
    /// # Errors
    /// [`crate::PlatformError::Http`] when online and the POST fails.
    pub fn send_message(&self, text: &str) -> Result<()> {
        if !self.online {
            return Ok(());
        }
        self.http
            .post(format!("{}/add_message", self.base_url))
            .json(&json!({ "text": text }))
            .send()?
            .error_for_status()?;
        debug!(text, "platform message sent");
        Ok(())
    }

    /// Send an error message. No-op when offline.
    ///
    /// # Errors
    /// [`crate::PlatformError::Http`] when online and the POST fails.
    pub fn send_error_message(&self, text: &str, error_type: &str) -> Result<()> {
        if !self.online {
            return Ok(());
        }
        self.http
            .post(format!("{}/add_error_message", self.base_url))
            .json(&json!({ "text": text, "error_type": error_type }))
            .send()?
            .error_for_status()?;
        debug!(text, error_type, "platform error message sent");
        Ok(())
    }

    /// Fetch the next message the platform holds for this session. An
    /// offline client returns an empty string.
    ///
    /// # Errors
    /// [`crate::PlatformError::Http`] when online and the GET fails.
    pub fn receive_message(&self) -> Result<String> {
        if !self.online {
            return Ok(String::new());
        }
        let body: MessageBody = self
            .http
            .get(format!("{}/get_em_message", self.base_url))
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_client_no_ops() {
        let client = PlatformClient::disabled().expect("client");
        assert!(!client.is_online());
        client.send_message("hello").expect("no-op send");
        client
            .send_error_message("boom", "desync")
            .expect("no-op error send");
        assert_eq!(client.receive_message().expect("no-op receive"), "");
    }
}
