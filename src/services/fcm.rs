// SPDX-License-Identifier: MIT

//! FCM HTTP v1 client for push notifications.
//!
//! Delivery is best-effort by contract: a failed send is logged and
//! swallowed so it never fails the document write that triggered it.
//!
//! Authenticates with an access token from the Cloud Run metadata server,
//! cached in memory until shortly before expiry.

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh the cached token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Notification title and body.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A multicast push request: one notification delivered to a set of devices.
#[derive(Debug, Clone)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: Notification,
    /// FCM requires string-valued data payloads.
    pub data: BTreeMap<String, String>,
}

impl MulticastMessage {
    /// Build a multicast request, dropping empty tokens and coercing every
    /// data value to its string representation.
    ///
    /// Returns `None` when no valid token remains; sending to nobody is a
    /// no-op, not an error.
    pub fn build(tokens: &[String], notification: Notification, data: &[(&str, Value)]) -> Option<Self> {
        let valid: Vec<String> = tokens
            .iter()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect();

        if valid.is_empty() {
            return None;
        }

        Some(Self {
            tokens: valid,
            notification,
            data: data
                .iter()
                .map(|(key, value)| ((*key).to_string(), stringify_value(value)))
                .collect(),
        })
    }
}

/// String representation FCM expects for data values. JSON strings are used
/// verbatim (no surrounding quotes); everything else uses its JSON form.
fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Access token response from the metadata server.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// FCM HTTP v1 client.
pub struct FcmClient {
    http: reqwest::Client,
    project_id: String,
    token: tokio::sync::Mutex<Option<CachedToken>>,
    offline: bool,
}

impl FcmClient {
    pub fn new(project_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_id: project_id.to_string(),
            token: tokio::sync::Mutex::new(None),
            offline: false,
        }
    }

    /// Create a mock FCM client for testing (offline mode).
    ///
    /// Sends are logged and dropped.
    pub fn new_mock() -> Self {
        Self {
            offline: true,
            ..Self::new("test-project")
        }
    }

    /// Deliver a notification to a set of device tokens, best-effort.
    ///
    /// Never propagates an error; failures are only visible in the logs.
    pub async fn send_to_tokens(
        &self,
        tokens: &[String],
        notification: Notification,
        data: &[(&str, Value)],
    ) {
        let Some(message) = MulticastMessage::build(tokens, notification, data) else {
            tracing::warn!("No valid device tokens, skipping notification");
            return;
        };

        if self.offline {
            tracing::debug!(
                tokens = message.tokens.len(),
                title = %message.notification.title,
                "Offline mode, dropping notification"
            );
            return;
        }

        match self.send_multicast(&message).await {
            Ok(success_count) => {
                tracing::info!(
                    success_count,
                    requested = message.tokens.len(),
                    "Notification delivered"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send FCM notification");
            }
        }
    }

    /// Send one message per token via the v1 `messages:send` endpoint and
    /// count successful deliveries. Per-token failures (stale tokens are
    /// routine) are logged at warn level and do not abort the rest.
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<usize, AppError> {
        let access_token = self.access_token().await?;
        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        );

        let mut success_count = 0;
        for device_token in &message.tokens {
            let body = serde_json::json!({
                "message": {
                    "token": device_token,
                    "notification": {
                        "title": message.notification.title,
                        "body": message.notification.body,
                    },
                    "data": message.data,
                }
            });

            match self
                .http
                .post(&url)
                .bearer_auth(&access_token)
                .json(&body)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    success_count += 1;
                }
                Ok(response) => {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    tracing::warn!(status = %status, detail = %detail, "FCM rejected token");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "FCM send request failed");
                }
            }
        }

        Ok(success_count)
    }

    /// Get a service-account access token, minting a fresh one from the
    /// metadata server when the cached token is close to expiry.
    async fn access_token(&self) -> Result<String, AppError> {
        // Local development override.
        if let Ok(token) = std::env::var("FCM_ACCESS_TOKEN") {
            return Ok(token);
        }

        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at > now {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| AppError::Messaging(format!("Metadata token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Messaging(format!(
                "Metadata token request returned HTTP {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| AppError::Messaging(format!("Metadata token parse error: {}", e)))?;

        let expires_at =
            now + Duration::seconds((token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0));
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}
