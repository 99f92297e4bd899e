use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use watch_common::error::WatchError;

use crate::Notifier;

/// Telegram Bot API client bound to a single chat.
pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Config(format!("failed to build Telegram client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Turn a Bot API response into `Ok(())` or a `Delivery` error.
    async fn check_reply(method: &str, response: reqwest::Response) -> Result<(), WatchError> {
        let status = response.status();
        let reply: Option<ApiReply> = response.json().await.ok();

        match reply {
            Some(ApiReply { ok: true, .. }) if status.is_success() => Ok(()),
            Some(ApiReply { description, .. }) => Err(WatchError::Delivery(format!(
                "{} failed with HTTP {}: {}",
                method,
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(WatchError::Delivery(format!(
                "{} failed with HTTP {}: unreadable reply",
                method,
                status.as_u16()
            ))),
        }
    }

    // reqwest embeds the request URL (and with it the bot token) in its
    // error text, so it is stripped before the error leaves this module.
    fn transport_error(method: &str, error: reqwest::Error) -> WatchError {
        let error = error.without_url();
        if error.is_timeout() {
            WatchError::Delivery(format!("{} timed out", method))
        } else {
            WatchError::Delivery(format!("{} request failed: {}", method, error))
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn handshake(&self) -> Result<(), WatchError> {
        let response = self
            .client
            .get(self.method_url("getChat"))
            .query(&[("chat_id", self.chat_id.as_str())])
            .send()
            .await
            .map_err(|e| Self::transport_error("getChat", e))?;

        Self::check_reply("getChat", response).await?;
        tracing::info!(chat_id = %self.chat_id, "Telegram chat reachable");
        Ok(())
    }

    async fn notify(&self, text: &str) -> Result<(), WatchError> {
        tracing::debug!(chat_id = %self.chat_id, "Sending Telegram message");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| Self::transport_error("sendMessage", e))?;

        Self::check_reply("sendMessage", response).await?;
        tracing::info!(chat_id = %self.chat_id, message = %text, "Telegram message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(api_url: &str) -> TelegramNotifier {
        TelegramNotifier::new(api_url, "123:abc", "42", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_method_url_trims_trailing_slash() {
        let notifier = notifier("https://api.telegram.org/");
        assert_eq!(
            notifier.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_send_message_body() {
        let body = serde_json::to_value(SendMessageRequest {
            chat_id: "42",
            text: "hello",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"chat_id": "42", "text": "hello"}));
    }

    #[test]
    fn test_api_reply_decodes_failure_description() {
        let reply: ApiReply = serde_json::from_value(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        }))
        .unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.description.as_deref(), Some("Bad Request: chat not found"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_delivery_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let notifier = notifier("http://127.0.0.1:9");
        let err = notifier.notify("hello").await.unwrap_err();
        assert!(matches!(err, WatchError::Delivery(_)));
        assert!(!err.to_string().contains("123:abc"));
    }
}
