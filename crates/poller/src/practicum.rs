use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use watch_common::error::WatchError;

use crate::source::HomeworkSource;

/// Longest prefix of an error response body kept in the error text.
pub const MAX_ERROR_CONTENT_CHARS: usize = 512;

/// Client for the Practicum homework statuses endpoint.
pub struct PracticumClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Config(format!("failed to build API client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }
}

impl HomeworkSource for PracticumClient {
    async fn fetch(&self, since: i64) -> Result<Value, WatchError> {
        tracing::debug!(from_date = since, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", since)])
            .send()
            .await
            .map_err(|e| {
                // The URL carries `from_date`, which changes every cycle and
                // would make identical outages look like distinct failures.
                let e = e.without_url();
                if e.is_timeout() {
                    WatchError::Transport(format!("homework API request timed out: {}", e))
                } else {
                    WatchError::Transport(format!("homework API unreachable: {}", e))
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let content = response.text().await.unwrap_or_default();
            let content = truncate_content(&content, MAX_ERROR_CONTENT_CHARS);
            return Err(WatchError::Protocol(format!(
                "unexpected API response: http code = {}; reason = {}; content = {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                content
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WatchError::Protocol(format!("API response is not valid JSON: {}", e)))
    }
}

/// Cut `content` to at most `max_chars` characters, marking the cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}…", &content[..end]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content_keeps_short_bodies() {
        assert_eq!(truncate_content("not_authenticated", 512), "not_authenticated");
        assert_eq!(truncate_content("abc", 3), "abc");
    }

    #[test]
    fn test_truncate_content_cuts_on_char_boundary() {
        let body = "ы".repeat(10);
        let cut = truncate_content(&body, 4);
        assert_eq!(cut, "ыыыы…");
        assert_eq!(cut.chars().count(), 5);
    }
}
