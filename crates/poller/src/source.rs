use serde_json::Value;

use watch_common::error::WatchError;

/// Provider of raw homework-status payloads.
pub trait HomeworkSource {
    /// Fetch every status change recorded since `since` (Unix seconds).
    ///
    /// Network failures map to `WatchError::Transport`; a non-success reply or
    /// an undecodable body maps to `WatchError::Protocol`.
    fn fetch(&self, since: i64) -> impl Future<Output = Result<Value, WatchError>> + Send;
}
