use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Review status of a homework submission as reported by the grading API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    Approved,
    Reviewing,
    Rejected,
}

impl StatusCode {
    pub const ALL: [StatusCode; 3] = [
        StatusCode::Approved,
        StatusCode::Reviewing,
        StatusCode::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Approved => "approved",
            StatusCode::Reviewing => "reviewing",
            StatusCode::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatusCode {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(StatusCode::Approved),
            "reviewing" => Ok(StatusCode::Reviewing),
            "rejected" => Ok(StatusCode::Rejected),
            other => Err(WatchError::UnknownStatus(other.to_string())),
        }
    }
}

/// One homework entry from the `homeworks` array.
///
/// Fields stay optional and the status stays raw: presence and validity are
/// checked when the record is translated, so a bad record fails loudly
/// instead of being dropped during decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "homework_name", alias = "name")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// How the checkpoint moves after a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointPolicy {
    /// Prefer the `current_date` returned by the API, fall back to local time.
    #[default]
    Server,
    /// Always use local wall-clock time.
    Now,
}

impl std::fmt::Display for CheckpointPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointPolicy::Server => write!(f, "server"),
            CheckpointPolicy::Now => write!(f, "now"),
        }
    }
}

impl std::str::FromStr for CheckpointPolicy {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(CheckpointPolicy::Server),
            "now" => Ok(CheckpointPolicy::Now),
            other => Err(WatchError::Config(format!(
                "CHECKPOINT_POLICY must be `server` or `now`, got `{}`",
                other
            ))),
        }
    }
}

/// Lower bound (Unix seconds) of the next fetch window. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(i64);

impl Checkpoint {
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Checkpoint `offset_secs` before the current wall-clock time.
    pub fn starting_before_now(offset_secs: u64) -> Self {
        Self(unix_now().saturating_sub(offset_secs as i64))
    }

    pub fn timestamp(&self) -> i64 {
        self.0
    }

    /// Move forward to `candidate`; a smaller candidate leaves the value as is.
    /// Returns `true` when the checkpoint changed.
    pub fn advance_to(&mut self, candidate: i64) -> bool {
        if candidate > self.0 {
            self.0 = candidate;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_parse_known() {
        for code in StatusCode::ALL {
            assert_eq!(code.as_str().parse::<StatusCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_status_code_parse_unknown() {
        let err = "pending".parse::<StatusCode>().unwrap_err();
        assert_eq!(err, WatchError::UnknownStatus("pending".to_string()));
    }

    #[test]
    fn test_homework_record_accepts_wire_and_short_name() {
        let wire: HomeworkRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "homework_name": "hw05_final",
            "status": "approved"
        }))
        .unwrap();
        assert_eq!(wire.name.as_deref(), Some("hw05_final"));
        assert_eq!(wire.id, Some(7));

        let short: HomeworkRecord =
            serde_json::from_value(serde_json::json!({"name": "X", "status": "rejected"}))
                .unwrap();
        assert_eq!(short.name.as_deref(), Some("X"));
        assert_eq!(short.id, None);
    }

    #[test]
    fn test_checkpoint_never_moves_backwards() {
        let mut checkpoint = Checkpoint::new(1000);
        assert!(!checkpoint.advance_to(900));
        assert_eq!(checkpoint.timestamp(), 1000);
        assert!(checkpoint.advance_to(1500));
        assert_eq!(checkpoint.timestamp(), 1500);
    }

    #[test]
    fn test_checkpoint_starting_before_now() {
        let before = unix_now();
        let checkpoint = Checkpoint::starting_before_now(600);
        assert!(checkpoint.timestamp() <= before - 600 + 1);
        assert!(checkpoint.timestamp() >= before - 601);
    }

    #[test]
    fn test_checkpoint_policy_parse() {
        assert_eq!("server".parse::<CheckpointPolicy>().unwrap(), CheckpointPolicy::Server);
        assert_eq!(" NOW ".parse::<CheckpointPolicy>().unwrap(), CheckpointPolicy::Now);
        assert!("latest".parse::<CheckpointPolicy>().is_err());
    }
}
