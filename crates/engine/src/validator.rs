//! Shape checks for the homework statuses payload.
//!
//! The API answers with `{"homeworks": [...], "current_date": <unix ts>}`.
//! An empty `homeworks` array means nothing changed in the polled window and
//! is a valid result.

use serde_json::{Map, Value};

use watch_common::error::WatchError;
use watch_common::types::{CheckpointPolicy, HomeworkRecord};

/// Validated payload: records to report plus the server-supplied checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResponse {
    pub homeworks: Vec<HomeworkRecord>,
    pub current_date: Option<i64>,
}

impl ValidatedResponse {
    /// Lower bound for the next fetch, given the local time `now`.
    pub fn next_checkpoint(&self, now: i64) -> i64 {
        self.current_date.unwrap_or(now)
    }

    /// Like [`Self::next_checkpoint`], honouring the configured policy.
    pub fn next_checkpoint_with(&self, policy: CheckpointPolicy, now: i64) -> i64 {
        match policy {
            CheckpointPolicy::Server => self.next_checkpoint(now),
            CheckpointPolicy::Now => now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    require_current_date: bool,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that rejects payloads without `current_date`.
    pub fn strict() -> Self {
        Self {
            require_current_date: true,
        }
    }

    pub fn require_current_date(mut self, required: bool) -> Self {
        self.require_current_date = required;
        self
    }

    pub fn validate(&self, raw: &Value) -> Result<ValidatedResponse, WatchError> {
        let object = raw.as_object().ok_or_else(|| {
            WatchError::MalformedResponse(format!(
                "expected a JSON object at the top level, got {}",
                json_kind(raw)
            ))
        })?;

        let homeworks = match object.get("homeworks") {
            None => return Err(WatchError::MissingField("homeworks".to_string())),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(WatchError::type_mismatch("homeworks", "an array")),
        };

        let current_date = self.current_date(object)?;

        let homeworks = homeworks
            .iter()
            .enumerate()
            .map(|(index, item)| Self::record(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedResponse {
            homeworks,
            current_date,
        })
    }

    fn current_date(&self, object: &Map<String, Value>) -> Result<Option<i64>, WatchError> {
        match object.get("current_date") {
            None | Some(Value::Null) if self.require_current_date => {
                Err(WatchError::MissingField("current_date".to_string()))
            }
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| WatchError::type_mismatch("current_date", "an integer timestamp")),
        }
    }

    fn record(index: usize, item: &Value) -> Result<HomeworkRecord, WatchError> {
        if !item.is_object() {
            return Err(WatchError::type_mismatch(
                format!("homeworks[{}]", index),
                "an object",
            ));
        }
        serde_json::from_value(item.clone()).map_err(|e| {
            tracing::debug!(index, error = %e, "Homework record failed to decode");
            WatchError::type_mismatch(
                format!("homeworks[{}]", index),
                "string `homework_name`/`status` and integer `id`",
            )
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
