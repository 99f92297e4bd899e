//! The polling control loop.
//!
//! Each cycle fetches everything newer than the checkpoint, validates it,
//! announces every status change in the chat, and reports failures through
//! the dedup gate. Whatever happens inside a cycle, the checkpoint advances
//! and the loop sleeps before the next one.

use std::time::Duration;

use watch_common::config::DEFAULT_POLL_INTERVAL_SECS;
use watch_common::error::WatchError;
use watch_common::types::{Checkpoint, CheckpointPolicy, unix_now};
use watch_engine::{NotificationGate, ResponseValidator, StatusTranslator};
use watch_notifier::Notifier;

use crate::source::HomeworkSource;

pub const DEFAULT_FAILURE_PREFIX: &str = "Сбой в работе программы: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Polling,
    Terminated,
}

/// What a single cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Status-change notifications delivered.
    pub delivered: usize,
    /// Failure text, when the cycle failed.
    pub failure: Option<String>,
    /// Whether the failure text reached the chat.
    pub failure_reported: bool,
    /// Checkpoint after the cycle.
    pub checkpoint: i64,
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Single-owner polling loop over a homework source and a chat notifier.
pub struct PollLoop<S, N> {
    source: S,
    notifier: N,
    validator: ResponseValidator,
    translator: StatusTranslator,
    gate: NotificationGate,
    checkpoint: Checkpoint,
    policy: CheckpointPolicy,
    poll_interval: Duration,
    failure_prefix: String,
    state: LoopState,
}

impl<S, N> PollLoop<S, N>
where
    S: HomeworkSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, checkpoint: Checkpoint) -> Self {
        Self {
            source,
            notifier,
            validator: ResponseValidator::new(),
            translator: StatusTranslator::default(),
            gate: NotificationGate::new(),
            checkpoint,
            policy: CheckpointPolicy::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            failure_prefix: DEFAULT_FAILURE_PREFIX.to_string(),
            state: LoopState::Polling,
        }
    }

    pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_translator(mut self, translator: StatusTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_policy(mut self, policy: CheckpointPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_failure_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failure_prefix = prefix.into();
        self
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }

    /// Verify the chat destination. A failure here terminates the loop.
    pub async fn start(&mut self) -> Result<(), WatchError> {
        if let Err(e) = self.notifier.handshake().await {
            tracing::error!(error = %e, "Chat handshake failed");
            self.state = LoopState::Terminated;
            return Err(e);
        }
        tracing::info!(
            checkpoint = %self.checkpoint,
            policy = %self.policy,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Poll loop started"
        );
        Ok(())
    }

    /// Run cycles forever. Only a failed startup handshake ends the loop;
    /// cancellation is up to the caller.
    pub async fn run(&mut self) -> Result<(), WatchError> {
        self.start().await?;

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One fetch → validate → translate → notify → advance pass.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let mut server_checkpoint = None;
        let result = self.process(&mut server_checkpoint).await;

        let (delivered, failure, failure_reported) = match result {
            Ok(delivered) => {
                self.gate.reset();
                (delivered, None, false)
            }
            Err((delivered, error)) => {
                let message = format!("{}{}", self.failure_prefix, error);
                let reported = self.report_failure(&message).await;
                (delivered, Some(message), reported)
            }
        };

        let now = unix_now();
        let candidate = match (self.policy, server_checkpoint) {
            (CheckpointPolicy::Server, Some(current_date)) => current_date,
            _ => now,
        };
        if !self.checkpoint.advance_to(candidate) {
            tracing::debug!(
                checkpoint = %self.checkpoint,
                candidate,
                "Checkpoint kept, candidate is not newer"
            );
        }

        tracing::info!(
            delivered,
            failed = failure.is_some(),
            checkpoint = %self.checkpoint,
            "Poll cycle finished"
        );

        CycleOutcome {
            delivered,
            failure,
            failure_reported,
            checkpoint: self.checkpoint.timestamp(),
        }
    }

    /// Fetch, validate and deliver. On failure, returns the number of
    /// notifications delivered before it alongside the error.
    async fn process(
        &mut self,
        server_checkpoint: &mut Option<i64>,
    ) -> Result<usize, (usize, WatchError)> {
        let since = self.checkpoint.timestamp();
        let raw = self.source.fetch(since).await.map_err(|e| (0, e))?;
        let validated = self.validator.validate(&raw).map_err(|e| (0, e))?;
        *server_checkpoint = validated.current_date;

        if validated.homeworks.is_empty() {
            tracing::debug!(from_date = since, "No new statuses");
            return Ok(0);
        }

        let mut delivered = 0;
        for record in &validated.homeworks {
            let message = self
                .translator
                .translate(record)
                .map_err(|e| (delivered, e))?;
            self.notifier
                .notify(&message)
                .await
                .map_err(|e| (delivered, e))?;
            tracing::info!(
                homework_id = ?record.id,
                homework = record.name.as_deref().unwrap_or_default(),
                status = record.status.as_deref().unwrap_or_default(),
                "Status change delivered"
            );
            delivered += 1;
        }

        Ok(delivered)
    }

    /// Log the failure and deliver it unless it repeats the last delivered one.
    /// Returns whether it was delivered.
    async fn report_failure(&mut self, message: &str) -> bool {
        tracing::error!(error = %message, "Poll cycle failed");

        if !self.gate.allows(message) {
            return false;
        }

        match self.notifier.notify(message).await {
            Ok(()) => {
                self.gate.record_delivered(message);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not deliver failure notification");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::{Value, json};

    use super::*;

    struct StaticSource(Value);

    impl HomeworkSource for StaticSource {
        async fn fetch(&self, _since: i64) -> Result<Value, WatchError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<String>>>,
        fail_handshake: bool,
    }

    impl Notifier for Recorder {
        async fn handshake(&self) -> Result<(), WatchError> {
            if self.fail_handshake {
                Err(WatchError::Delivery("chat not found".to_string()))
            } else {
                Ok(())
            }
        }

        async fn notify(&self, text: &str) -> Result<(), WatchError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_handshake_terminates() {
        let notifier = Recorder {
            fail_handshake: true,
            ..Default::default()
        };
        let mut poll_loop =
            PollLoop::new(StaticSource(json!({"homeworks": []})), notifier, Checkpoint::new(0));
        assert_eq!(poll_loop.state(), LoopState::Polling);
        assert!(poll_loop.run().await.is_err());
        assert_eq!(poll_loop.state(), LoopState::Terminated);
    }

    #[tokio::test]
    async fn test_now_policy_ignores_server_date() {
        let recorder = Recorder::default();
        let mut poll_loop = PollLoop::new(
            StaticSource(json!({"homeworks": [], "current_date": 1000})),
            recorder,
            Checkpoint::new(0),
        )
        .with_policy(CheckpointPolicy::Now);

        let before = unix_now();
        let outcome = poll_loop.run_cycle().await;
        assert!(outcome.checkpoint >= before);
    }

    #[tokio::test]
    async fn test_server_date_older_than_checkpoint_is_ignored() {
        let mut poll_loop = PollLoop::new(
            StaticSource(json!({"homeworks": [], "current_date": 1000})),
            Recorder::default(),
            Checkpoint::new(5000),
        );
        let outcome = poll_loop.run_cycle().await;
        assert_eq!(outcome.checkpoint, 5000);
    }

    #[tokio::test]
    async fn test_custom_failure_prefix() {
        let recorder = Recorder::default();
        let sent = recorder.sent.clone();
        let mut poll_loop =
            PollLoop::new(StaticSource(json!([])), recorder, Checkpoint::new(0))
                .with_failure_prefix("Bot failure: ");

        let outcome = poll_loop.run_cycle().await;
        assert!(outcome.failure_reported);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Bot failure: Malformed response"));
    }
}
