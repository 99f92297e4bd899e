//! Chat delivery for status and failure notifications.
//!
//! The poll loop only depends on the [`Notifier`] trait; [`TelegramNotifier`]
//! is the production implementation backed by the Telegram Bot API.

pub mod telegram;

use watch_common::error::WatchError;

pub use telegram::TelegramNotifier;

/// Something that can deliver a text message to the configured chat.
pub trait Notifier {
    /// Verify the destination is reachable. Called once at startup.
    fn handshake(&self) -> impl Future<Output = Result<(), WatchError>> + Send;

    /// Deliver one message.
    fn notify(&self, text: &str) -> impl Future<Output = Result<(), WatchError>> + Send;
}
