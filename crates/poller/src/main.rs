use watch_common::config::AppConfig;
use watch_common::types::Checkpoint;
use watch_engine::ResponseValidator;
use watch_notifier::TelegramNotifier;
use watch_poller::{PollLoop, PracticumClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watch_poller=info,watch_notifier=info".into()),
        )
        .json()
        .init();

    tracing::info!("Review watch starting...");

    // Missing credentials are fatal
    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Configuration is incomplete, exiting");
    })?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let source = PracticumClient::new(
        config.practicum_endpoint.clone(),
        config.practicum_token.clone(),
        config.http_timeout(),
    )?;
    let notifier = TelegramNotifier::new(
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
        config.http_timeout(),
    )?;

    let mut poll_loop = PollLoop::new(
        source,
        notifier,
        Checkpoint::starting_before_now(config.initial_offset_secs),
    )
    .with_validator(ResponseValidator::new().require_current_date(config.require_current_date))
    .with_policy(config.checkpoint_policy)
    .with_poll_interval(config.poll_interval());

    // Run until a fatal error or Ctrl+C
    tokio::select! {
        result = poll_loop.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Poll loop terminated");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("Review watch stopped.");
    Ok(())
}
