// Logger initialization

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const DEFAULT_DIRECTIVE: &str = "legal_agents=debug,tower_http=debug,axum=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `LOG_LEVEL`, which wins over the built-in directive.
/// With `LOG_DIR` set, a daily rolling file is written alongside stdout; the
/// returned guard must live until shutdown so buffered lines are flushed.
pub fn init_logger(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .level
            .as_deref()
            .unwrap_or(DEFAULT_DIRECTIVE)
            .into()
    });

    let (file_layer, guard) = match config.dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "legal-agents.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}
