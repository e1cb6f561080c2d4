use configuration::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Installs the global subscriber: everything allowed by `RUST_LOG` (or the configured
/// level) goes to a daily-rolling file, warnings and errors also go to stderr.
///
/// Spans opened by this binary carry progress spinners; stderr output is routed
/// through the same writer so log lines never tear a spinner.
///
/// The returned guard flushes the file writer when dropped and must live as long as `main`.
pub fn init(settings: &LoggingSettings) -> anyhow::Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&settings.directory, "portfolio.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.level))?;

    let indicatif_layer = IndicatifLayer::new();
    let stderr_writer = indicatif_layer.get_stderr_writer();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            fmt::layer()
                .with_writer(stderr_writer)
                .with_target(false)
                .with_filter(LevelFilter::WARN),
        )
        .with(indicatif_layer.with_filter(filter_fn(|metadata| {
            metadata.is_span() && metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
        })))
        .try_init()?;

    Ok(guard)
}
