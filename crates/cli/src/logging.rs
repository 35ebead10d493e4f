use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize stderr logging and the panic logger.
/// The returned guard must be kept alive for the duration of the program.
pub fn init_logging(log_level: tracing::Level) -> tracing_appender::non_blocking::WorkerGuard {
    // stdout carries command output, so logs go to stderr
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(layer).init();

    register_panic_logger();

    guard
}

/// Registers a panic hook that logs panics using the `tracing` crate
fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}
