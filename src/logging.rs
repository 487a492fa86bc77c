use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize standard structured logging. The level defaults to INFO and can
/// be overridden via `DONNA_LOG` (e.g. `DONNA_LOG=debug`).
pub fn init() {
    let level = std::env::var("DONNA_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Ignored if already set
}
