//! Diagnostic logging setup.
//!
//! Fetch and playback failures are logged here rather than surfaced in the
//! UI. The filter can be overridden with the `RUST_LOG` environment variable.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system. Call once at startup.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("beatplay=debug,wgpu=warn,iced=warn,symphonia=warn,reqwest=warn")
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
