use once_cell::sync::Lazy;
use std::future::Future;
use tracing_subscriber::EnvFilter;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Drives a gate or approval future to completion from synchronous code.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    RUNTIME.block_on(fut)
}

/// Installs the fmt subscriber. `log` records are forwarded through the
/// tracing-log bridge, so library code keeps using the `log` macros.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
    {
        eprintln!("Logging already initialised: {e}");
    }
}
