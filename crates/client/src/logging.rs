//! Cross-platform logging.
//!
//! The `log_*!` macros format their arguments and hand them to [`emit`], which
//! writes to the browser console on the web and to `tracing` on desktop.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[cfg(target_arch = "wasm32")]
pub fn emit(level: Level, msg: &str) {
    let msg = wasm_bindgen::JsValue::from_str(msg);
    match level {
        Level::Debug => web_sys::console::debug_1(&msg),
        Level::Info => web_sys::console::log_1(&msg),
        Level::Warn => web_sys::console::warn_1(&msg),
        Level::Error => web_sys::console::error_1(&msg),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(level: Level, msg: &str) {
    match level {
        Level::Debug => tracing::debug!(target: "ltdk_client", "{}", msg),
        Level::Info => tracing::info!(target: "ltdk_client", "{}", msg),
        Level::Warn => tracing::warn!(target: "ltdk_client", "{}", msg),
        Level::Error => tracing::error!(target: "ltdk_client", "{}", msg),
    }
}

/// Install the desktop subscriber. `RUST_LOG` overrides the default filter.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ltdk_client=debug,ltdk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init() {}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Debug, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::Level::Error, &format!($($arg)*))
    };
}
