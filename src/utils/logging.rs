use once_cell::sync::OnceCell;
use std::env;
use std::fs::OpenOptions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

static ENABLE_LOGGING: AtomicBool = AtomicBool::new(false);
static SUBSCRIBER: OnceCell<()> = OnceCell::new();

/// Initializes logging based on environment variables:
/// - NETTERM_LOGGING: enables/disables logging (true/false, unset means false)
/// - NETTERM_LOG_FILE: when set, logs are appended to this file instead of stderr
/// - RUST_LOG: filter directives for the subscriber (defaults to `info`)
///
/// To enable logging in tests, run: NETTERM_LOGGING=true cargo test -- --nocapture
pub fn init_logging() {
    let enabled = match env::var("NETTERM_LOGGING") {
        Ok(value) => match value.as_str() {
            "true" => true,
            "false" => false,
            other => {
                eprintln!(
                    "NETTERM_LOGGING must be 'true' or 'false', got '{}'; logging stays disabled",
                    other
                );
                false
            }
        },
        Err(_) => false,
    };
    ENABLE_LOGGING.store(enabled, Ordering::SeqCst);
    if enabled {
        SUBSCRIBER.get_or_init(install_subscriber);
    }
}

fn install_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    // another subscriber may already be installed (e.g. by a host binary); keep it
    let result = match env::var("NETTERM_LOG_FILE") {
        Ok(path) => match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}; logging to stderr", path, e);
                builder.with_writer(std::io::stderr).try_init()
            }
        },
        Err(_) => builder.with_writer(std::io::stderr).try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

pub fn is_enabled() -> bool {
    ENABLE_LOGGING.load(Ordering::SeqCst)
}

pub fn log(prefix: &str, message: &str) {
    if is_enabled() {
        tracing::info!(component = prefix, "{}", message);
    }
}

pub fn warn(prefix: &str, message: &str) {
    if is_enabled() {
        tracing::warn!(component = prefix, "{}", message);
    }
}
