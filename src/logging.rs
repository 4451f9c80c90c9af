//! Tracing setup: JSON trace file when `--logs` is on, terse stderr otherwise.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;

use crate::config::ResolvedConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

#[must_use]
pub fn trace_log_path() -> PathBuf {
    env::var("GBF_SETTINGS_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("gbf_settings_trace.jsonl"))
}

#[inline]
fn max_level(config: &ResolvedConfig) -> Level {
    match (config.debug, config.logs) {
        (true, _) => Level::DEBUG,
        (false, true) => Level::INFO,
        (false, false) => Level::WARN,
    }
}

fn init_tracing_once(config: &ResolvedConfig, once: &OnceLock<()>) {
    let _ = once.get_or_init(|| {
        let level = max_level(config);
        if config.logs {
            let path = trace_log_path();
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    let subscriber = tracing_subscriber::fmt()
                        .json()
                        .with_timer(UtcTime::rfc_3339())
                        .with_max_level(level)
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false)
                        .finish();
                    let _ = tracing::subscriber::set_global_default(subscriber);
                    return;
                }
                Err(err) => {
                    eprintln!("gbf-settings: cannot open trace log {}: {err}", path.display());
                }
            }
        }
        let subscriber = tracing_subscriber::fmt()
            .compact()
            .without_time()
            .with_target(false)
            .with_max_level(level)
            .with_writer(io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &ResolvedConfig) {
    init_tracing_once(config, &TRACING_INIT);
}
