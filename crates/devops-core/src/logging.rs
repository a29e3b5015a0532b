use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::infrastructure::config::LogConfig;

const DEVOPS_TARGETS: [&str; 4] = ["devops_core", "devops_codec", "devops_jenkins", "devops_sonar"];

pub const DEFAULT_LOG_FILTER: &str =
    "devops_core=info,devops_codec=info,devops_jenkins=info,devops_sonar=info";

pub fn init() {
    init_with_default(DEFAULT_LOG_FILTER);
}

/// `RUST_LOG` wins over `default_filter` when set
pub fn init_with_default(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .init();
}

/// Uses `[log] level` from the config file for the devops crates
pub fn init_with_level(level: &str) {
    init_with_default(&filter_for_level(level));
}

/// Installs the subscriber from the `[log]` section unless one is already set.
/// Returns false when another subscriber was installed first.
pub fn init_from_config(log: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_config(log)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .try_init()
        .is_ok()
}

pub fn filter_for_config(log: &LogConfig) -> String {
    let level = log.level.trim();
    if level.is_empty() {
        return DEFAULT_LOG_FILTER.to_string();
    }
    filter_for_level(level)
}

pub fn init_dev() {
    init_with_level("debug");
}

pub fn filter_for_level(level: &str) -> String {
    DEVOPS_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
