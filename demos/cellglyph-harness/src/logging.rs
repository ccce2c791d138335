use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where this harness would write logs if a caller ever wants file output;
/// currently only used to report the path, since the harness logs to the
/// console only.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "cellglyph")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("cellglyph-logs"))
}

/// Installs a console-only `tracing` subscriber, honoring `CELLGLYPH_LOG`
/// (falling back to `info` for this crate and `warn` elsewhere).
pub fn init() {
    let filter = EnvFilter::try_from_env("CELLGLYPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn,cellglyph_harness=info,cellglyph_render=info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(true)).init();
}
