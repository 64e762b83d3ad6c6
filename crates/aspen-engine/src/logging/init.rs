use std::sync::Once;

/// Crates whose output is capped at `warn` unless the filter names them.
const NOISY_CRATES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "aspen_engine=debug,wgpu_core=info").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());

        builder.filter_level(config.default_level);
        for name in quieted_crates(filter.as_deref()) {
            builder.filter_module(name, log::LevelFilter::Warn);
        }
        if let Some(filter) = &filter {
            builder.parse_filters(filter);
        }

        builder.write_style(config.write_style);
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

/// GPU stack crates not mentioned by `filter`.
fn quieted_crates(filter: Option<&str>) -> Vec<&'static str> {
    NOISY_CRATES
        .iter()
        .copied()
        .filter(|name| !filter.is_some_and(|f| f.contains(name)))
        .collect()
}
