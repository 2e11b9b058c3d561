use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// `"info"` or `"meshlite=debug,wgpu_core=warn"`. When unset, `RUST_LOG` is
/// consulted, then a default of `info` for this crate and `warn` for wgpu.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

const DEFAULT_FILTER: &str = "meshlite=info,wgpu_core=warn,wgpu_hal=warn";

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.parse_filters(DEFAULT_FILTER);
                }
            },
        }

        builder.write_style(config.write_style);

        // another logger may already be installed by the host application
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}
