use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ConfigBuilder};

/// Modules to filter out from logging when not in Trace mode.
/// These are the HTTP stack's dependencies, which log every connection and request.
const FILTERED_MODULES: &[&str] = &["tower", "hyper", "axum", "reqwest", "rustls", "mockito"];

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger from `config.log_level_filter`.
    ///
    /// At Trace every module logs. At any other level the modules in
    /// `FILTERED_MODULES` are silenced so the relay's own flow events stay readable.
    ///
    /// Fails if a global logger was already installed in this process.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let log_config = Self::build_log_config(Self::ignored_modules(config.log_level_filter));

        simplelog::TermLogger::init(
            config.log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    /// Modules whose records are dropped at `level`.
    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            FILTERED_MODULES
        }
    }

    fn build_log_config(ignored: &[&'static str]) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_target_level(LevelFilter::Error)
            .set_thread_level(LevelFilter::Off);

        for &module in ignored {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_modules_cover_http_stack() {
        for module in ["tower", "hyper", "axum", "reqwest", "rustls"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_relay_crates_are_never_filtered() {
        for module in ["oauth_relay", "relay_auth", "domain", "web", "service"] {
            assert!(
                !FILTERED_MODULES.contains(&module),
                "{module} logs must stay visible"
            );
        }
    }

    #[test]
    fn test_trace_level_ignores_nothing() {
        assert!(Logger::ignored_modules(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_other_levels_ignore_dependencies() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert_eq!(Logger::ignored_modules(level), FILTERED_MODULES);
        }
    }

    #[test]
    fn test_build_log_config_with_and_without_filters() {
        let _filtered = Logger::build_log_config(FILTERED_MODULES);
        let _unfiltered = Logger::build_log_config(&[]);
    }
}
