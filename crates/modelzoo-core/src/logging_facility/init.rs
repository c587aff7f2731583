//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for interactive CLI use
    Development,
    /// JSON structured output for pipelines and servers
    Production,
    /// No output; installs the in-memory test capture
    Test,
}

const DEVELOPMENT_FILTER: &str = "modelzoo=debug";
const PRODUCTION_FILTER: &str = "modelzoo=info";

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has any effect. `RUST_LOG` takes precedence over the
/// profile's default filter.
///
/// # Profiles
///
/// - **Development**: human-readable logs, `modelzoo=debug`
/// - **Production**: JSON logs, `modelzoo=info`
/// - **Test**: no output; events go to the in-memory test capture
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter_or(DEVELOPMENT_FILTER))
                .try_init()
                .ok();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter_or(PRODUCTION_FILTER))
                .try_init()
                .ok();
        }
        Profile::Test => {
            super::test_capture::init_test_capture();
        }
    });
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
