/// Application name
pub const APP_NAME: &str = "Launchpad";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Loader API version the core implements. Loaders check plugin API ranges against it.
pub const API_VERSION: &str = "0.1.0";

/// `log` target used by the core and handed to loaders through the environment
pub const LOG_TARGET: &str = crate::plugin_system::environment::DEFAULT_LOG_TARGET;

/// Default configuration file looked up next to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "launchpad.toml";
