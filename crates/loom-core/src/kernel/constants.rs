/// Application name
pub const APP_NAME: &str = "Loom";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON object of plugin declarations that overrides every declaration file
pub const PLUGINS_ENV_VAR: &str = "LOOM_PLUGINS";

/// Runtime environment, e.g. `local`, `test`, `prod`
pub const ENV_VAR: &str = "LOOM_ENV";

/// Runtime scope, e.g. a deployment region
pub const SCOPE_VAR: &str = "LOOM_SCOPE";

/// Environment used when none is configured
pub const DEFAULT_ENV: &str = "local";

/// Directory holding installed plugin modules, per root
pub const MODULE_ROOT_DIR: &str = "modules";

/// Configuration directory, per root
pub const CONFIG_DIR: &str = "config";

/// Stem of plugin declaration files under [`CONFIG_DIR`]
pub const PLUGIN_CONFIG_STEM: &str = "plugin";

/// Stem of a plugin's package metadata file
pub const PACKAGE_METADATA_STEM: &str = "package";

/// Plugin section of the package metadata
pub const PLUGIN_METADATA_SECTION: &str = "framework-plugin";
