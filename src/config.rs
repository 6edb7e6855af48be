//! Generator configuration and fixed defaults

use std::path::PathBuf;

/// Address the production server and the debug adapter bind to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Port exported as `PORT` when no bind port was configured.
pub const DEFAULT_BIND_PORT: &str = "80";

/// Package directory assumed when the named virtual environment is missing.
pub const DEFAULT_PACKAGES_DIR: &str = "__startgen_packages__";

/// Path-configuration file written into the user-local site-packages
/// directory to expose a flat package directory.
pub const PTH_FILE_NAME: &str = "startgen.pth";

/// Environment variable holding an optional command to run before the app
/// starts. Consumed by the pre-run hook block of the generated script.
pub const PRE_RUN_COMMAND_ENV_VAR: &str = "PRE_RUN_COMMAND";

/// Immutable input to a single script-generation invocation. Owned by the
/// CLI layer; every component borrows it.
#[derive(Debug, Clone, Default)]
pub struct ScriptConfig {
    /// Application source root.
    pub app_path: PathBuf,
    /// User-supplied startup command. When set, framework detection and
    /// debug logic are bypassed entirely.
    pub user_startup_command: Option<String>,
    /// Fallback app served when no entrypoint is detected.
    pub default_app_path: Option<PathBuf>,
    /// Module reference of the fallback app, e.g. `application:app`.
    pub default_app_module: String,
    /// Remote debug adapter. Only `ptvsd` is supported.
    pub debug_adapter: Option<String>,
    /// Configured debugger port. The ptvsd invocation currently uses a
    /// fixed port instead; see DESIGN.md.
    pub debug_port: String,
    /// Whether the debugger pauses for a client connection before running
    /// the app.
    pub debug_wait: bool,
    /// Port the application binds to. Empty means the default.
    pub bind_port: Option<String>,
    /// Name of the app's virtual environment directory.
    pub virtual_env_name: Option<String>,
    /// Directory where packages were installed when no virtual environment
    /// was used.
    pub package_directory: Option<String>,
    /// Skip extraction of a compressed virtual environment file; some
    /// external tool is then responsible for it.
    pub skip_virtual_env_extraction: bool,
}

/// Manifest values win over command-line-supplied values for the same
/// setting.
pub fn effective_name(manifest_value: &str, config_value: Option<&str>) -> Option<String> {
    if !manifest_value.is_empty() {
        return Some(manifest_value.to_string());
    }
    match config_value {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => None,
    }
}
