//! startgen - startup script generator for Python web apps
//!
//! This library synthesizes the shell script that starts a Python web
//! application inside a deployment container. It inspects the source tree
//! for a known framework, decides how the dependency environment becomes
//! visible to the interpreter, and assembles the final server or debugger
//! command.
//!
//! # Core Concepts
//!
//! - **Detection**: filesystem inspection that identifies the web framework
//!   (Django via `wsgi.py`, Flask via conventional entry files) and its
//!   entry module
//! - **Environment plan**: how installed packages are exposed - a virtual
//!   environment's `site-packages` on `PYTHONPATH` (optionally extracted
//!   from an archive first) and/or a flat package directory
//! - **Script**: a structured sequence of typed statements, rendered to
//!   text once at the end
//!
//! # Example Usage
//!
//! ```no_run
//! use startgen::{BuildManifest, RealFileSystem, ScriptConfig, StartupScriptGenerator};
//! use std::path::PathBuf;
//!
//! fn generate() -> Result<String, startgen::GeneratorError> {
//!     let fs = RealFileSystem::new();
//!     let config = ScriptConfig {
//!         app_path: PathBuf::from("/home/site/wwwroot"),
//!         default_app_module: "application:app".to_string(),
//!         ..Default::default()
//!     };
//!     let manifest = BuildManifest::load(&fs, None, &config.app_path)?;
//!
//!     StartupScriptGenerator::new(config, manifest, &fs).generate_text()
//! }
//! ```

// Public modules
pub mod cli;
pub mod command;
pub mod config;
pub mod detect;
pub mod environment;
pub mod error;
pub mod fs;
pub mod generator;
pub mod manifest;
pub mod script;

// Re-export key types for convenient access
pub use command::{CommandSynthesizer, StartupCommand, SUPPORTED_DEBUG_ADAPTER};
pub use config::ScriptConfig;
pub use detect::{AppTypeDetector, DetectedApp};
pub use environment::{EnvironmentPlan, EnvironmentResolver, ExtractionAction};
pub use error::GeneratorError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use generator::StartupScriptGenerator;
pub use manifest::BuildManifest;
pub use script::{Script, Statement};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_startgen() {
        assert_eq!(NAME, "startgen");
    }
}
