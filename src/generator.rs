//! Startup script assembly
//!
//! Drives detection, environment resolution and command synthesis, and
//! orders their output into the final script. The statement order is a
//! contract: shebang, working-directory change, port export, pre-run hook,
//! environment setup, final command.

use crate::command::{CommandSynthesizer, host_cpu_count};
use crate::config::{effective_name, ScriptConfig, DEFAULT_BIND_PORT, PRE_RUN_COMMAND_ENV_VAR};
use crate::detect::{AppTypeDetector, DetectedApp};
use crate::environment::EnvironmentResolver;
use crate::error::GeneratorError;
use crate::fs::FileSystem;
use crate::manifest::BuildManifest;
use crate::script::{Script, Statement};
use std::env;
use std::path::Path;
use tracing::info;

pub struct StartupScriptGenerator<'a> {
    config: ScriptConfig,
    manifest: BuildManifest,
    fs: &'a dyn FileSystem,
    cpu_count: usize,
}

impl<'a> StartupScriptGenerator<'a> {
    pub fn new(config: ScriptConfig, manifest: BuildManifest, fs: &'a dyn FileSystem) -> Self {
        Self {
            config,
            manifest,
            fs,
            cpu_count: host_cpu_count(),
        }
    }

    /// Overrides the host CPU count used for worker sizing.
    pub fn with_cpu_count(mut self, cpu_count: usize) -> Self {
        self.cpu_count = cpu_count;
        self
    }

    pub fn generate(&self) -> Result<Script, GeneratorError> {
        info!(app = %self.config.app_path.display(), "Generating startup script");

        let mut script = Script::new();
        script.push(Statement::Blank);
        script.push(Statement::Comment(
            "Enter the source directory to make sure the script runs where the user expects"
                .to_string(),
        ));
        script.push(Statement::ChangeDir(
            self.config.app_path.display().to_string(),
        ));
        script.push(Statement::Blank);

        let port = self
            .config
            .bind_port
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_BIND_PORT);
        script.push(Statement::Export {
            name: "PORT".to_string(),
            value: port.to_string(),
        });

        script.extend(pre_run_statements(&self.config.app_path));

        let (_plan, environment_statements) =
            EnvironmentResolver::new(self.fs).resolve(&self.config, &self.manifest)?;
        script.extend(environment_statements);

        let detection = self.detect_app()?;
        let startup = CommandSynthesizer::new(self.fs, self.cpu_count)
            .synthesize(&self.config, &detection);

        script.extend(startup.prelude.clone());
        if !startup.command.is_empty() {
            script.push(Statement::Run(startup.command.clone()));
        }

        info!(
            app_type = detection.kind(),
            app_module = detection.entry_module().unwrap_or(""),
            debug = startup.is_debug,
            venv = %self.manifest.virtual_env_name,
            "Finalizing script"
        );
        Ok(script)
    }

    pub fn generate_text(&self) -> Result<String, GeneratorError> {
        self.generate().map(|script| script.render())
    }

    /// Detection is skipped entirely when a user command was supplied.
    /// When nothing is detected, the configured default app takes over and
    /// the working directory switches to its path.
    fn detect_app(&self) -> Result<DetectedApp, GeneratorError> {
        let user_command_supplied = self
            .config
            .user_startup_command
            .as_deref()
            .is_some_and(|c| !c.is_empty());
        if user_command_supplied {
            return Ok(DetectedApp::None);
        }

        let excluded = effective_name(
            &self.manifest.virtual_env_name,
            self.config.virtual_env_name.as_deref(),
        )
        .unwrap_or_default();

        let detected = AppTypeDetector::new(self.fs).detect(&self.config.app_path, &excluded)?;
        if let DetectedApp::None = detected {
            let default_path = self.config.default_app_path.clone().unwrap_or_default();
            info!(path = %default_path.display(), "No framework detected, using default app");
            return Ok(DetectedApp::DefaultApp {
                path: default_path,
                module: self.config.default_app_module.clone(),
            });
        }
        Ok(detected)
    }
}

/// Pre-run hook block. Only present when the hook environment variable is
/// set; the command runs from the app root.
fn pre_run_statements(app_path: &Path) -> Vec<Statement> {
    match env::var(PRE_RUN_COMMAND_ENV_VAR) {
        Ok(command) if !command.is_empty() => vec![
            Statement::ChangeDir(format!("\"{}\"", app_path.display())),
            Statement::Echo("'Running the provided pre-run command...'".to_string()),
            Statement::Run(command),
            Statement::Comment("End of pre-run command.".to_string()),
        ],
        _ => Vec::new(),
    }
}
