//! Process-command synthesis
//!
//! Builds the final invocation that starts the app: the user-supplied
//! command verbatim, a debug-adapter command, or the production gunicorn
//! command. Pure computation over already-validated inputs; the host CPU
//! count is read once by the caller and passed in.

use crate::config::{ScriptConfig, DEFAULT_HOST};
use crate::detect::DetectedApp;
use crate::fs::FileSystem;
use crate::script::Statement;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::{debug, warn};

/// The only debug adapter currently supported.
pub const SUPPORTED_DEBUG_ADAPTER: &str = "ptvsd";

/// Port the debug adapter listens on. Fixed, independent of the
/// configurable debug port; see DESIGN.md.
const DEBUG_ADAPTER_PORT: &str = "3000";

/// Request timeout passed to gunicorn, in seconds.
const REQUEST_TIMEOUT_SECS: u32 = 600;

/// The final process invocation plus any statements that must precede it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupCommand {
    pub prelude: Vec<Statement>,
    pub command: String,
    /// Debug invocations are flagged for logging metadata only.
    pub is_debug: bool,
}

/// Number of logical CPUs on the host, read once per invocation.
pub fn host_cpu_count() -> usize {
    let mut sys = System::new_all();
    sys.refresh_all();
    sys.cpus().len().max(1)
}

pub struct CommandSynthesizer<'a> {
    fs: &'a dyn FileSystem,
    cpu_count: usize,
}

impl<'a> CommandSynthesizer<'a> {
    pub fn new(fs: &'a dyn FileSystem, cpu_count: usize) -> Self {
        Self { fs, cpu_count }
    }

    /// A user command takes precedence over any detection logic. Otherwise
    /// the detection result's entry module is started under the debug
    /// adapter or the production server.
    pub fn synthesize(&self, config: &ScriptConfig, detection: &DetectedApp) -> StartupCommand {
        if let Some(user_command) = config
            .user_startup_command
            .as_deref()
            .filter(|c| !c.is_empty())
        {
            let mut prelude = self.execute_permission_statements(user_command, &config.app_path);
            prelude.push(Statement::Export {
                name: "PATH".to_string(),
                value: format!("\"{}:$PATH\"", config.app_path.display()),
            });
            return StartupCommand {
                prelude,
                command: user_command.to_string(),
                is_debug: false,
            };
        }

        let (module, app_dir) = match detection {
            DetectedApp::Django { entry_module } => {
                (Some(entry_module.as_str()), Some(config.app_path.as_path()))
            }
            DetectedApp::Flask { entry_module, .. } => {
                (Some(entry_module.as_str()), Some(config.app_path.as_path()))
            }
            DetectedApp::DefaultApp { path, module } => (
                Some(module.as_str()).filter(|m| !m.is_empty()),
                Some(path.as_path()).filter(|p| !p.as_os_str().is_empty()),
            ),
            DetectedApp::None => (None, None),
        };

        let Some(module) = module else {
            return StartupCommand {
                prelude: Vec::new(),
                command: String::new(),
                is_debug: false,
            };
        };

        if self.should_start_in_debug_mode(config) {
            debug!(module, "Generating debug command");
            StartupCommand {
                prelude: Vec::new(),
                command: self.debug_command(module, app_dir, config.debug_wait),
                is_debug: true,
            }
        } else {
            debug!(module, "Generating production command");
            StartupCommand {
                prelude: Vec::new(),
                command: self.production_command(module, config.bind_port.as_deref(), app_dir),
                is_debug: false,
            }
        }
    }

    /// Debug mode requires the adapter name to match the supported adapter
    /// exactly; anything else falls through to the production command.
    fn should_start_in_debug_mode(&self, config: &ScriptConfig) -> bool {
        match config.debug_adapter.as_deref() {
            None | Some("") => false,
            Some(SUPPORTED_DEBUG_ADAPTER) => true,
            Some(adapter) => {
                warn!(adapter, "Unsupported debug adapter");
                false
            }
        }
    }

    fn debug_command(&self, module: &str, app_dir: Option<&Path>, wait: bool) -> String {
        let wait_arg = if wait { " --wait" } else { "" };
        let python_command = format!(
            "python -m {} --host {} --port {}{} -m {}",
            SUPPORTED_DEBUG_ADAPTER, DEFAULT_HOST, DEBUG_ADAPTER_PORT, wait_arg, module
        );

        match app_dir {
            Some(dir) => format!("cd {} && {}", dir.display(), python_command),
            None => python_command,
        }
    }

    /// `module` is of the pattern `<dotted module path>:<variable name>`,
    /// where the variable is a WSGI callable in that module.
    fn production_command(
        &self,
        module: &str,
        bind_port: Option<&str>,
        app_dir: Option<&Path>,
    ) -> String {
        // http://docs.gunicorn.org/en/stable/design.html#how-many-workers
        let worker_count = 2 * self.cpu_count + 1;

        let mut args = format!(
            "--timeout {} --access-logfile '-' --error-logfile '-' --workers={}",
            REQUEST_TIMEOUT_SECS, worker_count
        );

        if let Some(port) = bind_port.filter(|p| !p.is_empty()) {
            args.push_str(&format!(" --bind={}:{}", DEFAULT_HOST, port));
        }

        if let Some(dir) = app_dir {
            args.push_str(&format!(" --chdir={}", dir.display()));
        }

        format!("GUNICORN_CMD_ARGS=\"{}\" gunicorn {}", args, module)
    }

    /// Script files referenced by a user command must be executable by the
    /// time the command runs; the grants are emitted ahead of it.
    fn execute_permission_statements(&self, command: &str, app_path: &Path) -> Vec<Statement> {
        let mut statements = Vec::new();
        for token in command.split_whitespace() {
            let token = token.trim_matches(|c| c == '"' || c == '\'');
            if token.is_empty() {
                continue;
            }

            let candidate = if Path::new(token).is_absolute() {
                let path = PathBuf::from(token);
                if !path.starts_with(app_path) {
                    continue;
                }
                path
            } else {
                app_path.join(token)
            };

            if self.fs.exists(&candidate) {
                statements.push(Statement::Run(format!(
                    "chmod -R +x {}",
                    candidate.display()
                )));
            }
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const APP: &str = "/srv/app";

    fn mock_app() -> MockFileSystem {
        let fs = MockFileSystem::with_root(PathBuf::from(APP));
        fs.add_dir(APP);
        fs
    }

    fn config() -> ScriptConfig {
        ScriptConfig {
            app_path: PathBuf::from(APP),
            ..Default::default()
        }
    }

    fn synthesizer(fs: &MockFileSystem, cpu_count: usize) -> CommandSynthesizer<'_> {
        CommandSynthesizer::new(fs, cpu_count)
    }

    fn flask_detection() -> DetectedApp {
        DetectedApp::Flask {
            main_file: "app.py".to_string(),
            entry_module: "app:app".to_string(),
        }
    }

    #[test]
    fn test_production_command_without_bind_or_chdir() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let command = syn.production_command("module.py", None, None);
        assert_eq!(
            command,
            "GUNICORN_CMD_ARGS=\"--timeout 600 --access-logfile '-' --error-logfile '-' --workers=5\" gunicorn module.py"
        );
    }

    #[test]
    fn test_production_command_with_bind_and_chdir() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let command =
            syn.production_command("module.py", Some("12345"), Some(Path::new("/a/b/c")));
        assert_eq!(
            command,
            "GUNICORN_CMD_ARGS=\"--timeout 600 --access-logfile '-' --error-logfile '-' --workers=5 --bind=0.0.0.0:12345 --chdir=/a/b/c\" gunicorn module.py"
        );
    }

    #[test]
    fn test_empty_bind_port_omits_bind_argument() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let command = syn.production_command("module.py", Some(""), None);
        assert!(!command.contains("--bind"));
    }

    #[test]
    fn test_worker_count_is_twice_cpus_plus_one() {
        let fs = mock_app();

        let command = synthesizer(&fs, 4).production_command("app:app", None, None);
        assert!(command.contains("--workers=9"));

        let command = synthesizer(&fs, 1).production_command("app:app", None, None);
        assert!(command.contains("--workers=3"));
    }

    #[test]
    fn test_bind_argument_precedes_chdir() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let command = syn.production_command("app:app", Some("8000"), Some(Path::new("/x")));
        let bind_idx = command.find("--bind=").unwrap();
        let chdir_idx = command.find("--chdir=").unwrap();
        assert!(bind_idx < chdir_idx);
    }

    #[test]
    fn test_detected_flask_app_runs_under_gunicorn() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let result = syn.synthesize(&config(), &flask_detection());
        assert!(!result.is_debug);
        assert!(result.prelude.is_empty());
        assert!(result.command.contains("gunicorn app:app"));
        assert!(result.command.contains("--chdir=/srv/app"));
    }

    #[test]
    fn test_debug_command_uses_fixed_port() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let mut cfg = config();
        cfg.debug_adapter = Some("ptvsd".to_string());
        cfg.debug_port = "5678".to_string();

        let result = syn.synthesize(&cfg, &flask_detection());
        assert!(result.is_debug);
        assert_eq!(
            result.command,
            "cd /srv/app && python -m ptvsd --host 0.0.0.0 --port 3000 -m app:app"
        );
    }

    #[test]
    fn test_debug_wait_flag() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let mut cfg = config();
        cfg.debug_adapter = Some("ptvsd".to_string());
        cfg.debug_wait = true;

        let result = syn.synthesize(&cfg, &flask_detection());
        assert!(result
            .command
            .contains("--port 3000 --wait -m app:app"));
    }

    #[test]
    fn test_unsupported_debug_adapter_falls_back_to_production() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let mut cfg = config();
        cfg.debug_adapter = Some("debugpy".to_string());

        let result = syn.synthesize(&cfg, &flask_detection());
        assert!(!result.is_debug);
        assert!(result.command.contains("gunicorn"));
    }

    #[test]
    fn test_user_command_bypasses_detection_and_debug() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let mut cfg = config();
        cfg.user_startup_command = Some("./start.sh --fast".to_string());
        cfg.debug_adapter = Some("ptvsd".to_string());

        let result = syn.synthesize(&cfg, &flask_detection());
        assert!(!result.is_debug);
        assert_eq!(result.command, "./start.sh --fast");
    }

    #[test]
    fn test_user_command_grants_execute_permission_to_referenced_scripts() {
        let fs = mock_app();
        fs.add_file("start.sh", "#!/bin/sh");

        let syn = synthesizer(&fs, 2);
        let mut cfg = config();
        cfg.user_startup_command = Some("./start.sh".to_string());

        let result = syn.synthesize(&cfg, &DetectedApp::None);
        assert_eq!(
            result.prelude,
            vec![
                Statement::Run("chmod -R +x /srv/app/./start.sh".to_string()),
                Statement::Export {
                    name: "PATH".to_string(),
                    value: "\"/srv/app:$PATH\"".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_user_command_extends_path_even_without_script_tokens() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let mut cfg = config();
        cfg.user_startup_command = Some("gunicorn custom:app".to_string());

        let result = syn.synthesize(&cfg, &DetectedApp::None);
        assert_eq!(
            result.prelude,
            vec![Statement::Export {
                name: "PATH".to_string(),
                value: "\"/srv/app:$PATH\"".to_string(),
            }]
        );
    }

    #[test]
    fn test_absolute_token_outside_app_path_is_ignored() {
        let fs = mock_app();
        fs.add_file("/etc/passwd", "root");

        let syn = synthesizer(&fs, 2);
        let mut cfg = config();
        cfg.user_startup_command = Some("cat /etc/passwd".to_string());

        let result = syn.synthesize(&cfg, &DetectedApp::None);
        assert!(!result
            .prelude
            .iter()
            .any(|s| matches!(s, Statement::Run(cmd) if cmd.contains("chmod"))));
    }

    #[test]
    fn test_default_app_module_drives_command() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let detection = DetectedApp::DefaultApp {
            path: PathBuf::from("/opt/defaultsite"),
            module: "application:app".to_string(),
        };

        let result = syn.synthesize(&config(), &detection);
        assert!(result.command.contains("gunicorn application:app"));
        assert!(result.command.contains("--chdir=/opt/defaultsite"));
    }

    #[test]
    fn test_no_module_yields_empty_command() {
        let fs = mock_app();
        let syn = synthesizer(&fs, 2);

        let result = syn.synthesize(&config(), &DetectedApp::None);
        assert_eq!(result.command, "");
        assert!(!result.is_debug);
    }

    #[test]
    fn test_host_cpu_count_is_positive() {
        assert!(host_cpu_count() >= 1);
    }
}
