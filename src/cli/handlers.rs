//! Subcommand handlers
//!
//! Each handler maps its outcome to a process exit code; fatal errors are
//! reported on standard output with a descriptive message.

use crate::cli::commands::{DetectCommandArgs, OutputFormatArg, ScriptCommandArgs};
use crate::config::ScriptConfig;
use crate::detect::{AppTypeDetector, DetectedApp};
use crate::error::GeneratorError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::generator::StartupScriptGenerator;
use crate::manifest::BuildManifest;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn handle_script(args: &ScriptCommandArgs) -> i32 {
    match run_script(args) {
        Ok(()) => 0,
        Err(error) => {
            println!("Error: {}", error);
            error.exit_code()
        }
    }
}

pub fn handle_detect(args: &DetectCommandArgs) -> i32 {
    match run_detect(args) {
        Ok(()) => 0,
        Err(error) => {
            println!("Error: {}", error);
            error.exit_code()
        }
    }
}

fn run_script(args: &ScriptCommandArgs) -> Result<(), GeneratorError> {
    let fs = RealFileSystem::new();

    let app_path = validated_full_path(&fs, &args.app_path)?;
    let default_app_path = args
        .default_app
        .as_deref()
        .map(|path| validated_full_path(&fs, path))
        .transpose()?;

    // Loaded once here; every component receives it by value.
    let manifest = BuildManifest::load(&fs, args.manifest_dir.as_deref(), &app_path)?;

    let config = ScriptConfig {
        app_path,
        user_startup_command: args.user_startup_command.clone(),
        default_app_path,
        default_app_module: args.default_app_module.clone(),
        debug_adapter: args.debug_adapter.clone(),
        debug_port: args.debug_port.clone(),
        debug_wait: args.debug_wait,
        bind_port: args.bind_port.clone(),
        virtual_env_name: args.virtual_env_name.clone(),
        package_directory: args.package_directory.clone(),
        skip_virtual_env_extraction: args.skip_virtual_env_extraction,
    };

    let script = StartupScriptGenerator::new(config, manifest, &fs).generate_text()?;
    write_script(&args.output, &script)
}

fn run_detect(args: &DetectCommandArgs) -> Result<(), GeneratorError> {
    let fs = RealFileSystem::new();

    let path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = validated_full_path(&fs, &path)?;
    let excluded = args.virtual_env_name.clone().unwrap_or_default();

    let detected = AppTypeDetector::new(&fs).detect(&path, &excluded)?;
    match args.format {
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&detected).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
        OutputFormatArg::Human => print_detection(&detected),
    }
    Ok(())
}

fn print_detection(detected: &DetectedApp) {
    match detected {
        DetectedApp::Django { entry_module } => {
            println!("Detected Django app (entry module '{}')", entry_module);
        }
        DetectedApp::Flask {
            main_file,
            entry_module,
        } => {
            println!(
                "Detected Flask app (main file '{}', entry module '{}')",
                main_file, entry_module
            );
        }
        DetectedApp::DefaultApp { path, module } => {
            println!(
                "Default app (path '{}', module '{}')",
                path.display(),
                module
            );
        }
        DetectedApp::None => println!("No known web framework detected"),
    }
}

/// Input paths must exist; a missing path is a fatal configuration error.
fn validated_full_path(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf, GeneratorError> {
    fs.canonicalize(path)
        .map_err(|_| GeneratorError::InvalidPath(path.to_path_buf()))
}

/// Writes the rendered script and marks it executable.
fn write_script(path: &Path, content: &str) -> Result<(), GeneratorError> {
    fs::write(path, content).map_err(|source| GeneratorError::ScriptWrite {
        path: path.to_path_buf(),
        source,
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
            GeneratorError::ScriptWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    info!(path = %path.display(), "Startup script written");
    Ok(())
}
