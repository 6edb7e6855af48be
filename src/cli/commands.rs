use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Startup script generator for Python web apps in deployment containers
#[derive(Parser, Debug)]
#[command(
    name = "startgen",
    about = "Startup script generator for Python web apps in deployment containers",
    version,
    long_about = "startgen inspects an application source tree, an optional build manifest \
                  and user overrides, and generates the shell script that starts the app \
                  inside its container: framework detection (Django, Flask), dependency \
                  environment setup and the final server or debugger command."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the startup script for an app",
        long_about = "Generates the startup script and writes it to the output path.\n\n\
                      Examples:\n  \
                      startgen script --app-path /home/site/wwwroot\n  \
                      startgen script --app-path . --bind-port 8080 --output run.sh\n  \
                      startgen script --user-startup-command './start.sh'"
    )]
    Script(ScriptCommandArgs),

    #[command(
        about = "Detect the app's web framework and entry module",
        long_about = "Runs only the framework detector against a source tree and prints \
                      the result.\n\n\
                      Examples:\n  \
                      startgen detect\n  \
                      startgen detect /path/to/app --format json"
    )]
    Detect(DetectCommandArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScriptCommandArgs {
    #[arg(
        long,
        value_name = "PATH",
        default_value = ".",
        help = "Path to the application folder, e.g. '/home/site/wwwroot'"
    )]
    pub app_path: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory containing the build manifest file (defaults to the app folder)"
    )]
    pub manifest_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "COMMAND",
        help = "Command that will be executed to start the application up"
    )]
    pub user_startup_command: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Path to a default app executed when no entrypoint is found, e.g. '/opt/defaultsite'"
    )]
    pub default_app: Option<PathBuf>,

    #[arg(
        long,
        value_name = "MODULE",
        default_value = "application:app",
        help = "Module of the default application, e.g. 'application:app'"
    )]
    pub default_app_module: String,

    #[arg(
        long,
        value_name = "ADAPTER",
        help = "Python debug adapter; only 'ptvsd' is supported"
    )]
    pub debug_adapter: Option<String>,

    #[arg(
        long,
        value_name = "PORT",
        default_value = "5678",
        help = "Port the debugger binds to; has no effect without --debug-adapter"
    )]
    pub debug_port: String,

    #[arg(
        long,
        help = "Whether the debug adapter pauses and waits for a client connection before running the app"
    )]
    pub debug_wait: bool,

    #[arg(long, value_name = "NAME", help = "Name of the app's virtual environment")]
    pub virtual_env_name: Option<String>,

    #[arg(
        long = "packagedir",
        value_name = "DIR",
        help = "Directory where the python packages were installed, if no virtual environment was used"
    )]
    pub package_directory: Option<String>,

    #[arg(
        long,
        value_name = "PORT",
        help = "Port the application binds to; default is 80"
    )]
    pub bind_port: Option<String>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "run.sh",
        help = "Path of the script to generate"
    )]
    pub output: PathBuf,

    #[arg(
        long,
        help = "Disables the extraction of the compressed virtual environment file; some \
                external tool will have to extract it instead"
    )]
    pub skip_virtual_env_extraction: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectCommandArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the application folder (defaults to the current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Virtual environment directory excluded from the scan"
    )]
    pub virtual_env_name: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Human,
    Json,
}
