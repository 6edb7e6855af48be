pub mod commands;
pub mod handlers;

pub use commands::{CliArgs, Commands, DetectCommandArgs, OutputFormatArg, ScriptCommandArgs};
