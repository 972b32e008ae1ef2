pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod interpreter;
pub mod path;
pub mod resolver;
pub mod search;
pub mod utils;

pub use command::{is_command_file, Command, CommandKind, PathSegment};
pub use config::ResolvedConfig;
pub use error::CmdError;
pub use interpreter::{
    append_commands, resolve_command_file, resolve_command_file_at_depth, resolve_command_file_with,
    resolve_in_place, Interpreter, ResolveOptions, Scope,
};
pub use resolver::{FileResolver, MemoryResolver, Resolver};
pub use serde_json::Value;
