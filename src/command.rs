// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::CmdError;
use crate::utils::{preview, type_name};

/// Marker in the first slot of an array path segment: `["$search", key, value]`.
pub const SEARCH_MARKER: &str = "$search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Append,
    Erase,
    Include,
    Object,
    Set,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Append => "$append",
            CommandKind::Erase => "$erase",
            CommandKind::Include => "$include",
            CommandKind::Object => "$object",
            CommandKind::Set => "$set",
        }
    }

    /// Kind of a raw command tuple, or `None` if it does not name a known command.
    pub fn of(command: &Value) -> Option<Self> {
        command.as_array()?.first()?.as_str()?.parse().ok()
    }
}

impl FromStr for CommandKind {
    type Err = CmdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$append" => Ok(CommandKind::Append),
            "$erase" => Ok(CommandKind::Erase),
            "$include" => Ok(CommandKind::Include),
            "$object" => Ok(CommandKind::Object),
            "$set" => Ok(CommandKind::Set),
            other => Err(CmdError::unknown_command(other)),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of navigation into a document.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
    /// First element of an array whose `key` field equals `value`.
    Search { key: &'a str, value: &'a Value },
}

impl<'a> PathSegment<'a> {
    pub fn parse(raw: &'a Value) -> Result<Self, CmdError> {
        match raw {
            Value::String(key) => Ok(PathSegment::Key(key)),
            Value::Number(n) => {
                if let Some(index) = n.as_u64().and_then(|u| u32::try_from(u).ok()) {
                    return Ok(PathSegment::Index(index as usize));
                }
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                        Ok(PathSegment::Index(f as usize))
                    }
                    _ => Err(CmdError::path(
                        210,
                        format!("path part {} is not a valid index, must be a non-negative integer or a string", n),
                    )),
                }
            }
            Value::Array(parts) => Self::parse_search(parts),
            other => Err(CmdError::path(
                212,
                format!("path part is of type {}, must be an integer, a string or a search", type_name(other)),
            )),
        }
    }

    fn parse_search(parts: &'a [Value]) -> Result<Self, CmdError> {
        match parts.first() {
            Some(Value::String(marker)) if marker == SEARCH_MARKER => {}
            _ => {
                return Err(CmdError::path(
                    211,
                    format!("array path part {} is not a search", preview(&Value::Array(parts.to_vec()))),
                )
                .with_hint("Search segments are written [\"$search\", \"field\", value]"));
            }
        }

        if parts.len() != 3 {
            return Err(CmdError::search(
                220,
                format!("array search requires 2 arguments, got {}", parts.len() - 1),
            ));
        }

        let key = parts[1].as_str().ok_or_else(|| {
            CmdError::search(
                221,
                format!("array search field must be a string, got {}", type_name(&parts[1])),
            )
        })?;

        Ok(PathSegment::Search { key, value: &parts[2] })
    }
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "'{}'", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
            PathSegment::Search { key, value } => write!(f, "[{} == {}]", key, preview(value)),
        }
    }
}

/// A command tuple, borrowed from the command list it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Set { path: Vec<PathSegment<'a>>, value: &'a Value },
    Append { path: Vec<PathSegment<'a>>, value: &'a Value },
    Erase { path: Vec<PathSegment<'a>> },
    Object { name: &'a str, base: Option<&'a str> },
    Include { file: &'a str },
}

impl<'a> Command<'a> {
    /// Parse a raw `[name, args...]` tuple.
    pub fn parse(raw: &'a Value) -> Result<Self, CmdError> {
        let parts = raw.as_array().ok_or_else(|| {
            CmdError::syntax(100, format!("command must be an array, got {}", type_name(raw)))
        })?;

        let (name, args) = match parts.split_first() {
            Some((Value::String(name), args)) => (name, args),
            Some((other, _)) => {
                return Err(CmdError::syntax(101, format!("cmd is not a string: '{}'", preview(other))));
            }
            None => return Err(CmdError::syntax(102, "command is empty")),
        };

        let kind: CommandKind = name.parse()?;
        match kind {
            CommandKind::Set | CommandKind::Append => {
                let (value, path) = match args.split_last() {
                    Some((value, path)) if !path.is_empty() => (value, path),
                    _ => {
                        return Err(CmdError::syntax(
                            103,
                            format!("{} requires a path and a value, got {} argument(s)", kind, args.len()),
                        ));
                    }
                };
                let path = parse_path(path)?;
                Ok(if kind == CommandKind::Set {
                    Command::Set { path, value }
                } else {
                    Command::Append { path, value }
                })
            }
            CommandKind::Erase => {
                if args.is_empty() {
                    return Err(CmdError::syntax(104, "$erase requires a path"));
                }
                Ok(Command::Erase { path: parse_path(args)? })
            }
            CommandKind::Object => {
                if args.is_empty() || args.len() > 2 {
                    return Err(CmdError::syntax(
                        105,
                        format!("$object requires a name and an optional parent, got {} argument(s)", args.len()),
                    ));
                }
                let name = args[0].as_str().ok_or_else(|| {
                    CmdError::object(240, format!("$object name must be a string, got {}", type_name(&args[0])))
                })?;
                let base = match args.get(1) {
                    Some(Value::String(base)) => Some(base.as_str()),
                    Some(other) => {
                        return Err(CmdError::object(
                            241,
                            format!("$object parent is not a string, got {}", type_name(other)),
                        ));
                    }
                    None => None,
                };
                Ok(Command::Object { name, base })
            }
            CommandKind::Include => match args {
                [Value::String(file)] => Ok(Command::Include { file }),
                _ => Err(CmdError::syntax(106, "$include requires 1 string argument")),
            },
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Set { .. } => CommandKind::Set,
            Command::Append { .. } => CommandKind::Append,
            Command::Erase { .. } => CommandKind::Erase,
            Command::Object { .. } => CommandKind::Object,
            Command::Include { .. } => CommandKind::Include,
        }
    }
}

fn parse_path(raw: &[Value]) -> Result<Vec<PathSegment<'_>>, CmdError> {
    raw.iter().map(PathSegment::parse).collect()
}

/// True if a document has the shape of a command file: a non-empty root array whose
/// first element is a command tuple with a known command name.
///
/// Only the first element is inspected; malformed later commands surface as errors
/// during resolution.
pub fn is_command_file(document: &Value) -> bool {
    document
        .as_array()
        .and_then(|commands| commands.first())
        .and_then(CommandKind::of)
        .is_some()
}
