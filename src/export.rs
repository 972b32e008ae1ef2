// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::ResolvedConfig;
use crate::error::CmdError;

/// Serialize a document to JSON text.
///
/// Table keys keep the order the commands created them in.
///
/// # Examples
/// ```
/// use cmdfile::{export::export_to_json, resolve_command_file, MemoryResolver};
/// use serde_json::json;
///
/// let resolved = resolve_command_file(
///     &MemoryResolver::new(),
///     "app.json",
///     &json!([["$set", "b", 1], ["$set", "a", 2]]),
/// ).unwrap();
/// assert_eq!(export_to_json(&resolved, false).unwrap(), r#"{"b":1,"a":2}"#);
/// ```
pub fn export_to_json(document: &Value, pretty: bool) -> Result<String, CmdError> {
    let text = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    text.map_err(|e| CmdError::FileError {
        message: format!("Failed to serialize document: {}", e),
        path: "<memory>".into(),
        hint: None,
        code: Some(500),
    })
}

/// Load a file, resolve it if it is a command file, and return the result as
/// pretty-printed JSON.
///
/// # Examples
/// ```no_run
/// use cmdfile::export::export_command_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let json = export_command_file("config/app.json")?;
/// println!("{}", json);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Returns error if the file can't be read, isn't JSON, or fails to resolve.
pub fn export_command_file<P: AsRef<Path>>(path: P) -> Result<String, CmdError> {
    let config = ResolvedConfig::from_file(path)?;
    export_to_json(config.root(), true)
}

/// Write a document to `path` as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>>(document: &Value, path: P) -> Result<(), CmdError> {
    let text = export_to_json(document, true)?;
    fs::write(path.as_ref(), text).map_err(|e| CmdError::FileError {
        message: format!("Failed to write file: {}", e),
        path: path.as_ref().to_string_lossy().to_string(),
        hint: Some("Check that the directory exists and is writable".into()),
        code: Some(501),
    })
}

impl ResolvedConfig {
    /// The resolved document as JSON text.
    pub fn to_json(&self, pretty: bool) -> Result<String, CmdError> {
        export_to_json(self.root(), pretty)
    }
}
