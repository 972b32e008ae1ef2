// Author: Dustin Pilgrim
// License: MIT

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::command::is_command_file;
use crate::error::CmdError;
use crate::interpreter::{resolve_command_file_with, ResolveOptions};
use crate::resolver::{FileResolver, MemoryResolver, Resolver};

mod access;
mod helpers;
mod validation;

pub use helpers::AccessSegment;

/// A fully resolved document plus typed, path-based access to it.
///
/// Loading runs any command list through the interpreter first, so callers only
/// ever see plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    root: Value,
    source: String,
}

impl ResolvedConfig {
    /// Load a JSON file and resolve it if it is a command file. Includes are looked
    /// up relative to the file's directory.
    ///
    /// # Example
    /// ```no_run
    /// use cmdfile::ResolvedConfig;
    ///
    /// # fn main() -> Result<(), cmdfile::CmdError> {
    /// let config = ResolvedConfig::from_file("config/app.json")?;
    /// let port: u16 = config.get("server.port")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CmdError> {
        Self::from_file_with_options(path, ResolveOptions::default())
    }

    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: ResolveOptions) -> Result<Self, CmdError> {
        let path_ref = path.as_ref();
        let base_dir = path_ref.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path_ref
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| CmdError::FileError {
                message: "path has no file name".into(),
                path: path_ref.display().to_string(),
                hint: Some("Point at a .json file, not a directory".into()),
                code: Some(300),
            })?;

        let resolver = FileResolver::new(base_dir).with_options(options.clone());
        let document = resolver.load(&file_name)?;
        debug!(path = %path_ref.display(), commands = is_command_file(&document), "loaded config");
        Self::resolve(&resolver, &file_name, document, &options, path_ref.display().to_string())
    }

    /// Load from `primary`, or from `fallback` when the primary file cannot be read.
    ///
    /// Errors other than file errors (a broken command, a bad include) are reported
    /// for the primary file without trying the fallback.
    pub fn from_file_with_fallback<P: AsRef<Path>>(primary: P, fallback: P) -> Result<Self, CmdError> {
        match Self::from_file(&primary) {
            Ok(config) => Ok(config),
            Err(CmdError::FileError { .. }) => {
                debug!(fallback = %fallback.as_ref().display(), "primary config unavailable, using fallback");
                Self::from_file(&fallback).map_err(|e| match e {
                    CmdError::FileError { message, .. } => CmdError::FileError {
                        message: format!(
                            "Failed to load config from primary path '{}' or fallback path '{}': {}",
                            primary.as_ref().display(),
                            fallback.as_ref().display(),
                            message
                        ),
                        path: format!(
                            "{} (fallback: {})",
                            primary.as_ref().display(),
                            fallback.as_ref().display()
                        ),
                        hint: Some("Check that at least one of the config files exists".into()),
                        code: Some(301),
                    },
                    other => other,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Parse JSON text. A command list is resolved with no includes available.
    pub fn from_str(content: &str) -> Result<Self, CmdError> {
        let document: Value = serde_json::from_str(content).map_err(|e| CmdError::FileError {
            message: format!("Failed to parse JSON: {}", e),
            path: "<string>".into(),
            hint: None,
            code: Some(303),
        })?;
        Self::from_value(document)
    }

    /// Wrap an in-memory document, resolving it if it is a command list.
    pub fn from_value(document: Value) -> Result<Self, CmdError> {
        Self::resolve(
            &MemoryResolver::new(),
            "<value>",
            document,
            &ResolveOptions::default(),
            "<value>".into(),
        )
    }

    /// Resolve `document` against a caller-supplied resolver.
    pub fn from_resolver(resolver: &dyn Resolver, filename: &str, document: Value) -> Result<Self, CmdError> {
        Self::resolve(resolver, filename, document, &ResolveOptions::default(), filename.to_string())
    }

    fn resolve(
        resolver: &dyn Resolver,
        filename: &str,
        document: Value,
        options: &ResolveOptions,
        source: String,
    ) -> Result<Self, CmdError> {
        let root = if is_command_file(&document) {
            resolve_command_file_with(resolver, filename, &document, options)?
        } else {
            document
        };
        Ok(Self { root, source })
    }

    /// The resolved document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Where the document came from: a path, or `<string>`/`<value>`.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

#[cfg(test)]
mod tests;
