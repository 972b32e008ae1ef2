// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::command::is_command_file;
use crate::error::CmdError;
use crate::interpreter::{resolve_command_file_at_depth, ResolveOptions};

/// Turns a file name into a document for `$include`.
///
/// `resolve_commands` asks for command files to come back already resolved. Without
/// it the raw document is returned and the interpreter runs its commands in place.
pub trait Resolver {
    fn resolve(&self, filename: &str, resolve_commands: bool) -> Result<Value, CmdError>;

    /// Called for an `$include` that is `depth` levels deep. Resolvers that run
    /// command files themselves should start them at `depth` so the include limit
    /// still applies.
    fn resolve_nested(&self, filename: &str, resolve_commands: bool, depth: usize) -> Result<Value, CmdError> {
        let _ = depth;
        self.resolve(filename, resolve_commands)
    }
}

/// Closures returning `None` for "no such document".
impl<F> Resolver for F
where
    F: Fn(&str, bool) -> Option<Value>,
{
    fn resolve(&self, filename: &str, resolve_commands: bool) -> Result<Value, CmdError> {
        self(filename, resolve_commands).ok_or_else(|| {
            CmdError::file_error("resolver returned no document".into(), filename.to_string())
        })
    }
}

/// Named in-memory documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    documents: IndexMap<String, Value>,
    options: ResolveOptions,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_document(mut self, name: impl Into<String>, document: Value) -> Self {
        self.insert(name, document);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.documents.insert(name.into(), document);
    }

    pub fn get_document(&self, name: &str) -> Option<&Value> {
        self.documents.get(name)
    }

    pub fn has_document(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }
}

impl Resolver for MemoryResolver {
    fn resolve(&self, filename: &str, resolve_commands: bool) -> Result<Value, CmdError> {
        self.resolve_nested(filename, resolve_commands, 0)
    }

    fn resolve_nested(&self, filename: &str, resolve_commands: bool, depth: usize) -> Result<Value, CmdError> {
        let document = self.documents.get(filename).ok_or_else(|| CmdError::FileError {
            message: "no document with this name".into(),
            path: filename.to_string(),
            hint: Some(format!("Known documents: {}", self.names().join(", "))),
            code: Some(302),
        })?;

        if resolve_commands && is_command_file(document) {
            resolve_command_file_at_depth(self, filename, document, &self.options, depth)
        } else {
            Ok(document.clone())
        }
    }
}

/// JSON files on disk, named relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
    options: ResolveOptions,
}

impl FileResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Expand "~/" and resolve relative names against the base directory.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf, CmdError> {
        let mut p = if let Some(rest) = filename.strip_prefix("~/") {
            let home = dirs::home_dir().ok_or_else(|| CmdError::FileError {
                message: "Could not determine home directory for ~ expansion".into(),
                path: filename.to_string(),
                hint: Some("Set HOME or use an absolute path in $include".into()),
                code: Some(300),
            })?;
            home.join(rest)
        } else {
            PathBuf::from(filename)
        };

        if p.is_relative() {
            p = self.base_dir.join(p);
        }
        Ok(p)
    }

    /// Read and parse a document without resolving it.
    pub fn load(&self, filename: &str) -> Result<Value, CmdError> {
        let path = self.path_for(filename)?;
        debug!(path = %path.display(), "loading document");

        let content = fs::read_to_string(&path).map_err(|e| CmdError::FileError {
            message: format!("Failed to read file: {}", e),
            path: path.to_string_lossy().to_string(),
            hint: Some("Check that the file exists and is readable".into()),
            code: Some(301),
        })?;

        serde_json::from_str(&content).map_err(|e| CmdError::FileError {
            message: format!("Failed to parse JSON: {}", e),
            path: path.to_string_lossy().to_string(),
            hint: None,
            code: Some(303),
        })
    }
}

impl Resolver for FileResolver {
    fn resolve(&self, filename: &str, resolve_commands: bool) -> Result<Value, CmdError> {
        self.resolve_nested(filename, resolve_commands, 0)
    }

    fn resolve_nested(&self, filename: &str, resolve_commands: bool, depth: usize) -> Result<Value, CmdError> {
        let document = self.load(filename)?;
        if resolve_commands && is_command_file(&document) {
            resolve_command_file_at_depth(self, filename, &document, &self.options, depth)
        } else {
            Ok(document)
        }
    }
}
