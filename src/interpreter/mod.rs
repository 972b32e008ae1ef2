// Author: Dustin Pilgrim
// License: MIT

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::command::{is_command_file, Command, CommandKind};
use crate::error::CmdError;
use crate::path;
use crate::resolver::Resolver;
use crate::utils::{combine_and_simplify, type_name};

mod scope;

pub use scope::Scope;

/// Knobs for a resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Report the failing command with `tracing::warn!` before returning the error.
    pub log_errors: bool,
    /// Maximum nesting of `$include` command files resolved in place.
    pub max_include_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            log_errors: false,
            max_include_depth: 64,
        }
    }
}

/// Executes command lists against a document.
///
/// One interpreter owns one [`Scope`]; included command files run through the same
/// interpreter, so an `$object` inside an include is still in effect after it.
pub struct Interpreter<'r> {
    resolver: &'r dyn Resolver,
    options: ResolveOptions,
    scope: Scope,
    depth: usize,
}

impl<'r> Interpreter<'r> {
    pub fn new(resolver: &'r dyn Resolver) -> Self {
        Self::with_options(resolver, ResolveOptions::default())
    }

    pub fn with_options(resolver: &'r dyn Resolver, options: ResolveOptions) -> Self {
        Self {
            resolver,
            options,
            scope: Scope::root(),
            depth: 0,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run every command in `commands` against `document`, in order, stopping at the
    /// first failure. Mutations made before the failure stay applied.
    ///
    /// `file` names the command list; includes are looked up relative to it.
    pub fn apply(&mut self, file: &str, commands: &Value, document: &mut Value) -> Result<(), CmdError> {
        let list = commands.as_array().ok_or_else(|| {
            CmdError::syntax(
                108,
                format!("command list must be an array, got {}", type_name(commands)),
            )
            .at(file, 0)
        })?;

        for (index, raw) in list.iter().enumerate() {
            if let Err(err) = self.execute(file, list, index, raw, document) {
                let err = err.at(file, index);
                if self.options.log_errors && self.depth == 0 {
                    warn!("{}", err);
                }
                return Err(err);
            }
        }

        Ok(())
    }

    fn execute(
        &mut self,
        file: &str,
        list: &[Value],
        index: usize,
        raw: &Value,
        document: &mut Value,
    ) -> Result<(), CmdError> {
        let command = Command::parse(raw)?;
        trace!(file, index, command = %command.kind(), scope = %self.scope, "dispatch");

        match command {
            Command::Set { path, value } => {
                path::navigate(document, self.scope.keys(), &path, true)?.replace(value.clone())
            }
            Command::Append { path, value } => {
                path::navigate(document, self.scope.keys(), &path, true)?.append_into(value.clone())
            }
            Command::Erase { path } => {
                path::navigate(document, self.scope.keys(), &path, false)?.remove()?;
                Ok(())
            }
            Command::Object { name, base } => self.object(document, name, base),
            Command::Include { file: include } => {
                let next_is_object = list.get(index + 1).and_then(CommandKind::of) == Some(CommandKind::Object);
                self.include(file, include, next_is_object, document)
            }
        }
    }

    fn object(&mut self, document: &mut Value, name: &str, base: Option<&str>) -> Result<(), CmdError> {
        if document.is_null() {
            *document = Value::Object(Map::new());
        }
        let root_kind = type_name(document);
        let root = document.as_object_mut().ok_or_else(|| {
            CmdError::object(
                243,
                format!("$object '{}' requires a table at the document root, found {}", name, root_kind),
            )
        })?;

        match root.get(name) {
            Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(CmdError::object(
                    242,
                    format!("$object table '{}' already exists but is a {}, not a table", name, type_name(other)),
                ));
            }
            None => {
                let body = match base {
                    None => Map::new(),
                    Some(base) => match root.get(base) {
                        Some(Value::Object(parent)) => parent.clone(),
                        Some(other) => {
                            return Err(CmdError::object(
                                245,
                                format!("$object parent '{}' is a {}, not a table", base, type_name(other)),
                            ));
                        }
                        None => {
                            return Err(CmdError::object(244, format!("$object parent '{}' does not exist", base)));
                        }
                    },
                };
                root.insert(name.to_string(), Value::Object(body));
            }
        }

        self.scope.enter_object(name);
        debug!(object = name, base = base.unwrap_or(""), "scope changed");
        Ok(())
    }

    fn include(
        &mut self,
        file: &str,
        include: &str,
        next_is_object: bool,
        document: &mut Value,
    ) -> Result<(), CmdError> {
        let target = combine_and_simplify(file, include);

        // Nothing to layer onto yet and the next command re-anchors the scope, so the
        // include can be resolved on its own and adopted whole.
        if document.is_null() && next_is_object {
            self.check_depth(&target)?;
            debug!(include = %target, depth = self.depth + 1, "including resolved document");
            let resolved = self.resolver.resolve_nested(&target, true, self.depth + 1).map_err(|e| {
                CmdError::include(310, &target, "failed to resolve, check for typo or missing file", Some(e))
            })?;
            return match resolved {
                Value::Object(_) => {
                    *document = resolved;
                    Ok(())
                }
                other => Err(CmdError::include(
                    312,
                    &target,
                    format!("resolved to a {}, must be a table", type_name(&other)),
                    None,
                )),
            };
        }

        let raw = self.resolver.resolve(&target, false).map_err(|e| {
            CmdError::include(310, &target, "failed to resolve, check for typo or missing file", Some(e))
        })?;

        if is_command_file(&raw) {
            self.check_depth(&target)?;
            debug!(include = %target, depth = self.depth + 1, "including command file");
            self.depth += 1;
            let result = self.apply(&target, &raw, document);
            self.depth -= 1;
            return result.map_err(|e| CmdError::include(311, &target, "included command file failed", Some(e)));
        }

        match raw {
            Value::Object(table) => {
                debug!(include = %target, keys = table.len(), "merging included table");
                if document.is_null() {
                    *document = Value::Object(Map::new());
                }
                let root_kind = type_name(document);
                let root = document.as_object_mut().ok_or_else(|| {
                    CmdError::include(
                        312,
                        &target,
                        format!("cannot merge a table into a {} document root", root_kind),
                        None,
                    )
                })?;
                for (key, value) in table {
                    root.insert(key, value);
                }
                Ok(())
            }
            other => Err(CmdError::include(
                312,
                &target,
                format!(
                    "file exists but its root is a {}; is the included file a root array or otherwise invalid (must be a table)?",
                    type_name(&other)
                ),
                None,
            )),
        }
    }

    fn check_depth(&self, target: &str) -> Result<(), CmdError> {
        if self.depth >= self.options.max_include_depth {
            return Err(CmdError::include(
                313,
                target,
                format!("include depth limit of {} exceeded", self.options.max_include_depth),
                None,
            )
            .with_hint("Check for files that include each other"));
        }
        Ok(())
    }
}

/// Resolve a command list into a fresh document.
///
/// ```
/// use cmdfile::{resolve_command_file, MemoryResolver};
/// use serde_json::json;
///
/// let resolver = MemoryResolver::new()
///     .with_document("base.json", json!([["$set", "port", 80], ["$set", "host", "localhost"]]));
/// let commands = json!([["$include", "base.json"], ["$set", "port", 8080]]);
///
/// let resolved = resolve_command_file(&resolver, "app.json", &commands).unwrap();
/// assert_eq!(resolved, json!({"port": 8080, "host": "localhost"}));
/// ```
#[tracing::instrument(level = "debug", skip(resolver, commands))]
pub fn resolve_command_file(resolver: &dyn Resolver, filename: &str, commands: &Value) -> Result<Value, CmdError> {
    resolve_command_file_with(resolver, filename, commands, &ResolveOptions::default())
}

pub fn resolve_command_file_with(
    resolver: &dyn Resolver,
    filename: &str,
    commands: &Value,
    options: &ResolveOptions,
) -> Result<Value, CmdError> {
    resolve_command_file_at_depth(resolver, filename, commands, options, 0)
}

/// Resolve a command list that is itself being included `depth` levels deep.
/// Resolvers use this from [`Resolver::resolve_nested`] so that include cycles
/// hit `max_include_depth` instead of recursing without bound.
pub fn resolve_command_file_at_depth(
    resolver: &dyn Resolver,
    filename: &str,
    commands: &Value,
    options: &ResolveOptions,
    depth: usize,
) -> Result<Value, CmdError> {
    let mut resolved = Value::Null;
    let mut interpreter = Interpreter::with_options(resolver, options.clone());
    interpreter.depth = depth;
    interpreter.apply(filename, commands, &mut resolved)?;
    Ok(resolved)
}

/// Replace a command list with the document it resolves to. On failure `document`
/// still holds the original commands.
pub fn resolve_in_place(resolver: &dyn Resolver, filename: &str, document: &mut Value) -> Result<(), CmdError> {
    *document = resolve_command_file(resolver, filename, document)?;
    Ok(())
}

/// Add a chunk of commands to `document`.
///
/// A command-file document gets the chunk appended to its command list. Any other
/// document has the chunk applied on top of it from the root scope. Either way
/// `document` is only touched if the whole chunk succeeds.
pub fn append_commands(
    resolver: &dyn Resolver,
    filename: &str,
    document: &mut Value,
    chunk: &Value,
) -> Result<(), CmdError> {
    if !is_command_file(chunk) {
        return Err(CmdError::syntax(109, "chunk is not a command list").at(filename, 0));
    }

    if let (Some(existing), Some(added)) = (document.as_array_mut(), chunk.as_array()) {
        if existing.first().and_then(CommandKind::of).is_some() {
            existing.extend(added.iter().cloned());
            return Ok(());
        }
    }

    let mut updated = document.clone();
    Interpreter::new(resolver).apply(filename, chunk, &mut updated)?;
    *document = updated;
    Ok(())
}
