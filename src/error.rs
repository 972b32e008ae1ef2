// Author: Dustin Pilgrim
// License: MIT

use thiserror::Error;

/// The main error type for command file resolution and resolved config access.
///
/// Resolution errors carry the file name and the index of the failing command.
/// Those are unknown where the error is raised (deep inside path navigation) and
/// are filled in by the interpreter through [`CmdError::at`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CmdError {
    /// Command tuple is malformed or has the wrong number of arguments.
    #[error("[CMD] Syntax Error in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    SyntaxError {
        message: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Unknown command '{name}' in {}{}", location(.file, .command), suffix(.hint, .code))]
    UnknownCommand {
        name: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// A path segment disagrees with the container it addresses.
    #[error("[CMD] Path Error in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    PathError {
        message: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Search Error in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    SearchError {
        message: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Erase Error in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    EraseError {
        message: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Object Error in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    ObjectError {
        message: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when `$include` cannot produce usable content. A failure inside the
    /// included file is kept as the source.
    #[error("[CMD] Include Error '{include}' in {}: {message}{}", location(.file, .command), suffix(.hint, .code))]
    IncludeError {
        message: String,
        include: String,
        file: String,
        command: usize,
        hint: Option<String>,
        code: Option<u32>,
        #[source]
        source: Option<Box<CmdError>>,
    },
    #[error("[CMD] File Error '{path}': {message}{}", suffix(.hint, .code))]
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised by the config accessors when a path has no value.
    #[error("[CMD] Path '{path}' not found{}", suffix(.hint, .code))]
    NotFound {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Type Error at '{path}': {message}{}", suffix(.hint, .code))]
    TypeError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[CMD] Validation Error at '{path}': {message}{}", suffix(.hint, .code))]
    ValidationError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn location(file: &str, command: &usize) -> String {
    if file.is_empty() {
        format!("<input>({})", command)
    } else {
        format!("{}({})", file, command)
    }
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl CmdError {
    pub(crate) fn syntax(code: u32, message: impl Into<String>) -> Self {
        CmdError::SyntaxError {
            message: message.into(),
            file: String::new(),
            command: 0,
            hint: None,
            code: Some(code),
        }
    }

    pub(crate) fn unknown_command(name: impl Into<String>) -> Self {
        CmdError::UnknownCommand {
            name: name.into(),
            file: String::new(),
            command: 0,
            hint: Some("Valid commands are $set, $append, $erase, $object and $include".into()),
            code: Some(110),
        }
    }

    pub(crate) fn path(code: u32, message: impl Into<String>) -> Self {
        CmdError::PathError {
            message: message.into(),
            file: String::new(),
            command: 0,
            hint: None,
            code: Some(code),
        }
    }

    pub(crate) fn search(code: u32, message: impl Into<String>) -> Self {
        CmdError::SearchError {
            message: message.into(),
            file: String::new(),
            command: 0,
            hint: None,
            code: Some(code),
        }
    }

    pub(crate) fn erase(code: u32, message: impl Into<String>) -> Self {
        CmdError::EraseError {
            message: message.into(),
            file: String::new(),
            command: 0,
            hint: Some("Check for a typo or an element removed by an earlier command".into()),
            code: Some(code),
        }
    }

    pub(crate) fn object(code: u32, message: impl Into<String>) -> Self {
        CmdError::ObjectError {
            message: message.into(),
            file: String::new(),
            command: 0,
            hint: None,
            code: Some(code),
        }
    }

    pub(crate) fn include(
        code: u32,
        include: impl Into<String>,
        message: impl Into<String>,
        source: Option<CmdError>,
    ) -> Self {
        CmdError::IncludeError {
            message: message.into(),
            include: include.into(),
            file: String::new(),
            command: 0,
            hint: None,
            code: Some(code),
            source: source.map(Box::new),
        }
    }

    /// Helper for file-related errors when loading/parsing documents.
    pub fn file_error(message: String, path: String) -> Self {
        CmdError::FileError {
            message,
            path,
            hint: Some("Check file path and permissions".into()),
            code: Some(300),
        }
    }

    /// Replace the hint.
    pub fn with_hint(mut self, new_hint: impl Into<String>) -> Self {
        match &mut self {
            CmdError::SyntaxError { hint, .. }
            | CmdError::UnknownCommand { hint, .. }
            | CmdError::PathError { hint, .. }
            | CmdError::SearchError { hint, .. }
            | CmdError::EraseError { hint, .. }
            | CmdError::ObjectError { hint, .. }
            | CmdError::IncludeError { hint, .. }
            | CmdError::FileError { hint, .. }
            | CmdError::NotFound { hint, .. }
            | CmdError::TypeError { hint, .. }
            | CmdError::ValidationError { hint, .. } => *hint = Some(new_hint.into()),
        }
        self
    }

    /// Attach the file name and command index, unless an inner resolution already did.
    pub fn at(mut self, file_name: &str, index: usize) -> Self {
        match &mut self {
            CmdError::SyntaxError { file, command, .. }
            | CmdError::UnknownCommand { file, command, .. }
            | CmdError::PathError { file, command, .. }
            | CmdError::SearchError { file, command, .. }
            | CmdError::EraseError { file, command, .. }
            | CmdError::ObjectError { file, command, .. }
            | CmdError::IncludeError { file, command, .. } => {
                if file.is_empty() {
                    *file = file_name.to_string();
                    *command = index;
                }
            }
            _ => {}
        }
        self
    }

    /// The numeric diagnostic code, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            CmdError::SyntaxError { code, .. }
            | CmdError::UnknownCommand { code, .. }
            | CmdError::PathError { code, .. }
            | CmdError::SearchError { code, .. }
            | CmdError::EraseError { code, .. }
            | CmdError::ObjectError { code, .. }
            | CmdError::IncludeError { code, .. }
            | CmdError::FileError { code, .. }
            | CmdError::NotFound { code, .. }
            | CmdError::TypeError { code, .. }
            | CmdError::ValidationError { code, .. } => *code,
        }
    }

    /// Follow include errors down to the error that started the failure.
    pub fn root_cause(&self) -> &CmdError {
        match self {
            CmdError::IncludeError { source: Some(inner), .. } => inner.root_cause(),
            other => other,
        }
    }
}
