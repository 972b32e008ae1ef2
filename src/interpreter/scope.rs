use std::fmt;

/// Root-relative path that `$set`, `$append` and `$erase` paths are prefixed with.
///
/// Starts at the root and is replaced wholesale by every `$object` command. One scope
/// is shared by a command file and everything it includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    keys: Vec<String>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    /// Make the root-level table `name` the current object.
    pub fn enter_object(&mut self, name: &str) {
        self.keys.clear();
        self.keys.push(name.to_string());
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.keys.join("."))
        }
    }
}
