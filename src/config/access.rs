use serde::de::DeserializeOwned;

use super::*;
use crate::utils::type_name;

impl ResolvedConfig {
    /// Get a typed value using dot notation with bracketed indices.
    ///
    /// Automatically handles both `snake_case` and `kebab-case` key names.
    ///
    /// # Examples
    /// ```no_run
    /// # use cmdfile::ResolvedConfig;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = ResolvedConfig::from_file("config.json")?;
    /// let host: String = config.get("servers[0].host")?;
    /// let port: u16 = config.get("servers[0].port")?;
    /// let debug: bool = config.get("debug")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns error if path doesn't exist or value can't be converted to type T.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CmdError> {
        let value = self.get_value_flexible(path)?;
        convert(path, value)
    }

    /// Get an optional typed value - returns `None` if key doesn't exist.
    pub fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CmdError> {
        match self.get_value_flexible(path) {
            Ok(value) => Ok(Some(convert(path, value)?)),
            Err(CmdError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a value with a fallback default.
    ///
    /// # Examples
    /// ```
    /// # use cmdfile::ResolvedConfig;
    /// let config = ResolvedConfig::from_str(r#"{"server": {"port": 8080}}"#).unwrap();
    /// assert_eq!(config.get_or("server.port", 80u16), 8080);
    /// assert_eq!(config.get_or("server.timeout", 30u64), 30);
    /// ```
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get(path).unwrap_or(default)
    }

    fn get_value_flexible(&self, path: &str) -> Result<Value, CmdError> {
        let segments = helpers::parse_access_path(path)?;
        helpers::lookup_flexible(&self.root, &segments)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    /// Get a raw `Value`, matching keys exactly.
    pub fn get_value(&self, path: &str) -> Result<Value, CmdError> {
        let segments = helpers::parse_access_path(path)?;
        helpers::lookup(&self.root, &segments)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    /// Get all keys of the table at `path`, in document order.
    pub fn get_keys(&self, path: &str) -> Result<Vec<String>, CmdError> {
        match self.get_value_flexible(path)? {
            Value::Object(table) => Ok(table.keys().cloned().collect()),
            other => Err(CmdError::TypeError {
                message: format!("Path '{}' is a {}, not a table", path, type_name(&other)),
                path: path.to_string(),
                hint: Some("Only tables have keys".into()),
                code: Some(406),
            }),
        }
    }

    /// Check if a configuration path exists.
    pub fn has(&self, path: &str) -> bool {
        self.get_value_flexible(path).is_ok()
    }
}

fn not_found(path: &str) -> CmdError {
    CmdError::NotFound {
        path: path.to_string(),
        hint: Some("Check that the path exists in the resolved document".into()),
        code: Some(404),
    }
}

fn convert<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, CmdError> {
    let found = type_name(&value);
    serde_json::from_value(value).map_err(|e| CmdError::TypeError {
        message: format!("cannot convert {} value: {}", found, e),
        path: path.to_string(),
        hint: Some(format!("Expected {}", std::any::type_name::<T>())),
        code: Some(407),
    })
}
