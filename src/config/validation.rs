use serde::de::DeserializeOwned;

use super::*;

impl ResolvedConfig {
    /// Get a value and check it with `validator`; `valid_values` describes what is
    /// accepted for the error message.
    pub fn get_validated<T, F>(&self, path: &str, validator: F, valid_values: &str) -> Result<T, CmdError>
    where
        T: DeserializeOwned + std::fmt::Debug,
        F: FnOnce(&T) -> bool,
    {
        let typed_value: T = self.get(path)?;

        if !validator(&typed_value) {
            return Err(CmdError::ValidationError {
                message: format!("Invalid value {:?}\nExpected: {}", typed_value, valid_values),
                path: path.to_string(),
                hint: Some(format!("Valid values are: {}", valid_values)),
                code: Some(450),
            });
        }

        Ok(typed_value)
    }

    /// Get a string value and validate it's one of the allowed values (case-insensitive).
    pub fn get_string_enum(&self, path: &str, allowed_values: &[&str]) -> Result<String, CmdError> {
        let value: String = self.get(path)?;
        let lower_value = value.to_lowercase();

        if !allowed_values.iter().any(|&v| v.to_lowercase() == lower_value) {
            return Err(CmdError::ValidationError {
                message: format!("Invalid value '{}'", value),
                path: path.to_string(),
                hint: Some(format!("Expected one of: {}", allowed_values.join(", "))),
                code: Some(451),
            });
        }

        Ok(value)
    }
}
