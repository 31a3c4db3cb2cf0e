//! Configuration management and environment variable loading

use crate::{DocentError, Result};
use std::env;
use std::path::Path;

/// Load environment variables from .env file
///
/// Loads variables from a .env file in the current directory or a parent
/// directory. Missing files are fine; the system environment still applies.
///
/// # Example
///
/// ```no_run
/// use docent_core::load_env;
///
/// load_env().ok();
///
/// let api_url = std::env::var("DOCENT_API_URL").unwrap_or_default();
/// ```
pub fn load_env() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from: {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::LineParse(line, pos)) => Err(DocentError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => {
            tracing::debug!("No .env file found - using system environment variables only");
            Ok(())
        }
        Err(e) => Err(DocentError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(_) => {
            tracing::debug!("Loaded environment from: {}", path.as_ref().display());
            Ok(())
        }
        Err(e) => Err(DocentError::config(format!(
            "Failed to load {} environment file: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// Get required environment variable
///
/// Returns an error if the variable is not set
pub fn get_required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| {
        DocentError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            key
        ))
    })
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| match v.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Get environment variable as integer
pub fn get_env_int<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Validate that required environment variables are set
pub fn validate_env(required_vars: &[&str]) -> Result<()> {
    let mut missing = Vec::new();

    for var in required_vars {
        if env::var(var).is_err() {
            missing.push(*var);
        }
    }

    if !missing.is_empty() {
        return Err(DocentError::config(format!(
            "Missing required environment variables: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_bool() {
        env::set_var("DOCENT_TEST_BOOL_TRUE", "true");
        env::set_var("DOCENT_TEST_BOOL_OFF", "off");

        assert!(get_env_bool("DOCENT_TEST_BOOL_TRUE", false));
        assert!(!get_env_bool("DOCENT_TEST_BOOL_OFF", true));
        assert!(get_env_bool("DOCENT_TEST_NONEXISTENT", true));
        assert!(!get_env_bool("DOCENT_TEST_NONEXISTENT", false));

        env::remove_var("DOCENT_TEST_BOOL_TRUE");
        env::remove_var("DOCENT_TEST_BOOL_OFF");
    }

    #[test]
    fn test_get_env_int() {
        env::set_var("DOCENT_TEST_INT", "120");
        assert_eq!(get_env_int("DOCENT_TEST_INT", 0u64), 120);
        assert_eq!(get_env_int("DOCENT_TEST_NONEXISTENT_INT", 99u64), 99);
        env::remove_var("DOCENT_TEST_INT");
    }

    #[test]
    fn test_get_env_or() {
        env::set_var("DOCENT_TEST_STRING", "hello");
        assert_eq!(get_env_or("DOCENT_TEST_STRING", "default"), "hello");
        assert_eq!(get_env_or("DOCENT_TEST_NONEXISTENT", "default"), "default");
        env::remove_var("DOCENT_TEST_STRING");
    }

    #[test]
    fn test_validate_env_reports_missing() {
        env::set_var("DOCENT_TEST_PRESENT", "1");
        assert!(validate_env(&["DOCENT_TEST_PRESENT"]).is_ok());

        let err = validate_env(&["DOCENT_TEST_PRESENT", "DOCENT_TEST_ABSENT"]).unwrap_err();
        assert!(err.to_string().contains("DOCENT_TEST_ABSENT"));
        env::remove_var("DOCENT_TEST_PRESENT");
    }
}
