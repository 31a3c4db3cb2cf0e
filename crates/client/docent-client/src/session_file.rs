//! Persistence for the session token between runs
//!
//! The token from the `session_token` cookie is kept in a plain text file,
//! by default under the user config directory. `DOCENT_SESSION_FILE`
//! overrides the location.

use std::path::PathBuf;

use docent_core::Result;

/// Environment variable overriding the session file location
pub const SESSION_FILE_ENV: &str = "DOCENT_SESSION_FILE";

/// Path of the session file
pub fn session_file_path() -> PathBuf {
    if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    default_session_path(dirs::config_dir())
}

fn default_session_path(config_dir: Option<PathBuf>) -> PathBuf {
    match config_dir {
        Some(dir) => dir.join("docent").join("session"),
        None => PathBuf::from(".docent-session"),
    }
}

/// Load the persisted session token, if a non-empty one exists
pub fn load_session() -> Option<String> {
    let path = session_file_path();
    let contents = std::fs::read_to_string(&path).ok()?;
    let token = contents.trim();
    if token.is_empty() {
        tracing::debug!(path = %path.display(), "session file is empty");
        return None;
    }
    Some(token.to_string())
}

/// Persist the session token
pub fn save_session(token: &str) -> Result<()> {
    let path = session_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, token)?;
    tracing::debug!(path = %path.display(), "session token saved");
    Ok(())
}

/// Remove the persisted session token
pub fn clear_session() -> Result<()> {
    let path = session_file_path();
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_lands_under_config_dir() {
        let path = default_session_path(Some(PathBuf::from("/home/user/.config")));
        assert_eq!(path, PathBuf::from("/home/user/.config/docent/session"));
    }

    #[test]
    fn default_path_falls_back_without_config_dir() {
        let path = default_session_path(None);
        assert_eq!(path, PathBuf::from(".docent-session"));
    }

    #[test]
    fn save_load_clear_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("session");
        std::env::set_var(SESSION_FILE_ENV, &file);

        assert!(load_session().is_none());
        save_session("token-xyz").expect("save");
        assert_eq!(load_session().as_deref(), Some("token-xyz"));

        std::fs::write(&file, "  \n").expect("write blank");
        assert!(load_session().is_none());

        save_session("token-xyz").expect("save again");
        clear_session().expect("clear");
        assert!(load_session().is_none());
        clear_session().expect("clear twice is fine");

        std::env::remove_var(SESSION_FILE_ENV);
    }
}
