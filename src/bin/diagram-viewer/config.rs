//! Profile file lookup and persisted UI state.

use crate::constants::{CONFIG_DIR_NAME, PROFILES_FILE};
use diagram_viewer::{ProfileError, ProfileSet};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a profile file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read profiles from '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid profiles in '{path}': {source}")]
    Invalid { path: PathBuf, source: ProfileError },
}

/// UI state remembered between sessions. The view transform is deliberately not part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub profile: Option<String>,
    pub last_image: Option<PathBuf>,
}

/// Default location of the user's profile file.
pub fn user_profiles_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join(CONFIG_DIR_NAME).join(PROFILES_FILE))
}

/// Loads profiles from `explicit`, else from the user config dir, else the built-in set.
///
/// An explicit path that doesn't exist is an error; a missing user file is not.
pub fn load_profiles(explicit: Option<&Path>) -> Result<ProfileSet, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match user_profiles_path().filter(|path| path.is_file()) {
            Some(path) => path,
            None => {
                log::info!("Using built-in viewer profiles");
                return Ok(ProfileSet::default());
            }
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let set = ProfileSet::from_ron(&source).map_err(|source| ConfigError::Invalid {
        path: path.clone(),
        source,
    })?;

    log::info!(
        "Loaded {} viewer profiles from {}",
        set.profiles.len(),
        path.display()
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_profiles(Some(Path::new("/definitely/not/profiles.ron")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn explicit_file_is_parsed_and_validated() {
        let dir = std::env::temp_dir().join(format!("diagram-viewer-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.ron");
        std::fs::write(
            &good,
            r#"(default: "only", profiles: [(name: "only", zoom: (max_scale: 3.0))])"#,
        )
        .unwrap();
        let set = load_profiles(Some(&good)).unwrap();
        assert_eq!(set.get("only").unwrap().zoom.max_scale, 3.0);

        let bad = dir.join("bad.ron");
        std::fs::write(
            &bad,
            r#"(default: "only", profiles: [(name: "only", zoom: (max_scale: 0.5))])"#,
        )
        .unwrap();
        assert!(matches!(
            load_profiles(Some(&bad)),
            Err(ConfigError::Invalid { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
