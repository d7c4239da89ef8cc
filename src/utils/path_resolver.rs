use crate::config::DEFAULT_CONFIG_FILE;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const LOG_FOLDER_NAME: &str = "Portal_Log";

/// Resolve deployment folder (absolute path)
pub fn resolve_deployment_folder() -> Result<PathBuf> {
    // Prefer the folder where the binary is running from
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return Ok(dir.to_path_buf());
        }
    }

    // Fallback: current working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    Ok(cwd)
}

/// Resolve log folder (absolute path)
///
/// Walks up from the working directory looking for an existing `Portal_Log/` or a portal
/// root (the folder holding `portal.toml`), so running from a subdirectory does not scatter
/// log folders around the tree. Falls back to the deployment folder.
pub fn resolve_log_folder() -> Result<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(found) = find_log_folder_from(&cwd) {
            std::fs::create_dir_all(&found)
                .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
            return Ok(found);
        }
    }

    let base = resolve_deployment_folder()?;
    let log_dir = base.join(LOG_FOLDER_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

fn find_log_folder_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    for _ in 0..12 {
        let candidate = dir.join(LOG_FOLDER_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if dir.join(DEFAULT_CONFIG_FILE).is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_existing_log_folder_in_parent() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(LOG_FOLDER_NAME)).unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_log_folder_from(&nested),
            Some(root.path().join(LOG_FOLDER_NAME))
        );
    }

    #[test]
    fn portal_config_marks_the_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[api]\n").unwrap();
        std::fs::create_dir_all(root.path().join("exports").join("2025")).unwrap();

        assert_eq!(
            find_log_folder_from(&root.path().join("exports").join("2025")),
            Some(root.path().join(LOG_FOLDER_NAME))
        );
    }

    #[test]
    fn unrelated_cargo_project_is_not_a_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("Cargo.toml"), "[package]").unwrap();
        std::fs::create_dir_all(root.path().join("src").join("bin")).unwrap();

        let found = find_log_folder_from(&root.path().join("src").join("bin"));
        assert_ne!(found, Some(root.path().join(LOG_FOLDER_NAME)));
        assert!(!root.path().join(LOG_FOLDER_NAME).exists());
    }
}
