use std::io::ErrorKind;
use std::path::Path;

use updater_core::UpdateError;

/// Delete every entry of `dist_dir`. A missing directory counts as clean.
pub fn clean_dist(dist_dir: &Path) -> Result<(), UpdateError> {
    let entries = match std::fs::read_dir(dist_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dist_dir.display(), "no build output to clean");
            return Ok(());
        }
        Err(source) => {
            return Err(UpdateError::Cleanup {
                entry: dist_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut removed = 0usize;
    for entry in entries {
        let entry = entry.map_err(|source| UpdateError::Cleanup {
            entry: dist_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|source| UpdateError::Cleanup {
            entry: path.clone(),
            source,
        })?;
        removed += 1;
    }

    tracing::info!(dir = %dist_dir.display(), removed, "cleaned build output");
    Ok(())
}
