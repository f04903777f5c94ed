//! PID file management.
//!
//! Prevents duplicate daemon instances and gives operators a stable
//! way to find the running process.

use std::path::Path;

use anyhow::Result;

/// Write the current process PID to a file.
///
/// # Security
///
/// - Uses `create_new(true)` to atomically create the file (prevents TOCTOU races)
/// - Verifies the created file is a regular file (prevents symlink attacks)
/// - Creates the parent directory with restrictive permissions (0o700)
///
/// # Errors
///
/// Returns an error if the PID file already exists or cannot be written.
pub fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};

    if let Some(parent) = path.parent() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            let mut builder = fs::DirBuilder::new();
            builder.mode(0o700).recursive(true);
            builder.create(parent)?;
        }
        #[cfg(not(unix))]
        {
            fs::create_dir_all(parent)?;
        }
    }

    let pid = std::process::id();

    // Atomically create the file only if it doesn't exist
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let existing_pid = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_string());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing_pid.trim()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata()?;
    if !metadata.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file (possible symlink attack)",
            path.display()
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        file.set_permissions(permissions)?;
    }

    writeln!(file, "{}", pid)?;

    tracing::info!(pid = pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file on daemon shutdown.
///
/// Logs a warning but does not fail if the file cannot be removed.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove PID file"
        );
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}
