//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// A destination directory that sinks write entries into.
///
/// Construction verifies that the path exists, is a directory, and can be
/// canonicalized. Entry paths are only ever joined through
/// [`DestDir::join_entry`], which refuses anything that would leave the
/// directory.
///
/// # Examples
///
/// ```no_run
/// use unpipe_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// Writability is not probed up front; a read-only directory surfaces as
    /// an I/O error on the first write.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::DestinationInvalid` if the path does not
    /// exist, is not a directory, or cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = std::fs::metadata(&path).map_err(|e| invalid(&path, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(invalid(&path, "not a directory".to_string()));
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| invalid(&path, format!("failed to canonicalize: {e}")))?;

        Ok(Self(canonical))
    }

    /// Returns the canonical path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins an archive entry name to the destination.
    ///
    /// Returns `None` if the name is absolute, carries a prefix or root, or
    /// climbs above the destination with `..`. Interior `.` components are
    /// dropped.
    #[must_use]
    pub fn join_entry(&self, name: &Path) -> Option<PathBuf> {
        let mut relative = PathBuf::new();
        for component in name.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !relative.pop() {
                        return None;
                    }
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        if relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.0.join(relative))
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for DestDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

fn invalid(path: &Path, reason: String) -> ExtractionError {
    ExtractionError::DestinationInvalid {
        path: path.to_path_buf(),
        reason,
    }
}
