//! Artifact directory access.
//!
//! Every write goes to a sibling temporary file first and is renamed into
//! place, so readers never observe a partially written artifact.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors raised while accessing the artifact directory.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The runtime directory path is not valid UTF-8.
    #[error("runtime directory {0} is not valid UTF-8")]
    NonUtf8Path(String),

    /// A relative artifact path has no file name.
    #[error("artifact path '{0}' has no file name")]
    MissingFileName(Utf8PathBuf),

    /// Filesystem failure.
    #[error("artifact I/O failed for {path}: {source}")]
    Io {
        /// Path being accessed, relative to the runtime directory.
        path: Utf8PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

fn io_error(path: &Utf8Path) -> impl FnOnce(io::Error) -> WorkspaceError + '_ {
    move |source| WorkspaceError::Io {
        path: path.to_owned(),
        source,
    }
}

/// Handle on the runtime directory holding compose, gateway and side files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactWorkspace {
    root: Utf8PathBuf,
}

impl ArtifactWorkspace {
    /// Creates a handle; the directory is created lazily on first write.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NonUtf8Path`] when `root` is not UTF-8.
    pub fn new(root: &Path) -> Result<Self, WorkspaceError> {
        let utf8_root = Utf8Path::from_path(root)
            .ok_or_else(|| WorkspaceError::NonUtf8Path(root.display().to_string()))?;
        Ok(Self {
            root: utf8_root.to_owned(),
        })
    }

    /// Returns the runtime directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn open_root(&self) -> Result<Dir, WorkspaceError> {
        Dir::create_ambient_dir_all(&self.root, ambient_authority())
            .map_err(io_error(Utf8Path::new("")))?;
        Dir::open_ambient_dir(&self.root, ambient_authority()).map_err(io_error(Utf8Path::new("")))
    }

    /// Replaces the file at `relative` with `contents`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the directory or file cannot be
    /// written.
    pub fn write_atomic(&self, relative: &Utf8Path, contents: &[u8]) -> Result<(), WorkspaceError> {
        let file_name = relative
            .file_name()
            .ok_or_else(|| WorkspaceError::MissingFileName(relative.to_owned()))?;
        let root = self.open_root()?;
        let parent = relative.parent().unwrap_or_else(|| Utf8Path::new(""));
        if !parent.as_str().is_empty() {
            root.create_dir_all(parent).map_err(io_error(parent))?;
        }

        let temp_path = parent.join(format!(".{file_name}.tmp"));
        root.write(&temp_path, contents)
            .map_err(io_error(&temp_path))?;
        root.rename(&temp_path, &root, relative)
            .map_err(io_error(relative))
    }

    /// Reads a file, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] for any failure other than absence.
    pub fn read_to_string(&self, relative: &Utf8Path) -> Result<Option<String>, WorkspaceError> {
        let root = self.open_root()?;
        match root.read_to_string(relative) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(relative)(err)),
        }
    }

    /// Removes a file and any parent directories it leaves empty.
    ///
    /// Returns `false` when the file did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when removal fails.
    pub fn remove_file(&self, relative: &Utf8Path) -> Result<bool, WorkspaceError> {
        let root = self.open_root()?;
        match root.remove_file(relative) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(io_error(relative)(err)),
        }

        let mut current = relative.parent();
        while let Some(dir) = current.filter(|dir| !dir.as_str().is_empty()) {
            if root.remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
        Ok(true)
    }

    /// Finds files named `file_name` exactly two directories deep.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when a directory cannot be listed.
    pub fn find_nested_files(&self, file_name: &str) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
        let root = self.open_root()?;
        let mut found = Vec::new();
        for outer_name in subdirectories(&root, Utf8Path::new(""))? {
            let outer = root.open_dir(&outer_name).map_err(io_error(&outer_name))?;
            for inner_name in subdirectories(&outer, &outer_name)? {
                let candidate = inner_name.join(file_name);
                if outer.is_file(&candidate) {
                    found.push(outer_name.join(candidate));
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

fn subdirectories(dir: &Dir, label: &Utf8Path) -> Result<Vec<Utf8PathBuf>, WorkspaceError> {
    let mut names = Vec::new();
    for entry_result in dir.entries().map_err(io_error(label))? {
        let entry = entry_result.map_err(io_error(label))?;
        if entry.file_type().map_err(io_error(label))?.is_dir() {
            names.push(Utf8PathBuf::from(entry.file_name().map_err(io_error(label))?));
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_replaces_previous_contents() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let workspace =
            ArtifactWorkspace::new(&dir.path().join("runtime")).expect("path should be UTF-8");
        let path = Utf8Path::new("planner/0.2.0/mcp-servers.json");

        workspace
            .write_atomic(path, b"first")
            .expect("first write should succeed");
        workspace
            .write_atomic(path, b"second")
            .expect("second write should succeed");

        assert_eq!(
            workspace.read_to_string(path).expect("read should succeed"),
            Some("second".to_owned())
        );
        assert_eq!(
            workspace
                .find_nested_files("mcp-servers.json")
                .expect("listing should succeed"),
            vec![Utf8PathBuf::from("planner/0.2.0/mcp-servers.json")]
        );
    }

    #[test]
    fn remove_prunes_empty_parents() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let workspace = ArtifactWorkspace::new(dir.path()).expect("path should be UTF-8");
        let path = Utf8Path::new("planner/0.2.0/mcp-servers.json");
        workspace
            .write_atomic(path, b"{}")
            .expect("write should succeed");

        assert!(workspace.remove_file(path).expect("remove should succeed"));
        assert!(!workspace.remove_file(path).expect("remove should succeed"));
        assert!(!dir.path().join("planner").exists());
    }
}
