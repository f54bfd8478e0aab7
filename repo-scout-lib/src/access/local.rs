use super::path_utils::{is_contained, to_repo_path};
use super::{EntryKind, Tree, TreeEntry};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const LOG_TARGET: &str = "     local";

/// Read-only view of a cloned working tree.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: Arc<Path>,
}

impl LocalSource {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::from(root.as_ref()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every file and directory below the root, excluding `.git`.
    ///
    /// Unreadable entries are skipped; a missing root yields an empty tree.
    #[must_use]
    pub fn read_structure_blocking(&self) -> Tree {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
            .filter_map(|entry| match entry {
                Ok(entry) => {
                    let path = to_repo_path(&self.root, entry.path())?;
                    let kind = if entry.file_type().is_dir() {
                        EntryKind::Directory
                    } else {
                        EntryKind::File
                    };
                    Some(TreeEntry { path, kind })
                }
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Skipping unreadable entry below '{}': {e}", self.root.display());
                    None
                }
            })
            .collect()
    }

    /// Read one file as text. Missing, unreadable, or out-of-tree paths yield an empty string.
    #[must_use]
    pub fn read_file_blocking(&self, relative: &str) -> String {
        if !is_contained(relative) {
            log::warn!(target: LOG_TARGET, "Refusing to read '{relative}' outside of '{}'", self.root.display());
            return String::new();
        }

        match fs::read(self.root.join(relative)) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not read '{relative}' in '{}': {e}", self.root.display());
                String::new()
            }
        }
    }

    pub async fn read_structure(&self) -> Tree {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.read_structure_blocking())
            .await
            .unwrap_or_else(|e| {
                log::error!(target: LOG_TARGET, "Directory walk of '{}' failed: {e}", self.root.display());
                Tree::default()
            })
    }

    pub async fn read_files(&self, paths: Vec<String>) -> HashMap<String, String> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            paths
                .into_iter()
                .map(|path| {
                    let content = this.read_file_blocking(&path);
                    (path, content)
                })
                .collect()
        })
        .await
        .unwrap_or_else(|e| {
            log::error!(target: LOG_TARGET, "Reading files in '{}' failed: {e}", self.root.display());
            HashMap::new()
        })
    }
}

/// Delete the given clone directories, and the owner directories they leave empty
/// below `clone_root`. Anything else in `clone_root` is left alone.
///
/// Returns `false` if a clone could not be removed.
pub async fn sweep_clones(clone_root: &Path, clones: Vec<PathBuf>) -> bool {
    let root: PathBuf = clone_root.to_path_buf();
    tokio::task::spawn_blocking(move || sweep_blocking(&root, &clones)).await.unwrap_or(false)
}

fn sweep_blocking(root: &Path, clones: &[PathBuf]) -> bool {
    let mut all_removed = true;
    for clone in clones.iter().filter(|c| c.starts_with(root) && c.as_path() != root) {
        match fs::remove_dir_all(clone) {
            Ok(()) => log::debug!(target: LOG_TARGET, "Deleted leftover clone '{}'", clone.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not delete '{}': {e}", clone.display());
                all_removed = false;
                continue;
            }
        }

        // fails harmlessly while the owner directory holds other clones
        if let Some(owner) = clone.parent().filter(|p| *p != root) {
            let _ = fs::remove_dir(owner);
        }
    }

    all_removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("docs/design")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join("README.md"), "# Hello").unwrap();
        fs::write(root.join("docs/design/overview.md"), "architecture").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
    }

    #[test]
    fn test_structure_excludes_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let tree = LocalSource::new(dir.path()).read_structure_blocking();
        let paths: Vec<_> = tree.entries().iter().map(|e| (e.path.as_str(), e.kind)).collect();

        assert_eq!(
            paths,
            vec![
                ("README.md", EntryKind::File),
                ("docs", EntryKind::Directory),
                ("docs/design", EntryKind::Directory),
                ("docs/design/overview.md", EntryKind::File),
            ]
        );
    }

    #[test]
    fn test_missing_root_yields_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = LocalSource::new(dir.path().join("absent")).read_structure_blocking();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let local = LocalSource::new(dir.path());

        assert_eq!(local.read_file_blocking("docs/design/overview.md"), "architecture");
        assert_eq!(local.read_file_blocking("missing.txt"), "");
        assert_eq!(local.read_file_blocking("../outside"), "");
    }

    #[tokio::test]
    async fn test_read_files_async() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let local = LocalSource::new(dir.path());

        let files = local.read_files(vec!["README.md".to_string(), "nope".to_string()]).await;
        assert_eq!(files.len(), 2);
        assert_eq!(files["README.md"], "# Hello");
        assert_eq!(files["nope"], "");

        let tree = local.read_structure().await;
        assert_eq!(tree.files().count(), 2);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_given_clones() {
        let dir = tempfile::tempdir().unwrap();
        populate(&dir.path().join("octo/hello"));
        populate(&dir.path().join("octo/kept"));
        populate(&dir.path().join("solo/only"));
        fs::write(dir.path().join("notes.txt"), "mine").unwrap();

        let clones = vec![
            dir.path().join("octo/hello"),
            dir.path().join("solo/only"),
            dir.path().join("ghost/never-cloned"),
            dir.path().to_path_buf(),
        ];
        assert!(sweep_clones(dir.path(), clones).await);

        assert!(!dir.path().join("octo/hello").exists());
        assert!(dir.path().join("octo/kept/README.md").exists());
        assert!(!dir.path().join("solo").exists());
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "mine");
    }

    #[tokio::test]
    async fn test_sweep_ignores_paths_outside_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        populate(&other.path().join("octo/hello"));

        assert!(sweep_clones(root.path(), vec![other.path().join("octo/hello")]).await);
        assert!(other.path().join("octo/hello/README.md").exists());
    }
}
