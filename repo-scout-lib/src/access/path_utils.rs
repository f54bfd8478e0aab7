use std::path::{Component, Path};

/// Make an owner or repository name safe to use as a single directory name.
#[must_use]
pub fn sanitize_path_component(s: &str) -> String {
    let s = s.replace("..", "__");
    s.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
}

/// Whether a `/`-separated repository path stays inside the repository root.
#[must_use]
pub fn is_contained(relative: &str) -> bool {
    !relative.is_empty()
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Render `path` relative to `root` with `/` separators.
#[must_use]
pub fn to_repo_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_normal_names() {
        assert_eq!(sanitize_path_component("octocat"), "octocat");
        assert_eq!(sanitize_path_component("hello.world"), "hello.world");
        assert_eq!(sanitize_path_component("my-repo_2"), "my-repo_2");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_path_component(".."), "__");
        assert_eq!(sanitize_path_component("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_path_component("a:b|c"), "a_b_c");
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained("docs/index.md"));
        assert!(is_contained("./README.md"));
        assert!(!is_contained("../secret"));
        assert!(!is_contained("docs/../../secret"));
        assert!(!is_contained("/etc/passwd"));
        assert!(!is_contained(""));
    }

    #[test]
    fn test_to_repo_path() {
        let root = Path::new("clones").join("octo").join("hello");
        let file = root.join("docs").join("index.md");
        assert_eq!(to_repo_path(&root, &file).as_deref(), Some("docs/index.md"));
        assert_eq!(to_repo_path(&root, &root), None);
    }
}
