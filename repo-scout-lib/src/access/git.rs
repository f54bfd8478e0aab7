use crate::Result;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::fs;
use std::path::Path;
use tokio::process::Command;

const LOG_TARGET: &str = "       git";

const GIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Whether `path` is a directory with at least one entry.
pub fn is_populated(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Make a shallow clone of `repo_url` in `repo_path`.
///
/// Does nothing when `repo_path` already holds a clone. A failed clone leaves no
/// directory behind.
pub async fn clone_repo(repo_path: &Path, repo_url: &str) -> Result<()> {
    if is_populated(repo_path) {
        log::debug!(target: LOG_TARGET, "Reusing existing clone at '{}'", repo_path.display());
        return Ok(());
    }

    let path_str = repo_path.to_str().into_app_err("invalid UTF-8 in repository path")?;
    if let Some(parent) = repo_path.parent() {
        fs::create_dir_all(parent).into_app_err_with(|| format!("could not create directory '{}'", parent.display()))?;
    }

    let start_time = std::time::Instant::now();
    log::info!(target: LOG_TARGET, "Cloning '{repo_url}'");

    let result = match run_git_with_timeout(&["clone", "--depth", "1", "--single-branch", "--no-tags", repo_url, path_str]).await {
        Ok(output) => check_git_output(&output, "git clone"),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            log::debug!(target: LOG_TARGET, "Cloned '{repo_url}' in {:.3}s", start_time.elapsed().as_secs_f64());
            Ok(())
        }
        Err(e) => {
            if repo_path.exists() {
                if let Err(cleanup) = fs::remove_dir_all(repo_path) {
                    log::warn!(target: LOG_TARGET, "Could not remove partial clone '{path_str}': {cleanup}");
                }
            }
            Err(e)
        }
    }
}

fn check_git_output(output: &std::process::Output, operation: &str) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{operation} failed: {}", stderr.trim());
    }
    Ok(())
}

async fn run_git_with_timeout(args: &[&str]) -> Result<std::process::Output> {
    let child = Command::new("git")
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .into_app_err("could not spawn git command")?;

    match tokio::time::timeout(GIT_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e).into_app_err_with(|| format!("'git {}' failed to run", args.join(" "))),
        Err(_) => {
            bail!("'git {}' timed out after {} seconds", args.join(" "), GIT_TIMEOUT.as_secs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{ExitStatus, Output};

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(u32::try_from(code).unwrap_or_default())
    }

    #[test]
    fn test_check_git_output_success() {
        let output = Output {
            status: exit_status(0),
            stdout: vec![],
            stderr: vec![],
        };

        check_git_output(&output, "git clone").unwrap();
    }

    #[test]
    fn test_check_git_output_failure_includes_stderr() {
        let output = Output {
            status: exit_status(128),
            stdout: vec![],
            stderr: b"fatal: repository not found\n".to_vec(),
        };

        let err = check_git_output(&output, "git clone").unwrap_err().to_string();
        assert!(err.contains("git clone failed"));
        assert!(err.contains("repository not found"));
    }

    #[test]
    fn test_is_populated() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_populated(dir.path()));
        assert!(!is_populated(&dir.path().join("missing")));

        fs::write(dir.path().join("README.md"), "hello").unwrap();
        assert!(is_populated(dir.path()));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri does not support spawning processes")]
    async fn test_clone_into_populated_directory_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "hello").unwrap();

        clone_repo(dir.path(), "https://invalid.example/none.git").await.unwrap();
        assert!(dir.path().join("README.md").exists());
    }
}
