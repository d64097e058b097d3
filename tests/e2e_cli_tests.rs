//! End-to-end tests for the `provisioner` binary's exit status
//!
//! A failed request must surface as a non-zero exit in every mode.

mod common;

use common::{CURATED_QUERY, MADE_FOR_YOU_ARTIFACT, RECENTLY_PLAYED_QUERY};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

struct Workspace {
    db_path: PathBuf,
    artifacts_dir: PathBuf,
    _temp_dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            db_path: temp_dir.path().join("provisioner.db"),
            artifacts_dir: temp_dir.path().join("generated"),
            _temp_dir: temp_dir,
        }
    }

    /// A plain file where the `api/` directory should be, so every
    /// artifact write fails after provisioning succeeded.
    fn blocked() -> Self {
        let workspace = Self::new();
        std::fs::create_dir_all(&workspace.artifacts_dir).expect("Failed to create artifacts dir");
        std::fs::write(workspace.artifacts_dir.join("api"), "").expect("Failed to block api dir");
        workspace
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_provisioner"));
        command
            .arg("--db-path")
            .arg(&self.db_path)
            .arg("--artifacts-dir")
            .arg(&self.artifacts_dir)
            .args(args)
            .env("LOG_LEVEL", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    async fn status(&self, args: &[&str]) -> ExitStatus {
        self.command(args)
            .status()
            .await
            .expect("Failed to run provisioner")
    }

    /// Run the interactive prompt, feeding `input` on stdin.
    async fn prompt(&self, input: &str) -> ExitStatus {
        let mut child = self
            .command(&["prompt"])
            .stdin(Stdio::piped())
            .spawn()
            .expect("Failed to spawn provisioner");
        let mut stdin = child.stdin.take().expect("stdin is piped");
        // An early exit closes the pipe; the exit status is what matters.
        let _ = stdin.write_all(input.as_bytes()).await;
        drop(stdin);
        child.wait().await.expect("Failed to wait for provisioner")
    }

    fn artifact(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.artifacts_dir.join(relative)
    }

    fn row_count(&self, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(&self.db_path).expect("Failed to open db");
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("Failed to count rows")
    }
}

#[tokio::test]
async fn test_run_exits_zero_on_success() {
    let workspace = Workspace::new();

    let status = workspace.status(&["run", CURATED_QUERY]).await;

    assert!(status.success());
    assert!(workspace.artifact(MADE_FOR_YOU_ARTIFACT).is_file());
}

#[tokio::test]
async fn test_run_exits_non_zero_when_artifact_write_fails() {
    let workspace = Workspace::blocked();

    let status = workspace.status(&["run", CURATED_QUERY]).await;

    assert!(!status.success());
    // Provisioning finished before the write failed.
    assert!(workspace.row_count("made_for_you") > 0);
}

#[tokio::test]
async fn test_self_test_exit_status() {
    let workspace = Workspace::new();
    assert!(workspace.status(&["self-test"]).await.success());

    let blocked = Workspace::blocked();
    assert!(!blocked.status(&["self-test"]).await.success());
}

#[tokio::test]
async fn test_prompt_exits_zero_after_successful_requests() {
    let workspace = Workspace::new();

    let status = workspace
        .prompt(&format!("{}\n{}\nexit\n", RECENTLY_PLAYED_QUERY, CURATED_QUERY))
        .await;

    assert!(status.success());
    assert!(workspace.artifact(MADE_FOR_YOU_ARTIFACT).is_file());
}

#[tokio::test]
async fn test_prompt_exits_non_zero_after_a_failed_request() {
    let workspace = Workspace::blocked();

    // The session keeps reading after the failure and ends at EOF.
    let status = workspace
        .prompt(&format!("{}\n{}\n", CURATED_QUERY, RECENTLY_PLAYED_QUERY))
        .await;

    assert!(!status.success());
    assert!(workspace.row_count("made_for_you") > 0);
    assert!(workspace.row_count("recently_played") > 0);
}
