use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory for one CLI invocation set.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write a file relative to the workspace root and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// Command running the binary inside `workspace` with no ambient Jira settings.
pub fn cli_command<I, S>(workspace: &Workspace, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("jira-bulk-edit"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    for var in ["JIRA_URL", "JIRA_EMAIL", "JIRA_API_TOKEN"] {
        cmd.env_remove(var);
    }
    for (key, _) in std::env::vars() {
        if key.starts_with("JIRA_BULK_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "jira_bulk_edit=debug");
    cmd
}

pub fn fixture_json(path: &Path, issues: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(issues).expect("fixture json"))
        .expect("write fixture");
}
