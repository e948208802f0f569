use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Output;
use tempfile::TempDir;

#[derive(Debug)]
pub struct PnRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

/// A temporary git repository to run `pn` against.
pub struct PnWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl PnWorkspace {
    /// Create a repository with one initial commit, ready for notes.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let ws = Self { temp_dir, root };
        ws.git(["init", "--quiet"]);
        ws.git(["config", "user.name", "Perf Notes Tests"]);
        ws.git(["config", "user.email", "perf-notes@example.invalid"]);
        ws.git(["config", "commit.gpgsign", "false"]);
        ws.commit("initial commit");
        ws
    }

    /// Run a git command in the workspace, asserting success.
    ///
    /// HOME is pointed into the workspace so the host's global git
    /// configuration cannot leak into the fixture.
    pub fn git<I, S>(&self, args: I) -> Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = std::process::Command::new("git")
            .current_dir(&self.root)
            .env("HOME", &self.root)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .args(args)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        output
    }

    /// Create an empty commit and return its hash.
    pub fn commit(&self, message: &str) -> String {
        self.git([
            "commit",
            "--quiet",
            "--allow-empty",
            "-m",
            message,
        ]);
        self.rev_parse("HEAD")
    }

    /// Resolve a ref to a full hash.
    pub fn rev_parse(&self, reference: &str) -> String {
        let output = self.git(["rev-parse", reference]);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Append tab-separated record lines to the perf note of `commit`.
    pub fn add_perf_note(&self, commit: &str, lines: &[&str]) {
        let message = lines.join("\n");
        self.git([
            "notes",
            "--ref=perf",
            "append",
            commit,
            "-m",
            message.as_str(),
        ]);
    }
}

/// Run the `pn` binary in the workspace and capture the result.
pub fn run_pn<I, S>(workspace: &PnWorkspace, args: I) -> PnRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pn"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "perf_notes=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");

    let output = cmd.output().expect("run pn");
    PnRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
