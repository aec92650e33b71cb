use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Captured result of one git invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The message a user should see when this invocation failed: git
    /// writes diagnostics to stderr, but fall back to stdout if needed.
    pub fn message(&self) -> &str {
        let err = self.stderr.trim();
        if err.is_empty() {
            self.stdout.trim()
        } else {
            err
        }
    }
}

/// Capability to run a git command and capture its output. The session
/// and aggregator only ever see this trait, never `std::process`.
pub trait Gateway {
    fn dir(&self) -> &Path;

    /// Run `git <args>` with an explicit working directory.
    fn run_in(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput>;

    /// Run `git <args>` in the repository directory.
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let dir = self.dir().to_path_buf();
        self.run_in(args, &dir)
    }
}

/// Production gateway: spawns `git` as a child process, no shell in
/// between, so arguments are never re-interpreted.
#[derive(Debug, Clone)]
pub struct GitGateway {
    dir: PathBuf,
}

impl GitGateway {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Verify that `dir` exists and is inside a git repository. This is
    /// the only fatal precondition; everything later degrades instead.
    pub fn open(dir: PathBuf) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir));
        }
        let gateway = Self::new(dir);
        let out = gateway.run(&["rev-parse", "--git-dir"])?;
        if !out.success() {
            return Err(Error::NotARepository(gateway.dir.clone()));
        }
        Ok(gateway)
    }
}

impl Gateway for GitGateway {
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_in(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| Error::Command {
                args: args.join(" "),
                message: e.to_string(),
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
