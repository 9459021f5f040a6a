//! Throwaway git topology: a bare `remote.git`, an `upstream` clone used to
//! publish commits, and any number of working copies under test.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub struct Fixture {
    pub tmp: TempDir,
    pub remote: PathBuf,
    pub upstream: PathBuf,
    pub workspace: PathBuf,
}

pub fn git_output(dir: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("spawn git")
}

/// Run git and require success; returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = git_output(dir, args);
    assert!(
        out.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Reporter Tests"]);
    git(dir, &["config", "user.email", "tests@reporter.invalid"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

pub fn write(dir: &Path, file: &str, contents: &str) {
    fs::write(dir.join(file), contents).expect("write fixture file");
}

pub fn commit_file(dir: &Path, file: &str, contents: &str, subject: &str) {
    write(dir, file, contents);
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", subject]);
}

pub fn head(dir: &Path) -> String {
    git(dir, &["rev-parse", "HEAD"])
}

pub fn stash_count(dir: &Path) -> usize {
    git(dir, &["stash", "list"]).lines().count()
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let remote = tmp.path().join("remote.git");
        let upstream = tmp.path().join("upstream");
        let workspace = tmp.path().join("workspace");
        fs::create_dir_all(&workspace).expect("mkdir workspace");

        git(tmp.path(), &["init", "--quiet", "--bare", "-b", "main", "remote.git"]);
        git(tmp.path(), &["init", "--quiet", "-b", "main", "upstream"]);
        configure_identity(&upstream);
        commit_file(&upstream, "README.md", "# service\n", "chore: initial commit");
        git(&upstream, &["remote", "add", "origin", &remote.to_string_lossy()]);
        git(&upstream, &["push", "--quiet", "origin", "main"]);

        Self {
            tmp,
            remote,
            upstream,
            workspace,
        }
    }

    /// Clone the remote into `workspace/<name>`.
    pub fn clone_repo(&self, name: &str) -> PathBuf {
        let remote = self.remote.to_string_lossy().into_owned();
        git(&self.workspace, &["clone", "--quiet", &remote, name]);
        let dir = self.workspace.join(name);
        configure_identity(&dir);
        dir
    }

    /// Publish commits from the upstream clone. Returns the subject of the
    /// newest one.
    pub fn push_upstream(&self, subjects: &[&str]) -> String {
        for subject in subjects {
            let file = format!("change-{}.txt", self.upstream_commits());
            commit_file(&self.upstream, &file, subject, subject);
        }
        git(&self.upstream, &["push", "--quiet", "origin", "main"]);
        subjects.last().map(|s| s.to_string()).unwrap_or_default()
    }

    /// Publish a commit that rewrites `file` upstream.
    pub fn push_upstream_edit(&self, file: &str, contents: &str, subject: &str) {
        commit_file(&self.upstream, file, contents, subject);
        git(&self.upstream, &["push", "--quiet", "origin", "main"]);
    }

    fn upstream_commits(&self) -> usize {
        git(&self.upstream, &["rev-list", "--count", "HEAD"])
            .parse()
            .expect("count")
    }
}
