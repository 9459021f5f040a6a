//! Git fixtures for exercising the `rp` binary end to end.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub fn git_output(dir: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .expect("spawn git")
}

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

pub fn commit_file(dir: &Path, file: &str, contents: &str, subject: &str) {
    fs::write(dir.join(file), contents).expect("write");
    git(dir, &["add", file]);
    git(dir, &["commit", "--quiet", "-m", subject]);
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Lois Lane"]);
    git(dir, &["config", "user.email", "lois@reporter.invalid"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Bare remote, a publishing clone, and a workspace directory for clones
/// under test.
pub struct Workspace {
    pub tmp: TempDir,
    pub remote: PathBuf,
    pub upstream: PathBuf,
    pub root: PathBuf,
    pushed: usize,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let remote = tmp.path().join("remote.git");
        let upstream = tmp.path().join("upstream");
        let root = tmp.path().join("code");
        fs::create_dir_all(&root).expect("mkdir");

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
            root,
            pushed: 0,
        }
    }

    pub fn clone_repo(&self, name: &str) -> PathBuf {
        git(
            &self.root,
            &["clone", "--quiet", &self.remote.to_string_lossy(), name],
        );
        let dir = self.root.join(name);
        configure_identity(&dir);
        dir
    }

    pub fn push(&mut self, subject: &str) {
        self.pushed += 1;
        let file = format!("change-{}.txt", self.pushed);
        commit_file(&self.upstream, &file, subject, subject);
        git(&self.upstream, &["push", "--quiet", "origin", "main"]);
    }
}
