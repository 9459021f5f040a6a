//! `rp` end to end: discovery, config, report layout, update narration.

mod common;

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

use common::{commit_file, git, git_output, Workspace};

fn rp(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rp"));
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// Drift report
// ---------------------------------------------------------------------------

#[test]
fn single_repository_up_to_date() {
    let ws = Workspace::new();
    let repo = ws.clone_repo("mvp-service");

    rp(&repo)
        .assert()
        .success()
        .stdout(contains("Checking Repository For Updates. git: (origin/main)"))
        .stdout(contains("mvp-service is up-to-date"))
        .stdout(contains("Outdated Repositories:").not());
}

#[test]
fn directory_of_repositories_is_partitioned() {
    let mut ws = Workspace::new();
    ws.clone_repo("mvp-service");
    ws.push("fix: provide db transaction context");
    ws.clone_repo("mvp-frontend");
    ws.clone_repo("mvp-tools");
    fs::create_dir_all(ws.root.join("notes")).expect("mkdir");

    let out = rp(&ws.root).assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).expect("utf8");

    assert!(text.contains("Checking Repositories For Updates. git: (origin/main)"));
    let outdated = text.find("Outdated Repositories:").expect("outdated section");
    let up_to_date = text.find("Up-to-Date Repositories:").expect("up-to-date section");
    assert!(outdated < up_to_date);
    assert!(text.contains("mvp-service is 1 commit behind\nLast commit by Lois Lane"));
    assert!(text.contains("fix: provide db transaction context"));
    assert!(text.contains("mvp-frontend is up-to-date"));
    assert!(text.contains("mvp-tools is up-to-date"));
    assert!(!text.contains("notes"));
}

#[test]
fn path_argument_overrides_working_directory() {
    let ws = Workspace::new();
    ws.clone_repo("mvp-tools");

    rp(ws.tmp.path())
        .arg(&ws.root)
        .assert()
        .success()
        .stdout(contains("mvp-tools is up-to-date"));
}

#[test]
fn json_output_is_machine_readable() {
    let mut ws = Workspace::new();
    ws.clone_repo("mvp-service");
    ws.push("feat: one");
    ws.push("feat: two");

    let out = rp(&ws.root)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(value["remote"], "origin");
    let entry = &value["outdated"][0];
    assert_eq!(entry["name"], "mvp-service");
    assert_eq!(entry["outcome"]["kind"], "diverged");
    assert_eq!(entry["outcome"]["drift"]["behind"], "2");
    assert_eq!(entry["outcome"]["drift"]["last_commit"]["subject"], "feat: two");
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_narrates_stash_pull_and_reapply() {
    let mut ws = Workspace::new();
    let repo = ws.clone_repo("mvp-service");
    ws.push("feat: one");
    fs::write(repo.join("README.md"), "# service\n\nlocal notes\n").expect("write");

    rp(&ws.root)
        .arg("-u")
        .assert()
        .success()
        .stdout(contains(":.\n Stashing local changes\n Pulling latest changes\n Applying stashed changes\n mvp-service is up-to-date"));

    let readme = fs::read_to_string(repo.join("README.md")).expect("read");
    assert!(readme.contains("local notes"));
    assert_eq!(git(&repo, &["stash", "list"]), "");
}

#[test]
fn conflict_blocks_update_without_force() {
    let mut ws = Workspace::new();
    let repo = ws.clone_repo("mvp-backend-go");
    ws.push("feat: one");
    git(&repo, &["checkout", "--quiet", "-b", "topic"]);
    commit_file(&repo, "notes.txt", "ours\n", "docs: ours");
    git(&repo, &["checkout", "--quiet", "-b", "other", "main"]);
    commit_file(&repo, "notes.txt", "theirs\n", "docs: theirs");
    git(&repo, &["checkout", "--quiet", "topic"]);
    assert!(!git_output(&repo, &["merge", "other"]).status.success());

    rp(&repo)
        .arg("--update")
        .assert()
        .success()
        .stdout(contains(
            "mvp-backend-go has merge conflicts in file(s) or there's a rebase in progress.",
        ))
        .stdout(contains("To update anyway use --update --force."));

    rp(&repo)
        .args(["--update", "--force"])
        .assert()
        .success()
        .stdout(contains(" Forcing update...\n Pulling latest changes"))
        .stdout(contains(" mvp-backend-go is up-to-date"));
    assert_eq!(git(&repo, &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
}

// ---------------------------------------------------------------------------
// Diagnostics and configuration
// ---------------------------------------------------------------------------

#[test]
fn missing_branch_is_reported_verbatim() {
    let ws = Workspace::new();
    ws.clone_repo("mvp-tools");

    rp(&ws.root)
        .args(["-b", "develop"])
        .assert()
        .success()
        .stdout(contains("Checking Repositories For Updates. git: (origin/develop)"))
        .stdout(contains("Branch develop does not exist in repository mvp-tools"));
}

#[test]
fn rprc_exclude_and_remote_are_applied() {
    let ws = Workspace::new();
    ws.clone_repo("api");
    ws.clone_repo("legacy");
    fs::write(ws.root.join(".rprc"), "exclude:\n  - legacy\nremote_name: origin\n")
        .expect("write config");

    rp(&ws.root)
        .assert()
        .success()
        .stdout(contains("api is up-to-date"))
        .stdout(contains("legacy").not());
}

#[test]
fn dot_path_is_filtered_by_repository_name() {
    let ws = Workspace::new();
    let repo = ws.clone_repo("api");
    fs::write(ws.root.join(".rprc"), "include:\n  - api\n").expect("write config");

    rp(&repo)
        .arg(".")
        .assert()
        .success()
        .stdout(contains("Checking Repository For Updates. git: (origin/main)"))
        .stdout(contains("api is up-to-date"));
}

#[test]
fn dot_dot_path_honours_exclude() {
    let ws = Workspace::new();
    let repo = ws.clone_repo("legacy");
    fs::create_dir_all(repo.join("docs")).expect("mkdir");
    fs::write(ws.root.join(".rprc"), "exclude:\n  - legacy\n").expect("write config");

    rp(&repo.join("docs"))
        .arg("..")
        .assert()
        .success()
        .stdout(contains("legacy").not());
}

#[test]
fn flags_override_rprc() {
    let ws = Workspace::new();
    ws.clone_repo("api");
    fs::write(ws.root.join(".rprc"), "branch: develop\n").expect("write config");

    rp(&ws.root)
        .args(["--branch", "main"])
        .assert()
        .success()
        .stdout(contains("git: (origin/main)"))
        .stdout(contains("api is up-to-date"));
}

#[test]
fn unsupported_config_key_exits_with_error() {
    let ws = Workspace::new();
    ws.clone_repo("api");
    fs::write(ws.root.join(".rprc"), "brnach: develop\n").expect("write config");

    rp(&ws.root)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Error loading config"))
        .stderr(contains("unsupported key in config file: brnach"));
}

#[test]
fn missing_path_exits_with_error() {
    let ws = Workspace::new();
    rp(ws.tmp.path())
        .arg(ws.root.join("does-not-exist"))
        .assert()
        .failure()
        .stderr(contains("is not a directory"));
}

// ---------------------------------------------------------------------------
// --log and --help
// ---------------------------------------------------------------------------

#[test]
fn log_streams_missing_upstream_commits() {
    let mut ws = Workspace::new();
    let repo = ws.clone_repo("mvp-service");
    ws.push("feat: streamed subject");
    git(&repo, &["fetch", "--quiet", "origin"]);

    rp(&repo)
        .arg("--log")
        .assert()
        .success()
        .stdout(contains("feat: streamed subject"));
}

#[test]
fn log_outside_repository_fails() {
    let ws = Workspace::new();
    rp(&ws.root)
        .arg("-l")
        .assert()
        .failure()
        .stderr(contains("is not a Git repository"));
}

#[test]
fn help_lists_examples() {
    let ws = Workspace::new();
    rp(ws.tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Examples:"))
        .stdout(contains("--update"))
        .stdout(contains(".rprc"));
}
