use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("lectioctl");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chapter"))
        .stdout(predicate::str::contains("backfill"));
}

#[test]
fn chapter_subcommands_present() {
    let mut cmd = cargo_bin_cmd!("lectioctl");
    let out = cmd
        .arg("chapter")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    for sub in ["show", "complete", "replay"] {
        assert!(text.contains(sub), "chapter help missing {sub}");
    }
}

#[test]
fn backfill_plan_documents_inputs() {
    let mut cmd = cargo_bin_cmd!("lectioctl");
    cmd.args(["backfill", "plan", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--seed"));
}

#[test]
fn replay_prints_decisions_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("lectioctl");
    cmd.current_dir(dir.path())
        .env_remove("LECTIO_CONFIG_PATH")
        .args([
            "chapter",
            "replay",
            "--duration",
            "600",
            "--samples",
            "60,300,509,510",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"unlocked\""))
        .stdout(predicate::str::contains("\"threshold\""));
}

#[test]
fn chapter_show_requires_ids() {
    let mut cmd = cargo_bin_cmd!("lectioctl");
    cmd.args(["chapter", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--course"));
}
