use std::path::Path;

use predicates::prelude::*;

fn emailforge(state_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("emailforge");
    cmd.env_remove("GEMINI_API_KEY")
        .env_remove("EMAILFORGE_HOME")
        .arg("--state-dir")
        .arg(state_dir);
    cmd
}

#[test]
fn set_show_and_reset_overrides() {
    let state = tempfile::tempdir().expect("tempdir");

    emailforge(state.path())
        .args(["styles", "show"])
        .assert()
        .success()
        .stdout("{}\n");

    emailforge(state.path())
        .args(["styles", "set", "--target", "Footer", "--font-size", "11px"])
        .assert()
        .success();
    emailforge(state.path())
        .args(["styles", "set", "--target", "global", "--color", "#222222"])
        .assert()
        .success();

    emailforge(state.path())
        .args(["styles", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Footer:"))
        .stdout(predicate::str::contains("fontSize: 11px"))
        .stdout(predicate::str::contains("Global Styles:"));

    // An empty value clears the property; an emptied target disappears.
    emailforge(state.path())
        .args(["styles", "set", "--target", "Footer", "--font-size", ""])
        .assert()
        .success();
    emailforge(state.path())
        .args(["styles", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Footer:").not())
        .stdout(predicate::str::contains("Global Styles:"));

    emailforge(state.path())
        .args(["styles", "reset"])
        .assert()
        .success();
    emailforge(state.path())
        .args(["styles", "show"])
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn unknown_target_is_rejected() {
    let state = tempfile::tempdir().expect("tempdir");
    emailforge(state.path())
        .args(["styles", "set", "--target", "Sidebar", "--color", "red"])
        .assert()
        .failure();
}

#[test]
fn set_without_properties_fails() {
    let state = tempfile::tempdir().expect("tempdir");
    emailforge(state.path())
        .args(["styles", "set", "--target", "Footer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn config_show_reports_defaults() {
    let state = tempfile::tempdir().expect("tempdir");
    emailforge(state.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("language: ar"))
        .stdout(predicate::str::contains("api_key: missing"))
        .stdout(predicate::str::contains("html_styles: default"));
}

#[test]
fn rust_log_debug_emits_parsed_cli_to_stderr() {
    let state = tempfile::tempdir().expect("tempdir");
    emailforge(state.path())
        .env("RUST_LOG", "debug")
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn corrupt_language_setting_does_not_block_commands() {
    let state = tempfile::tempdir().expect("tempdir");
    std::fs::write(state.path().join("language.json"), r#"{"language":"fr"}"#)
        .expect("write language slot");

    emailforge(state.path())
        .args(["styles", "show"])
        .assert()
        .success()
        .stdout("{}\n");

    emailforge(state.path())
        .args(["config", "set-language", "en"])
        .assert()
        .success();

    emailforge(state.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("language: en"));
}
