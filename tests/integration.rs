//! Integration tests for the `vaultic` binary.
//!
//! These tests exercise the CLI layer end-to-end: they spawn the actual
//! compiled binary and assert on exit codes, stdout, and stderr.  Nothing
//! here touches the real search roots: actions and rules are passed as
//! explicit paths into temporary directories, or resolved under an
//! overridden per-user root, so the tests stay hermetic on any machine.
//!
//! # Running
//!
//! ```sh
//! cargo test --test integration
//! ```

use std::{fs, process::Command};

/// Absolute path to the compiled `vaultic` binary, resolved at compile time
/// by Cargo.  This works correctly for both `cargo test` and `cargo test
/// --release` without any hardcoding.
const BIN: &str = env!("CARGO_BIN_EXE_vaultic");

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Run `vaultic` with `args` in a fresh temporary directory.
///
/// Returns `(exit_success, stdout, stderr)`.
fn run(args: &[&str]) -> (bool, String, String) {
    run_in(args, &std::env::temp_dir())
}

/// Run `vaultic` with `args` in the given working directory.
fn run_in(args: &[&str], dir: &std::path::Path) -> (bool, String, String) {
    let out = Command::new(BIN)
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));

    (
        out.status.success(),
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
    )
}

/// A touch-style action used by the `do` tests: creates the file named by
/// its `target` property so the test can observe that the script ran.
const TOUCH_ACTION: &str = r#"
const ACTION_TOUCH = #{
    doc: "create the target file",
    properties: [
        #{ name: "target", doc: "file to create" },
    ],
};

fn run(props) {
    let result = sh(`touch ${props.target}`);
    if !result.ok {
        throw result.stderr;
    }
    print(`touched ${props.target}`);
}
"#;

/// Write the touch action plus a rule pointing `target` at `marker`,
/// returning `(action_path, rule_path)` as strings ready for argv.
fn touch_fixture(dir: &std::path::Path, marker: &std::path::Path) -> (String, String) {
    let action = dir.join("touch.rhai");
    fs::write(&action, TOUCH_ACTION).unwrap();

    let rule = dir.join("nightly.toml");
    fs::write(
        &rule,
        format!("[touch]\ntarget = \"{}\"\n", marker.display()),
    )
    .unwrap();

    (action.display().to_string(), rule.display().to_string())
}

// ─── --help / --version ───────────────────────────────────────────────────────

#[test]
fn help_exits_zero() {
    let (ok, stdout, _) = run(&["--help"]);
    assert!(ok, "vaultic --help should exit 0");
    assert!(
        stdout.contains("vaultic"),
        "help text should mention the binary name"
    );
}

#[test]
fn version_exits_zero() {
    let (ok, stdout, _) = run(&["--version"]);
    assert!(ok, "--version should exit 0");
    assert!(
        stdout.contains("0.1.0"),
        "--version should print the version"
    );
}

#[test]
fn do_help_exits_zero() {
    let (ok, stdout, _) = run(&["do", "--help"]);
    assert!(ok);
    assert!(stdout.to_lowercase().contains("rule"));
}

#[test]
fn bare_invocation_prints_help_and_exits_nonzero() {
    let (ok, stdout, stderr) = run(&[]);
    assert!(!ok, "running with no arguments should exit non-zero");
    let combined = format!("{stdout}{stderr}");
    assert!(
        combined.contains("Usage"),
        "bare invocation should print usage; got: {combined}"
    );
}

#[test]
fn unknown_flag_exits_nonzero() {
    let (ok, _, _) = run(&["--this-flag-does-not-exist"]);
    assert!(!ok, "unknown flag should exit non-zero");
}

// ─── listing flags ────────────────────────────────────────────────────────────

#[test]
fn list_actions_shows_the_system_root() {
    let (ok, stdout, _) = run(&["--list-actions"]);
    assert!(ok, "--list-actions should exit 0");
    assert!(stdout.contains("/usr/local/etc/vaultic"));
}

#[test]
fn list_rules_shows_the_system_root() {
    let (ok, stdout, _) = run(&["--list-rules"]);
    assert!(ok);
    assert!(stdout.contains("/usr/local/etc/vaultic"));
}

#[test]
fn paths_flag_shows_roots_and_data_path() {
    let (ok, stdout, _) = run(&["--paths"]);
    assert!(ok);
    assert!(stdout.contains("/usr/local/etc/vaultic"));
    assert!(stdout.contains("new files land in"));
}

// ─── create-action / create-rule ──────────────────────────────────────────────

#[test]
fn create_action_writes_a_runnable_skeleton() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("copy.rhai");

    let (ok, stdout, _) = run(&["create-action", "copy", "--path", target.to_str().unwrap()]);
    assert!(ok, "create-action should exit 0");
    assert!(stdout.contains("created"));

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("const ACTION_COPY"));
    assert!(content.contains("fn run(props)"));

    // The skeleton must run as generated, with no rule values at all.
    let rule = dir.path().join("empty.toml");
    fs::write(&rule, "").unwrap();
    let (ok, _, stderr) = run(&["do", target.to_str().unwrap(), rule.to_str().unwrap()]);
    assert!(ok, "generated skeleton should run unmodified; stderr:\n{stderr}");
}

#[test]
fn create_action_strips_a_trailing_extension() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("copy.rhai");

    let (ok, _, _) = run(&[
        "create-action",
        "copy.rhai",
        "--path",
        target.to_str().unwrap(),
    ]);
    assert!(ok);

    let content = fs::read_to_string(&target).unwrap();
    assert!(
        content.contains("const ACTION_COPY ="),
        "the constant should use the stem, not the file name"
    );
}

#[test]
fn create_action_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("copy.rhai");
    fs::write(&target, "// existing").unwrap();

    let (ok, _, stderr) = run(&["create-action", "copy", "--path", target.to_str().unwrap()]);
    assert!(!ok, "create-action should fail when the file exists");

    // The original content must be untouched.
    assert_eq!(fs::read_to_string(&target).unwrap(), "// existing");
    assert!(
        stderr.contains("refusing to overwrite"),
        "error message should explain why create failed; got: {stderr}"
    );
}

#[test]
fn create_rule_writes_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nightly.toml");

    let (ok, _, _) = run(&["create-rule", "nightly", "--path", target.to_str().unwrap()]);
    assert!(ok, "create-rule should exit 0");

    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("[action]"));
    toml::from_str::<toml::Table>(&content).expect("generated rule must be valid TOML");
}

#[test]
fn create_rule_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nightly.toml");
    fs::write(&target, "# existing").unwrap();

    let (ok, _, stderr) = run(&["create-rule", "nightly", "--path", target.to_str().unwrap()]);
    assert!(!ok);
    assert_eq!(fs::read_to_string(&target).unwrap(), "# existing");
    assert!(stderr.contains("refusing to overwrite"));
}

// ─── vaultic do ───────────────────────────────────────────────────────────────

#[test]
fn do_runs_an_action_against_a_rule() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran.marker");
    let (action, rule) = touch_fixture(dir.path(), &marker);

    let (ok, stdout, stderr) = run(&["do", &action, &rule]);
    assert!(ok, "do should exit 0; stderr:\n{stderr}");
    assert!(marker.exists(), "the script should have created the marker");
    assert!(stdout.contains("nightly"), "outcome line should show the rule label");
    assert!(stdout.contains("All rules completed successfully."));
}

#[test]
fn do_with_a_missing_rule_still_runs_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran.marker");
    let (action, rule) = touch_fixture(dir.path(), &marker);
    let missing = dir.path().join("absent.toml").display().to_string();

    let (ok, _, stderr) = run(&["do", &action, &missing, &rule]);
    assert!(!ok, "a missing rule should make the whole run fail");
    assert!(
        marker.exists(),
        "the remaining rule should still have run"
    );
    assert!(stderr.contains("rule file not found"));
}

#[test]
fn do_with_an_unknown_action_name_exits_nonzero() {
    let (ok, _, stderr) = run(&["do", "no-such-action-zz", "whatever"]);
    assert!(!ok);
    assert!(
        stderr.contains("no action named"),
        "error should mention the failed lookup; got: {stderr}"
    );
}

#[test]
fn do_with_a_missing_action_path_exits_nonzero() {
    let (ok, _, stderr) = run(&["do", "/nonexistent/copy.rhai", "whatever"]);
    assert!(!ok);
    assert!(stderr.contains("action script not found"));
}

#[test]
fn do_rejects_a_script_without_a_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("plain.rhai");
    fs::write(&script, "fn run() { }").unwrap();
    let rule = dir.path().join("nightly.toml");
    fs::write(&rule, "").unwrap();

    let (ok, _, stderr) = run(&[
        "do",
        script.to_str().unwrap(),
        rule.to_str().unwrap(),
    ]);
    assert!(!ok);
    assert!(stderr.contains("no action descriptor found"));
}

#[test]
fn do_reports_a_missing_required_property() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("ran.marker");
    let (action, _) = touch_fixture(dir.path(), &marker);
    let empty_rule = dir.path().join("empty.toml");
    fs::write(&empty_rule, "").unwrap();

    let (ok, _, stderr) = run(&["do", &action, empty_rule.to_str().unwrap()]);
    assert!(!ok);
    assert!(
        stderr.contains("missing value for required property 'target'"),
        "error should name the unsatisfied property; got: {stderr}"
    );
    assert!(!marker.exists(), "the script must not have run");
}

// ─── vaultic show ─────────────────────────────────────────────────────────────

#[test]
fn show_prints_the_property_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("unused.marker");
    let (action, _) = touch_fixture(dir.path(), &marker);

    let (ok, stdout, _) = run(&["show", &action]);
    assert!(ok, "show should exit 0");
    assert!(stdout.contains("touch"), "shows the logical name (file stem)");
    assert!(stdout.contains("create the target file"));
    assert!(stdout.contains("target"));
    assert!(stdout.contains("file to create"));
}

#[test]
fn show_marks_optional_properties() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("greet.rhai");
    fs::write(
        &script,
        r#"
const ACTION_GREET = #{
    properties: [
        #{ name: "message", "default": "hi", optional: true },
    ],
};
fn run() { }
"#,
    )
    .unwrap();

    let (ok, stdout, _) = run(&["show", script.to_str().unwrap()]);
    assert!(ok);
    assert!(stdout.contains("STRING"));
    assert!(stdout.contains("[optional]"));
}

// ─── vaultic locate ───────────────────────────────────────────────────────────

#[test]
fn locate_unknown_action_exits_nonzero() {
    let (ok, _, stderr) = run(&["locate", "no-such-action-zz"]);
    assert!(!ok, "locate should fail for an unknown name");
    assert!(
        stderr.contains("no action named"),
        "error should mention the failed lookup; got: {stderr}"
    );
}

#[test]
fn locate_rule_flag_switches_the_search() {
    let (ok, _, stderr) = run(&["locate", "no-such-rule-zz", "--rule"]);
    assert!(!ok);
    assert!(stderr.contains("no rule named"));
}

/// The `XDG_CONFIG_HOME` override only steers the per-user root on Linux,
/// which keeps this test off the real search roots.
#[cfg(target_os = "linux")]
#[test]
fn locate_prints_the_resolved_path() {
    let config = tempfile::tempdir().unwrap();
    let rules = config.path().join("vaultic").join("rules");
    fs::create_dir_all(&rules).unwrap();
    fs::write(rules.join("offsite.toml"), "").unwrap();

    let out = Command::new(BIN)
        .args(["locate", "offsite", "--rule"])
        .env("XDG_CONFIG_HOME", config.path())
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));

    assert!(out.status.success(), "locate should exit 0 for a present rule");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("offsite.toml"),
        "locate should print the resolved path; got: {stdout}"
    );
}
