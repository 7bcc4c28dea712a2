// Integration tests for the cargo-qf binary.
mod common;

use common::test_prelude::*;
use common::test_utils::TestProject;

#[test]
fn test_empty_buffer_reports_missing_manifest() {
    let mut cmd = Command::cargo_bin("cargo-qf").unwrap();
    cmd.arg("build")
        .assert()
        .success()
        .stdout(contains("Can't find Cargo.toml, is this a cargo project?"));
}

#[test]
fn test_no_arguments_is_an_envelope() {
    let output = Command::cargo_bin("cargo-qf").unwrap().output().unwrap();
    assert!(output.status.success());
    let env = envelope(&output.stdout);
    assert!(env["message"].as_str().unwrap().contains("<COMMAND>"));
    assert_eq!(env["quickfix"], json!([]));
}

#[test]
fn test_invalid_tool_is_an_envelope() {
    Command::cargo_bin("cargo-qf")
        .unwrap()
        .args(["--tool", "make", "build"])
        .assert()
        .success()
        .stdout(contains("invalid value 'make'").and(contains(r#""quickfix":[]"#)));
}

#[test]
fn test_missing_manifest_is_an_envelope() -> std::io::Result<()> {
    let project = TestProject::bare("no_manifest")?;
    let output = Command::cargo_bin("cargo-qf")
        .unwrap()
        .arg("build")
        .arg(project.main_rs())
        .arg(project.path())
        .output()?;
    assert!(output.status.success());
    let env = envelope(&output.stdout);
    assert_eq!(env["quickfix"], Value::Array(vec![]));
    // The temp dir may live under a directory with its own Cargo.toml.
    assert!(env["message"].is_string());
    Ok(())
}

#[test]
fn test_unknown_command() -> std::io::Result<()> {
    let project = TestProject::cargo("unknown_cmd")?;
    Command::cargo_bin("cargo-qf")
        .unwrap()
        .arg("bench")
        .arg(project.main_rs())
        .arg(project.path())
        .assert()
        .success()
        .stdout(contains("No such command: `bench`"));
    Ok(())
}

#[test]
fn test_bazel_without_workspace() {
    Command::cargo_bin("cargo-qf")
        .unwrap()
        .args(["--tool", "bazel", "build"])
        .assert()
        .success()
        .stdout(contains("Can't find WORKSPACE, is this a bazel project?"));
}

#[cfg(unix)]
#[test]
fn test_fake_cargo_build_errors() -> std::io::Result<()> {
    let project = TestProject::cargo("fake_build")?;
    let stream = concat!(
        r#"{"reason":"compiler-message","message":{"level":"error","message":"mismatched types","spans":[{"file_name":"src/main.rs","line_start":1,"column_start":13,"label":"expected `u32`, found `&str`"}]}}"#,
        "\n",
        r#"{"reason":"build-finished","success":false}"#,
        "\n"
    );
    let cargo = project.fake_tool("cargo", stream, "   Compiling fake_build\n", 101)?;

    let output = Command::cargo_bin("cargo-qf")
        .unwrap()
        .arg("--cargo")
        .arg(&cargo)
        .arg("build")
        .arg(project.main_rs())
        .arg(project.path().join("src"))
        .output()?;
    assert!(output.status.success());
    let env = envelope(&output.stdout);
    assert_eq!(env["message"], "`cargo build` failed with 1 error, check quickfix");
    assert_eq!(
        env["quickfix"],
        json!([{
            "filename": "main.rs",
            "lnum": 1,
            "text": "expected `u32`, found `&str`",
            "type": "E",
        }])
    );
    assert_eq!(project.fake_tool_args("cargo")?, "build --message-format=json");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_fake_cargo_test_failures() -> std::io::Result<()> {
    let project = TestProject::cargo("fake_test")?;
    let stream = "\
{\"reason\":\"compiler-artifact\",\"fresh\":false}

running 1 test
test tests::it_works ... FAILED

failures:

---- tests::it_works stdout ----
thread 'tests::it_works' panicked at src/main.rs:8:9:
assertion `left == right` failed
  left: 4
 right: 5
note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace

failures:
    tests::it_works

test result: FAILED. 0 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out
";
    let cargo = project.fake_tool("cargo", stream, "", 101)?;

    let output = Command::cargo_bin("cargo-qf")
        .unwrap()
        .env("CARGO", &cargo)
        .arg("test")
        .arg(project.main_rs())
        .arg(project.path())
        .output()?;
    let env = envelope(&output.stdout);
    assert_eq!(env["message"], "`cargo test` failed with 1 error, check quickfix");
    assert_eq!(env["quickfix"][0]["filename"], "src/main.rs");
    assert_eq!(env["quickfix"][0]["lnum"], 8);
    assert_eq!(
        env["quickfix"][0]["text"],
        "tests::it_works assertion `left == right` failed left: 4 right: 5"
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_fake_bazel_reads_stderr() -> std::io::Result<()> {
    let project = TestProject::bazel("fake_bazel")?;
    let stderr = "\
INFO: Analyzed target //:app (0 packages loaded, 0 targets configured).
warning: unused variable: `y`
 --> src/main.rs:2:9
  |
2 |     let y = 1;
  |         ^ help: if this is intentional, prefix it with an underscore: `_y`
  |
warning: 1 warning emitted
INFO: Build completed successfully, 2 total actions
";
    let bazel = project.fake_tool("bazel", "", stderr, 0)?;

    Command::cargo_bin("cargo-qf")
        .unwrap()
        .args(["--tool", "bazel", "--target", "//:app", "--bazel"])
        .arg(&bazel)
        .arg("build")
        .arg(project.main_rs())
        .arg(project.path())
        .assert()
        .success()
        .stdout(
            contains("`bazel build` succeeded with warnings, check quickfix")
                .and(contains(r#""filename":"src/main.rs","lnum":2"#))
                .and(contains(r#""type":"W""#)),
        );
    assert_eq!(project.fake_tool_args("bazel")?, "build //:app");
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_missing_tool_is_reported() -> std::io::Result<()> {
    let project = TestProject::cargo("missing_tool")?;
    Command::cargo_bin("cargo-qf")
        .unwrap()
        .args(["--cargo", "cargo-qf-no-such-program", "build"])
        .arg(project.main_rs())
        .arg(project.path())
        .assert()
        .success()
        .stdout(contains("Failed to run `cargo-qf-no-such-program`"));
    Ok(())
}
