use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn cliroute() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cliroute"))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

const MANIFEST: &str = r#"{
  "schema-version": 1,
  "tree": {
    "root": "app",
    "containers": [
      { "id": "global", "options": [{ "name": "verbose", "alias": "v", "type": "boolean" }] },
      { "id": "create", "options": [
        { "name": "name", "type": "string", "required": true },
        { "name": "force", "alias": "f" }
      ] }
    ],
    "commands": [
      { "id": "create", "options": ["create"] },
      { "id": "run", "parameters": [{ "index": 1, "name": "script", "optional": true }] }
    ],
    "groups": [
      { "id": "db", "routes": [{ "path": "create", "alias": "mk", "target": "create" }] },
      { "id": "app", "options": ["global"], "routes": [
        { "path": "db", "target": "db" },
        { "path": "*", "target": "run" }
      ] }
    ]
  }
}"#;

fn write_manifest(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("cliroute.json");
    fs::write(&path, contents).expect("failed to write manifest");
    path
}

fn resolve(manifest: &Path, flags: &[&str], argv: &[&str]) -> Output {
    cliroute()
        .arg("resolve")
        .arg("--manifest")
        .arg(manifest)
        .args(flags)
        .arg("--")
        .args(argv)
        .output()
        .expect("failed to run cliroute resolve")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout is not JSON")
}

#[test]
fn help_works() {
    let out = cliroute()
        .arg("--help")
        .output()
        .expect("failed to run cliroute --help");
    assert_success(&out, "cliroute --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("cliroute") && stdout.contains("resolve") && stdout.contains("check"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn init_writes_a_manifest_that_checks() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let out = cliroute()
        .arg("init")
        .arg(dir.path())
        .output()
        .expect("failed to run cliroute init");
    assert_success(&out, "cliroute init");
    assert!(dir.path().join("cliroute.json").is_file());

    let again = cliroute()
        .arg("init")
        .arg(dir.path())
        .output()
        .expect("failed to run cliroute init");
    assert!(!again.status.success(), "second init should refuse to overwrite");

    let out = cliroute()
        .current_dir(dir.path())
        .args(["check", "--json"])
        .output()
        .expect("failed to run cliroute check");
    assert_success(&out, "cliroute check");
    let report = stdout_json(&out);
    assert_eq!(report["root"], "app");
    assert_eq!(report["commands"][0]["path"], serde_json::json!(["greet"]));
}

#[test]
fn resolve_prints_bound_values() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let manifest = write_manifest(dir.path(), MANIFEST);

    let out = resolve(&manifest, &[], &["db", "mk", "--name", "x", "-f", "-v"]);
    assert_success(&out, "cliroute resolve");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "command": "create",
            "path": ["db", "create"],
            "options": { "name": "x", "force": true, "verbose": true },
            "parameters": {}
        })
    );
}

#[test]
fn resolve_falls_back_to_star_route() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let manifest = write_manifest(dir.path(), MANIFEST);

    let out = resolve(&manifest, &[], &["deploy.sh"]);
    assert_success(&out, "cliroute resolve");
    let json = stdout_json(&out);
    assert_eq!(json["command"], "run");
    assert_eq!(json["parameters"]["script"], "deploy.sh");
}

#[test]
fn parse_errors_exit_with_status_two() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let manifest = write_manifest(dir.path(), MANIFEST);

    let out = resolve(&manifest, &[], &["db", "create"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("error: missing required option '--name'"),
        "unexpected stderr:\n{stderr}"
    );

    let out = resolve(&manifest, &[], &["db", "create", "--name", "x", "--bogus"]);
    assert_eq!(out.status.code(), Some(2));

    let out = resolve(
        &manifest,
        &["--ignore-unknown-options"],
        &["db", "create", "--name", "x", "--bogus"],
    );
    assert_success(&out, "cliroute resolve --ignore-unknown-options");
}

#[test]
fn invalid_tree_is_reported() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let manifest = write_manifest(
        dir.path(),
        r#"{ "tree": { "root": "app", "groups": [
            { "id": "app", "routes": [{ "path": "sub", "target": "sub" }] },
            { "id": "sub", "routes": [{ "path": "app", "target": "app" }] }
        ] } }"#,
    );

    let out = cliroute()
        .arg("check")
        .arg("--manifest")
        .arg(&manifest)
        .output()
        .expect("failed to run cliroute check");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid command tree"), "unexpected stderr:\n{stderr}");
}
