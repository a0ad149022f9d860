use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("ngcli-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn ngcli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ngcli"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

const GENERATE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "schematic": {
      "type": "string",
      "description": "The schematic to run.",
      "$default": { "$source": "argv", "index": 0 }
    },
    "dryRun": {
      "type": "boolean",
      "aliases": ["d"],
      "description": "Run through without making changes."
    },
    "count": { "type": "number" },
    "internal": { "type": "boolean", "hidden": true }
  },
  "required": ["schematic"]
}"#;

fn write_project(dir: &Path) {
    fs::create_dir_all(dir.join("schemas")).expect("failed to create schemas dir");
    fs::write(dir.join("schemas/generate.json"), GENERATE_SCHEMA)
        .expect("failed to write schema");
    fs::write(
        dir.join("ngcli.json"),
        r#"{
  "schemaVersion": 1,
  "commands": [
    { "name": "generate", "aliases": ["g"], "description": "Generates files.", "schema": "schemas/generate.json" },
    { "name": "exec", "description": "Runs an arbitrary builder." },
    { "name": "secret", "hidden": true }
  ]
}"#,
    )
    .expect("failed to write manifest");
}

#[test]
fn help_works() {
    let out = ngcli()
        .arg("--help")
        .output()
        .expect("failed to run ngcli --help");
    assert_success(&out, "ngcli --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("ngcli") && stdout.contains("run") && stdout.contains("parse"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn init_creates_manifest() {
    let dir = make_temp_dir("init");

    let out = ngcli()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run ngcli init");
    assert_success(&out, "ngcli init");
    assert!(dir.join("ngcli.json").is_file(), "ngcli.json not created");

    let again = ngcli()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run ngcli init");
    assert!(!again.status.success(), "second init should refuse to overwrite");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_prints_reconciled_arguments() {
    let dir = make_temp_dir("parse");
    let schema = dir.join("schema.json");
    fs::write(&schema, GENERATE_SCHEMA).expect("failed to write schema");

    let out = ngcli()
        .arg("parse")
        .arg("--schema")
        .arg(&schema)
        .args(["--", "component", "-d", "--count=3", "--extra", "x"])
        .output()
        .expect("failed to run ngcli parse");
    assert_success(&out, "ngcli parse");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "schematic": "component",
            "dryRun": true,
            "count": 3,
            "--": ["--extra", "x"]
        })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_without_schema_is_free_form() {
    let out = ngcli()
        .args(["parse", "--", "--flag", "--name=value", "-ab", "pos"])
        .output()
        .expect("failed to run ngcli parse");
    assert_success(&out, "ngcli parse");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({
            "flag": true,
            "name": "value",
            "a": true,
            "b": true,
            "--": ["pos"]
        })
    );
}

#[test]
fn coercion_failure_exits_non_zero() {
    let dir = make_temp_dir("coerce-fail");
    let schema = dir.join("schema.json");
    fs::write(&schema, GENERATE_SCHEMA).expect("failed to write schema");

    let out = ngcli()
        .arg("parse")
        .arg("--schema")
        .arg(&schema)
        .args(["--", "--count=abc"])
        .output()
        .expect("failed to run ngcli parse");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Argument --count could not be parsed using value \"abc\"."),
        "unexpected stderr:\n{stderr}"
    );
    assert!(out.stdout.is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn run_resolves_command_alias() {
    let dir = make_temp_dir("run-alias");
    write_project(&dir);

    let out = ngcli()
        .current_dir(&dir)
        .args(["run", "g", "service", "--dry-run"])
        .output()
        .expect("failed to run ngcli run");
    assert_success(&out, "ngcli run g");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({ "schematic": "service", "dryRun": true })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn run_without_schema_parses_free_form() {
    let dir = make_temp_dir("run-free-form");
    write_project(&dir);

    let out = ngcli()
        .arg("--manifest")
        .arg(dir.join("ngcli.json"))
        .args(["run", "exec", "--watch", "--port", "4200"])
        .output()
        .expect("failed to run ngcli run");
    assert_success(&out, "ngcli run exec");
    assert_eq!(
        stdout_json(&out),
        serde_json::json!({ "watch": true, "port": 4200 })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn run_unknown_command_fails() {
    let dir = make_temp_dir("run-unknown");
    write_project(&dir);

    let out = ngcli()
        .current_dir(&dir)
        .args(["run", "serve"])
        .output()
        .expect("failed to run ngcli run");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown command: serve"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn options_prints_projected_list() {
    let dir = make_temp_dir("options");
    let schema = dir.join("schema.json");
    fs::write(&schema, GENERATE_SCHEMA).expect("failed to write schema");

    let out = ngcli()
        .arg("options")
        .arg("--schema")
        .arg(&schema)
        .output()
        .expect("failed to run ngcli options");
    assert_success(&out, "ngcli options");

    let json = stdout_json(&out);
    let names: Vec<&str> = json
        .as_array()
        .expect("options output should be an array")
        .iter()
        .filter_map(|o| o["name"].as_str())
        .collect();
    assert_eq!(names, ["dryRun", "count", "internal", "schematic"]);
    assert_eq!(json[3]["positional"], 0);
    assert_eq!(json[0]["aliases"], serde_json::json!(["d"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn help_renders_command_options() {
    let dir = make_temp_dir("help");
    write_project(&dir);

    let out = ngcli()
        .current_dir(&dir)
        .args(["help", "generate"])
        .output()
        .expect("failed to run ngcli help");
    assert_success(&out, "ngcli help generate");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("generate - Generates files."), "{stdout}");
    assert!(stdout.contains("Usage: generate <schematic> [options]"), "{stdout}");
    assert!(stdout.contains("--dry-run (-d)"), "{stdout}");
    assert!(stdout.contains("--count <number>"), "{stdout}");
    assert!(!stdout.contains("--internal"), "{stdout}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn list_skips_hidden_commands() {
    let dir = make_temp_dir("list");
    write_project(&dir);

    let out = ngcli()
        .current_dir(&dir)
        .arg("list")
        .output()
        .expect("failed to run ngcli list");
    assert_success(&out, "ngcli list");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("generate (g)"), "{stdout}");
    assert!(stdout.contains("Generates files."), "{stdout}");
    assert!(stdout.contains("exec"), "{stdout}");
    assert!(!stdout.contains("secret"), "{stdout}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn run_forwards_arguments_verbatim() {
    let dir = make_temp_dir("run-verbatim");
    write_project(&dir);

    let cases: [(&[&str], serde_json::Value); 4] = [
        (&["--", "--x"], serde_json::json!({ "--": ["--x"] })),
        (&["--help"], serde_json::json!({ "help": true })),
        (&["-h"], serde_json::json!({ "h": true })),
        (&["--manifest", "other.json"], serde_json::json!({ "manifest": "other.json" })),
    ];
    for (args, expected) in cases {
        let out = ngcli()
            .current_dir(&dir)
            .args(["run", "exec"])
            .args(args)
            .output()
            .expect("failed to run ngcli run");
        assert_success(&out, &format!("ngcli run exec {}", args.join(" ")));
        assert_eq!(stdout_json(&out), expected, "args: {args:?}");
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn run_passes_help_to_schema_options() {
    let dir = make_temp_dir("run-help-option");
    write_project(&dir);
    fs::write(
        dir.join("schemas/generate.json"),
        r#"{ "properties": { "help": { "type": "boolean" } } }"#,
    )
    .expect("failed to write schema");

    let out = ngcli()
        .current_dir(&dir)
        .args(["run", "generate", "--help"])
        .output()
        .expect("failed to run ngcli run");
    assert_success(&out, "ngcli run generate --help");
    assert_eq!(stdout_json(&out), serde_json::json!({ "help": true }));

    let _ = fs::remove_dir_all(&dir);
}
