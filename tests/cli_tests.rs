mod common;

use common::{APP_TEMPLATE, TestFixture};
use std::fs;
use std::io::Write;
use std::process::{Output, Stdio};

/// Run the binary with `args`, feeding `input` on stdin.
fn run(fixture: &TestFixture, args: &[&str], input: &str) -> Output {
    let mut child = fixture
        .command()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_cli_writes_exports_to_stdout() {
    let fixture = TestFixture::new();
    fixture.write_template(
        "mold.yaml",
        r#"
- name: foo
  value: bar
  type: string
  required: true
- name: debug
  value: true
  type: boolean
"#,
    );

    let output = run(&fixture, &[], "yes\ndata\n");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "export FOO=data\nexport DEBUG=true\n"
    );

    // Prompts never end up in the exported environment
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Enter a value for foo (type=string)"));
}

#[test]
fn test_cli_template_tags_and_output_file() {
    let fixture = TestFixture::new();
    fixture.write_template("envs/dev.yaml", APP_TEMPLATE);

    let output = run(
        &fixture,
        &["--template", "envs/dev.yaml", "--tags", "frontend", "--output", "env.sh"],
        "no\n",
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        fs::read_to_string(fixture.base_path.join("env.sh")).unwrap(),
        "export FOO=bar\nexport DEBUG=true\nexport THEME=\"dark mode\"\n"
    );
}

#[test]
fn test_cli_missing_template() {
    let fixture = TestFixture::new();

    let output = run(&fixture, &["--template", "absent.yaml"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to open absent.yaml"));
    assert!(stderr.contains("No mold template found"));
}

#[test]
fn test_cli_invalid_template() {
    let fixture = TestFixture::new();
    fixture.write_template("mold.yaml", "- name: flag\n  value: bar\n  type: boolean\n");

    let output = run(&fixture, &[], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("does not implement the required type"));
}

#[test]
fn test_cli_environment_selects_template() {
    let fixture = TestFixture::new();
    fixture.write_template("custom.yaml", "- name: level\n  value: 3\n  type: number\n");

    let mut command = fixture.command();
    command.env("ENVMOLD_TEMPLATE", "custom.yaml");
    let output = command.stdin(Stdio::null()).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "export LEVEL=3\n");
}

// The config directory only follows XDG_CONFIG_HOME on Linux
#[cfg(target_os = "linux")]
#[test]
fn test_cli_config_file_defaults() {
    let fixture = TestFixture::new();
    fixture.write_template("molds/app.yaml", APP_TEMPLATE);
    fixture.write_template(
        ".config/envmold/config.toml",
        "[defaults]\ntemplate = \"molds/app.yaml\"\ntags = [\"backend\"]\n",
    );

    let output = run(&fixture, &[], "n\n");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "export FOO=bar\nexport DEBUG=true\nexport DATABASE_PASSWORD=mock_creds\nexport PORT=5432\n"
    );
}

#[test]
fn test_cli_list_secret_managers() {
    let fixture = TestFixture::new();

    let output = run(&fixture, &["--list-secret-managers"], "");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("mock: "));
    assert!(lines[1].starts_with("vault: "));
}
