#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// The template used by most integration tests.
pub const APP_TEMPLATE: &str = r#"
- name: foo
  value: bar
  type: string
  required: true

- name: debug
  value: true
  type: boolean

- name: database_password
  value: mock("test/creds")
  type: string
  required: true
  tags: [backend]

- name: port
  value: 5432
  type: number
  tags: [backend]

- name: theme
  value: dark mode
  type: string
  tags: [frontend]
"#;

/// Test helper for creating temporary directories with mold templates
pub struct TestFixture {
    _temp_dir: TempDir,
    pub base_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            base_path,
        }
    }

    /// Write `content` to `name` inside the fixture directory
    pub fn write_template(&self, name: &str, content: &str) -> PathBuf {
        let path = self.base_path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// A command for the envmold binary, isolated from the user's
    /// configuration and environment
    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_envmold"));
        command
            .current_dir(&self.base_path)
            .env("HOME", &self.base_path)
            .env("XDG_CONFIG_HOME", self.base_path.join(".config"))
            .env_remove("ENVMOLD_TEMPLATE")
            .env_remove("ENVMOLD_OUTPUT")
            .env_remove("ENVMOLD_TAGS")
            .env_remove("VAULT_ADDR")
            .env_remove("VAULT_TOKEN")
            .env_remove("RUST_LOG");
        command
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
