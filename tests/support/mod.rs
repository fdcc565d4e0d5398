#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A data directory in a tempdir, driven through the `weekplan` binary.
pub struct TestHousehold {
    dir: TempDir,
}

impl TestHousehold {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    /// Runs `weekplan init`, optionally without sample data.
    pub fn init(seed: bool) -> Self {
        let household = Self::new();
        let mut cmd = household.cmd();
        cmd.arg("init");
        if !seed {
            cmd.arg("--empty");
        }
        cmd.assert().success();
        household
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn household_file(&self) -> PathBuf {
        self.data_dir().join("household.json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = weekplan_cmd();
        cmd.current_dir(self.path());
        cmd.arg("--dir").arg(self.data_dir());
        cmd
    }

    /// Runs a command with `--json`, asserts success, returns `data`.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json output");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }

    /// Runs a command with `--json` that must fail; returns the envelope.
    pub fn json_error(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json error output");
        assert_eq!(value["status"], "error");
        value
    }

    pub fn add_person(&self, name: &str) -> String {
        self.json(&["person", "add", name])["person"]["id"]
            .as_str()
            .expect("person id")
            .to_string()
    }

    pub fn add_task(&self, name: &str) -> String {
        self.json(&["task", "add", name])["task"]["id"]
            .as_str()
            .expect("task id")
            .to_string()
    }
}

pub fn weekplan_cmd() -> Command {
    let mut cmd = Command::cargo_bin("weekplan").expect("weekplan binary");
    cmd.env_remove("WEEKPLAN_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}
