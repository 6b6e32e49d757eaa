//! Test helpers for black-box behavioral specifications against the `odc`
//! binary: invoke the CLI, verify stdout/stderr/exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Resolve the built `odc` binary, checking llvm-cov's target directory
/// first and falling back to the path relative to the test binary itself
/// when `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn odc_binary() -> PathBuf {
    binary_path("odc")
}

/// Create a CLI builder for `odc` invocations.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(odc_binary());
        cmd.args(&self.args);
        cmd.env_remove("ODC_STATE_DIR");
        cmd.env_remove("ODC_CONFIG");
        for (key, value) in self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

/// Isolated `ODC_STATE_DIR` per test, so restore files and history logs
/// never leak between tests run in parallel.
pub struct Partition {
    state_dir: tempfile::TempDir,
    name: String,
}

impl Partition {
    /// Create a fixture for a fresh partition named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            state_dir: tempfile::tempdir().unwrap(),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a topology file under this fixture's own scratch directory and
    /// return its path.
    pub fn topo_file(&self, content: &str) -> PathBuf {
        let path = self.state_dir.path().join("topology.xml");
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Run `odc` against this fixture's isolated state directory, with
    /// `--partition <name>` already applied when `with_partition` is used.
    pub fn odc(&self) -> CliBuilder {
        cli().env("ODC_STATE_DIR", self.state_dir.path())
    }

    /// Like [`Partition::odc`] but with `--partition <name>` already in the
    /// argument list (callers append the verb and its own flags).
    pub fn odc_for_partition(&self, args: &[&str]) -> CliBuilder {
        let mut full = vec!["--partition", self.name()];
        full.extend_from_slice(args);
        self.odc().args(&full)
    }
}

/// Topology with a non-root group holding one collection of `n` instances,
/// each with a single task template (§3).
pub fn single_collection_topology(collection: &str, n: u32) -> String {
    format!(
        r#"[root]
name = "main"

[[root.groups]]
name = "zone1"

[[root.groups.collections]]
name = "{collection}"
n = {n}

[[root.groups.collections.tasks]]
name = "Worker"
"#
    )
}

/// Topology whose root group has zero tasks — resolves deterministically
/// with no runtime tasks to coordinate, exercising the controller's verb
/// surface without needing a live deployment runtime.
pub const EMPTY_TOPOLOGY: &str = "[root]\nname = \"main\"\n";
