//! Helpers for driving the plottwist binary against a throwaway project

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to get the path to the plottwist binary
pub fn plottwist_bin() -> PathBuf {
    // In tests, the binary should be at target/debug/plottwist
    let mut path = env::current_exe()
        .expect("Failed to get current executable path")
        .parent()
        .expect("No parent")
        .to_path_buf();

    // If we're in deps/, go up one more level
    if path.ends_with("deps") {
        path = path.parent().expect("No parent").to_path_buf();
    }

    path.join("plottwist")
}

/// A project directory laid out the way the launcher expects
pub struct Project {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Project {
    /// `.env`, a frontend with `index.html` + `app.js`, and a backend entry
    /// that records its arguments to `launched.txt`
    pub fn new() -> Self {
        let project = Self::empty();
        project.write(".env", "GOOGLE_API_KEY=test\nOPENAI_API_KEY=test\n");
        project.write("frontend/index.html", "<html></html>");
        project.write("frontend/app.js", "console.log('plottwist');");
        project.backend("echo \"$@\" > launched.txt\nexit 0\n");
        project
    }

    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path().join(rel)).expect("Failed to remove file");
    }

    /// Backend entry body; it is run with `sh` in place of Python
    pub fn backend(&self, script: &str) {
        self.write("backend/main.py", script);
    }

    /// Installs an executable fake interpreter that answers `-m pip ...`
    /// from `pip_show_status` and logs every pip call to `pip.log`
    #[cfg(unix)]
    pub fn fake_python(&self, pip_show_status: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"-m\" ] && [ \"$2\" = \"pip\" ]; then\n\
             \techo \"$3 $4\" >> pip.log\n\
             \tif [ \"$3\" = \"show\" ]; then exit {}; fi\n\
             \texit 0\n\
             fi\n\
             exec sh \"$@\"\n",
            pip_show_status
        );
        let path = self.path().join("fake-python");
        fs::write(&path, script).expect("Failed to write fake interpreter");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to chmod fake interpreter");
        path
    }

    /// Runs plottwist in the project directory with `sh` as the interpreter
    /// and the bootstrap skipped unless `extra` overrides it
    pub fn run(&self, extra: &[&str]) -> Output {
        let mut command = Command::new(plottwist_bin());
        command.current_dir(self.path()).env_remove("RUST_LOG");
        for (key, _) in env::vars() {
            if key.starts_with("PLOTTWIST_") {
                command.env_remove(key);
            }
        }
        command
            .args(extra)
            .output()
            .expect("Failed to execute plottwist")
    }

    pub fn run_default(&self, extra: &[&str]) -> Output {
        let mut args = vec!["--python", "sh", "--skip-bootstrap"];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// Sorted file paths below `rel`, relative to it
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let root = self.path().join(rel);
        let mut found = Vec::new();
        collect(&root, &root, &mut found);
        found.sort();
        found
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).expect("Failed to read file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }
}

fn collect(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, found);
        } else if let Ok(rel) = path.strip_prefix(root) {
            found.push(rel.to_string_lossy().to_string());
        }
    }
}
