//! Shell-script stand-ins for the conversion tool, used by unit tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Script that answers like pandoc for the calls the gateway makes.
///
/// Shared with the API integration tests.
pub const FAKE_PANDOC: &str = include_str!("../fixtures/fake-pandoc.sh");

/// An executable `/bin/sh` script in its own temp directory.
pub struct StubTool {
    dir: TempDir,
    path: PathBuf,
}

impl StubTool {
    /// Write `body` as an executable script.
    pub fn new(body: &str) -> Self {
        Self::from_script(&format!("#!/bin/sh\n{body}\n"))
    }

    /// A stub that behaves like [`FAKE_PANDOC`].
    pub fn pandoc() -> Self {
        Self::from_script(FAKE_PANDOC)
    }

    fn from_script(script: &str) -> Self {
        let dir = tempfile::tempdir().expect("stub dir");
        let path = dir.path().join("stub-tool");
        std::fs::write(&path, script).expect("write stub");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub");
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Script path as a program string.
    pub fn program(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}
