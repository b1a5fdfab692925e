use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::TestError;

/// Test context owning an isolated temporary directory.
///
/// Every file-backed store under test should be pointed at a path inside this directory.
/// The directory and everything in it is removed when the context is dropped, so keep the
/// context alive for as long as the stores that use it.
pub struct TestContext {
    /// Temporary directory backing this test.
    pub dir: TempDir,
}

impl TestContext {
    /// Creates a new context with an empty temporary directory.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with a fresh directory
    /// - `Err(TestError::Io)` - The directory could not be created
    pub fn new() -> Result<Self, TestError> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Returns the absolute path of `name` inside the test directory.
    ///
    /// The file is not created.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Reads `name` from the test directory, returning `None` if it does not exist.
    pub fn read(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.path(name)).ok()
    }

    /// Writes `contents` to `name` inside the test directory, replacing any existing file.
    pub fn write(&self, name: &str, contents: &str) -> Result<(), TestError> {
        std::fs::write(self.path(name), contents)?;
        Ok(())
    }
}
