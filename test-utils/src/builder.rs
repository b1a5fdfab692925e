use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with pre-seeded files.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::builder::TestBuilder;
///
/// let test = TestBuilder::new()
///     .with_file("target_user_id.txt", "123")
///     .with_file("logs.txt", "")
///     .build()?;
/// ```
pub struct TestBuilder {
    /// Files to write into the test directory, in insertion order.
    files: Vec<(String, String)>,
}

impl TestBuilder {
    /// Creates a new test builder with no files configured.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Seeds a file named `name` with `contents` when the context is built.
    ///
    /// Adding the same name twice keeps the last contents.
    pub fn with_file(mut self, name: &str, contents: &str) -> Self {
        self.files.push((name.to_string(), contents.to_string()));
        self
    }

    /// Creates the temporary directory and writes all configured files.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with every seeded file present
    /// - `Err(TestError::Io)` - Directory creation or a file write failed
    pub fn build(self) -> Result<TestContext, TestError> {
        let context = TestContext::new()?;

        for (name, contents) in &self.files {
            context.write(name, contents)?;
        }

        Ok(context)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that seeded files are readable from the built context.
    ///
    /// Expected: Ok with file contents matching the last value written
    #[test]
    fn seeds_files() {
        let test = TestBuilder::new()
            .with_file("a.txt", "first")
            .with_file("a.txt", "second")
            .with_file("b.txt", "")
            .build()
            .unwrap();

        assert_eq!(test.read("a.txt").as_deref(), Some("second"));
        assert_eq!(test.read("b.txt").as_deref(), Some(""));
        assert_eq!(test.read("missing.txt"), None);
    }
}
