use thiserror::Error;

/// Errors that can occur while setting up a test environment.
#[derive(Error, Debug)]
pub enum TestError {
    /// Creating the temporary directory or seeding a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
