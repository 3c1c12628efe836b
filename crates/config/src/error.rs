use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that stops the process from starting.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A `.env` file exists but couldn't be read or parsed
    #[display("could not load .env file")]
    DotEnv,
    /// A provider failed or a value had the wrong type
    #[display("could not load configuration")]
    Load,
    /// A required path was not set
    #[display("{_0} is required")]
    MissingPath(#[error(not(source))] &'static str),
    #[display("{_0} does not exist: {}", _1.display())]
    NotFound(#[error(not(source))] &'static str, #[error(not(source))] PathBuf),
    #[display("{_0} is not a directory: {}", _1.display())]
    NotADirectory(#[error(not(source))] &'static str, #[error(not(source))] PathBuf),
    /// Permission bits that aren't an octal number up to `7777`
    #[display("{_0} is not a valid octal mode: {_1}")]
    InvalidMode(#[error(not(source))] &'static str, #[error(not(source))] String),
    #[display("SCAN_INTERVAL_SECONDS must be greater than zero")]
    InvalidInterval,
    #[display("could not create database folder: {}", _0.display())]
    CreateFolder(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Configuration errors never fix themselves.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
