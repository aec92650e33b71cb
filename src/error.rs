use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// A git invocation could not be spawned, or a required command
    /// returned a non-zero exit.
    Command { args: String, message: String },
    Io(std::io::Error),
    Config(String),
    Terminal(String),
    NotARepository(PathBuf),
    DirectoryNotFound(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Command { args, message } => write!(f, "git {}: {}", args, message),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::Terminal(msg) => write!(f, "Terminal error: {}", msg),
            Error::NotARepository(path) => {
                write!(f, "Not a git repository: {}", path.display())
            }
            Error::DirectoryNotFound(path) => {
                write!(f, "Directory not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
