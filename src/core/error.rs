use std::path::PathBuf;

use thiserror::Error;

use super::Address;

pub type FdResult<T> = Result<T, Error>;

/// Errors of the run itself.
/// `ToolSpawn` is the exception: the resolver turns it into a `ResolveError` for the line at hand.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to run {program}: {source}")]
    ToolSpawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Empty tool command")]
    EmptyCommand,
    #[error("Unable to split command line '{0}'")]
    BadCommandLine(String, #[source] shell_words::ParseError),
    #[error("Input and output files are required")]
    MissingFiles,
    #[error("Interactive mode is not available in this build")]
    InteractiveUnavailable,
    #[error("Unknown command")]
    UnknownCommand(String),
    #[error("Too many arguments")]
    TooManyArguments,
    #[error("Insufficient arguments")]
    InsufficientArguments,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors for a single backtrace line.
/// These are written inline to the output and never stop a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("{0}")]
    SymbolListing(String),
    #[error("Function not found: {}", .0.display())]
    FunctionNotFound(PathBuf),
    #[error("{0}")]
    LineResolution(String),
    #[error("Invalid hex value: {0}")]
    InvalidHex(String),
    #[error("Address overflow: {base:x} + {offset:x}")]
    AddressOverflow { base: Address, offset: Address },
    #[error("{0}")]
    Tool(String),
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::{Error, ResolveError};

    #[test]
    fn line_errors_render_like_markers() {
        assert_eq!(
            "File not found: ./myapp",
            ResolveError::FileNotFound(PathBuf::from("./myapp")).to_string()
        );
        assert_eq!(
            "Function not found: ./myapp",
            ResolveError::FunctionNotFound(PathBuf::from("./myapp")).to_string()
        );
        assert_eq!(
            "nm: 'x': No such file",
            ResolveError::SymbolListing("nm: 'x': No such file".into()).to_string()
        );
        assert_eq!(
            "Address overflow: ffffffffffffffff + 1",
            ResolveError::AddressOverflow {
                base: u64::MAX,
                offset: 1
            }
            .to_string()
        );
    }

    #[test]
    fn spawn_error_names_program() {
        let err = Error::ToolSpawn {
            program: "nm".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!("Unable to run nm: not found", err.to_string());
    }
}
