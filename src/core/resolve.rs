use std::{borrow::Cow, fmt::Display, path::Path};

use log::{debug, trace};

use super::{
    error::ResolveError,
    frame::Frame,
    symbols::SymbolCache,
    tools::Toolchain,
    Address,
};

/// Marker in front of every line that could not be resolved
pub const FAILURE_MARKER: &str = "!!";

/// What became of one input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The line is not a frame and goes out unchanged
    Passthrough,
    /// The resolver's answer, usually `file:line`
    Resolved(String),
    Failed(ResolveError),
}

impl Outcome {
    /// The text to write for this outcome, `raw` being the input line
    pub fn render<'a>(&'a self, raw: &'a str) -> Rendered<'a> {
        match self {
            Self::Passthrough => Rendered::Raw(raw),
            Self::Resolved(text) => Rendered::Text(text),
            Self::Failed(err) => Rendered::Failure(err),
        }
    }
}

pub enum Rendered<'a> {
    /// Input line copied byte for byte
    Raw(&'a str),
    Text(&'a str),
    Failure(&'a ResolveError),
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Raw(raw) => write!(f, "{}", raw),
            Rendered::Text(text) => write!(f, "{}", single_line(text)),
            Rendered::Failure(err) => {
                write!(f, "{} {}", FAILURE_MARKER, single_line(&err.to_string()))
            }
        }
    }
}

/// Fold tool output spanning several lines into one, joined by `; `.
/// Blank lines are dropped.
pub fn single_line(text: &str) -> Cow<'_, str> {
    if !text.contains(|c| c == '\n' || c == '\r') {
        return Cow::Borrowed(text);
    }
    let parts: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();
    Cow::Owned(parts.join("; "))
}

pub fn parse_hex(digits: &str) -> Result<Address, ResolveError> {
    Address::from_str_radix(digits, 16).map_err(|_| ResolveError::InvalidHex(digits.into()))
}

/// Turns frames into source locations.
/// Owns the symbol cache for the duration of one run.
pub struct Resolver<T> {
    tools: T,
    cache: SymbolCache,
}

impl<T: Toolchain> Resolver<T> {
    pub fn new(tools: T) -> Self {
        Self {
            tools,
            cache: SymbolCache::new(),
        }
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    pub fn cache(&self) -> &SymbolCache {
        &self.cache
    }

    pub fn resolve(&mut self, frame: &Frame) -> Outcome {
        let res = match frame {
            Frame::Passthrough(_) => return Outcome::Passthrough,
            Frame::Symbolic {
                binary,
                function,
                offset,
            } => self.resolve_symbolic(binary, function, offset),
            Frame::Anonymous { binary, address } => self.resolve_anonymous(binary, address),
        };

        match res {
            Ok(text) => Outcome::Resolved(text),
            Err(err) => {
                debug!("unresolved frame {:?}: {}", frame, err);
                Outcome::Failed(err)
            }
        }
    }

    fn resolve_symbolic(
        &mut self,
        binary: &Path,
        function: &str,
        offset: &str,
    ) -> Result<String, ResolveError> {
        ensure_exists(binary)?;

        let address = if function.is_empty() {
            parse_hex(offset)?
        } else {
            let base = parse_hex(self.cache.resolve_function_address(
                &mut self.tools,
                binary,
                function,
            )?)?;
            let offset = parse_hex(offset)?;
            trace!("{}: {:x} + {:x}", function, base, offset);
            base.checked_add(offset)
                .ok_or(ResolveError::AddressOverflow { base, offset })?
        };
        self.resolve_address(binary, address)
    }

    fn resolve_anonymous(&mut self, binary: &Path, address: &str) -> Result<String, ResolveError> {
        ensure_exists(binary)?;
        let address = parse_hex(address)?;
        self.resolve_address(binary, address)
    }

    fn resolve_address(&mut self, binary: &Path, address: Address) -> Result<String, ResolveError> {
        let output = self
            .tools
            .resolve_address(binary, address)
            .map_err(|err| ResolveError::Tool(err.to_string()))?;
        if output.success {
            Ok(output.text().into())
        } else {
            Err(ResolveError::LineResolution(output.message()))
        }
    }
}

fn ensure_exists(binary: &Path) -> Result<(), ResolveError> {
    if binary.exists() {
        Ok(())
    } else {
        Err(ResolveError::FileNotFound(binary.to_path_buf()))
    }
}
