use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `binary(function+0xOFFSET)[0xADDRESS]`
    static ref SYMBOLIC: Regex = Regex::new(
        r"^(?P<binary>.+)\((?P<function>.*)\+0x(?P<offset>[0-9A-Fa-f]+)\)\[0x[0-9A-Fa-f]+\]$"
    )
    .unwrap();
    /// `binary[0xADDRESS]`
    static ref ANONYMOUS: Regex =
        Regex::new(r"^(?P<binary>.+)\[0x(?P<address>[0-9A-Fa-f]+)\]$").unwrap();
}

/// One line of a backtrace dump
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A frame with a function name (possibly empty) and an offset into it.
    /// `offset` holds hex digits without the `0x` prefix.
    Symbolic {
        binary: PathBuf,
        function: String,
        offset: String,
    },
    /// A frame that only carries an absolute address (hex digits)
    Anonymous { binary: PathBuf, address: String },
    /// Anything else, copied to the output as is
    Passthrough(String),
}

impl Frame {
    /// Classify a line. The line terminator must already be stripped.
    pub fn parse(line: &str) -> Self {
        if let Some(caps) = SYMBOLIC.captures(line) {
            Self::Symbolic {
                binary: PathBuf::from(&caps["binary"]),
                function: caps["function"].into(),
                offset: caps["offset"].into(),
            }
        } else if let Some(caps) = ANONYMOUS.captures(line) {
            Self::Anonymous {
                binary: PathBuf::from(&caps["binary"]),
                address: caps["address"].into(),
            }
        } else {
            Self::Passthrough(line.into())
        }
    }

    pub fn binary(&self) -> Option<&Path> {
        match self {
            Self::Symbolic { binary, .. } | Self::Anonymous { binary, .. } => Some(binary.as_path()),
            Self::Passthrough(_) => None,
        }
    }
}
