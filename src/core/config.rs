use std::path::PathBuf;

use super::tools::{ExternalTool, SystemToolchain};
use crate::prelude::FdResult;
#[cfg(feature = "cli")]
use clap::{CommandFactory, Parser};
#[cfg(feature = "cli")]
use clap_complete::{generate, Generator, Shell};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Command lines for the two external tools.
/// The symbol lister gets the binary appended, the line resolver gets `-e BINARY ADDRESS`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    pub nm: String,
    pub addr2line: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            nm: "nm -p".into(),
            addr2line: "addr2line".into(),
        }
    }
}

impl ToolConfig {
    #[cfg(feature = "serde")]
    pub fn from_ron(data: &str) -> FdResult<Self> {
        use anyhow::Context;
        Ok(ron::from_str(data).context("Unable to parse tool config")?)
    }

    pub fn toolchain(&self) -> FdResult<SystemToolchain> {
        Ok(SystemToolchain::new(
            ExternalTool::parse(&self.nm)?,
            ExternalTool::parse(&self.addr2line)?,
        ))
    }
}

#[derive(Debug, Default)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(author, version, about, long_about = None))]
pub struct Config {
    /// backtrace dump to convert
    #[cfg_attr(
        feature = "cli",
        arg(required_unless_present_any = ["interactive", "completions"], requires = "output")
    )]
    pub input: Option<PathBuf>,

    /// file to write the resolved lines to
    pub output: Option<PathBuf>,

    // symbol lister command line
    #[cfg_attr(feature = "cli", clap(long, value_name = "COMMAND"))]
    pub nm: Option<String>,

    // line resolver command line
    #[cfg_attr(feature = "cli", clap(long, value_name = "COMMAND"))]
    pub addr2line: Option<String>,

    // ron file holding a tool config
    #[cfg_attr(feature = "cli", clap(long, short))]
    pub tools: Option<PathBuf>,

    #[cfg_attr(feature = "cli", arg(short, long, action = clap::ArgAction::Count))]
    pub verbose: u8,

    #[cfg_attr(feature = "cli", arg(long, short))]
    pub interactive: bool,

    #[cfg_attr(feature = "cli", clap(long, value_name = "SHELL"))]
    #[cfg(feature = "cli")]
    pub completions: Option<Shell>,
}

impl Config {
    #[cfg(feature = "cli")]
    pub fn new() -> Self {
        Self::parse()
    }

    #[cfg(not(feature = "cli"))]
    pub fn new() -> Self {
        Default::default()
    }

    /// Defaults, then the tools file, then the command line flags
    #[cfg(feature = "cli")]
    pub fn tool_config(&self) -> FdResult<ToolConfig> {
        let mut tools = if let Some(path) = &self.tools {
            let path = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            ToolConfig::from_ron(&std::fs::read_to_string(path)?)?
        } else {
            ToolConfig::default()
        };
        if let Some(nm) = &self.nm {
            tools.nm = nm.clone();
        }
        if let Some(addr2line) = &self.addr2line {
            tools.addr2line = addr2line.clone();
        }
        Ok(tools)
    }
}

#[cfg(feature = "cli")]
pub fn generate_completion<G: Generator>(gen: G) {
    generate(
        gen,
        &mut Config::command(),
        Config::command().get_name(),
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod test {
    use super::ToolConfig;

    #[test]
    fn default_tools() {
        let tools = ToolConfig::default().toolchain().unwrap();
        assert_eq!("nm", tools.nm().program());
        assert_eq!(vec!["-p"], tools.nm().args());
        assert_eq!("addr2line", tools.addr2line().program());
        assert!(tools.addr2line().args().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ron_overrides_defaults() {
        let tools = ToolConfig::from_ron(r#"(addr2line: "aarch64-linux-gnu-addr2line -C")"#).unwrap();
        assert_eq!("nm -p", tools.nm);
        assert_eq!("aarch64-linux-gnu-addr2line -C", tools.addr2line);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ron_parse_error() {
        assert!(ToolConfig::from_ron("(nm: 12)").is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn flags_override_tools_file() {
        use super::Config;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"(nm: "llvm-nm -p", addr2line: "llvm-addr2line")"#).unwrap();
        let cfg = Config {
            tools: Some(file.path().to_path_buf()),
            addr2line: Some("eu-addr2line".into()),
            ..Default::default()
        };
        let tools = cfg.tool_config().unwrap();
        assert_eq!("llvm-nm -p", tools.nm);
        assert_eq!("eu-addr2line", tools.addr2line);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn cli_requires_both_files() {
        use super::Config;
        use clap::Parser;
        use std::path::PathBuf;

        let cfg = Config::try_parse_from(["btconvert", "in.txt", "out.txt"]).unwrap();
        assert_eq!(Some(PathBuf::from("in.txt")), cfg.input);
        assert_eq!(Some(PathBuf::from("out.txt")), cfg.output);

        assert!(Config::try_parse_from(["btconvert", "in.txt"]).is_err());
        assert!(Config::try_parse_from(["btconvert"]).is_err());
        assert!(Config::try_parse_from(["btconvert", "a", "b", "c"]).is_err());
        assert!(Config::try_parse_from(["btconvert", "-i"]).is_ok());
    }
}
