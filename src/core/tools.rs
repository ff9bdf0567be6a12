use std::{
    ffi::OsStr,
    path::Path,
    process::{Command, Stdio},
};

use log::{debug, trace};

use super::{
    error::{Error, FdResult},
    Address,
};

/// Captured result of one external tool invocation
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(stdout: &str) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stderr: &str) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout without its trailing line terminators
    pub fn text(&self) -> &str {
        trim_newlines(&self.stdout)
    }

    /// Stdout followed by stderr, the way a shell would show both streams
    pub fn message(&self) -> String {
        let stdout = trim_newlines(&self.stdout);
        let stderr = trim_newlines(&self.stderr);
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.into(),
            (true, false) => stderr.into(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }
}

fn trim_newlines(s: &str) -> &str {
    s.trim_end_matches(|c| c == '\n' || c == '\r')
}

/// The two collaborators a conversion needs.
/// Both only report what the tool printed; interpreting the output is up to the caller.
pub trait Toolchain {
    /// List the symbols of `binary`, one `ADDRESS TYPE NAME` entry per line
    fn list_symbols(&mut self, binary: &Path) -> FdResult<ToolOutput>;

    /// Map `address` inside `binary` to a `file:line` string
    fn resolve_address(&mut self, binary: &Path, address: Address) -> FdResult<ToolOutput>;
}

/// A program plus its leading arguments.
/// Per-call arguments are appended when it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalTool {
    program: String,
    args: Vec<String>,
}

impl ExternalTool {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.into(),
            args: vec![],
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Split a command line using shell quoting rules
    pub fn parse(command_line: &str) -> FdResult<Self> {
        let mut words = shell_words::split(command_line)
            .map_err(|err| Error::BadCommandLine(command_line.into(), err))?;
        if words.is_empty() {
            return Err(Error::EmptyCommand);
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn run<I, S>(&self, extra: I) -> FdResult<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).args(extra).stdin(Stdio::null());
        debug!("running {:?}", cmd);

        let output = cmd.output().map_err(|source| Error::ToolSpawn {
            program: self.program.clone(),
            source,
        })?;
        trace!("{} exited with {}", self.program, output.status);

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// `nm` and `addr2line` run as subprocesses
#[derive(Clone, Debug)]
pub struct SystemToolchain {
    nm: ExternalTool,
    addr2line: ExternalTool,
}

impl SystemToolchain {
    pub fn new(nm: ExternalTool, addr2line: ExternalTool) -> Self {
        Self { nm, addr2line }
    }

    pub fn nm(&self) -> &ExternalTool {
        &self.nm
    }

    pub fn addr2line(&self) -> &ExternalTool {
        &self.addr2line
    }
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self {
            nm: ExternalTool::new("nm").arg("-p"),
            addr2line: ExternalTool::new("addr2line"),
        }
    }
}

impl Toolchain for SystemToolchain {
    fn list_symbols(&mut self, binary: &Path) -> FdResult<ToolOutput> {
        self.nm.run([binary.as_os_str()])
    }

    fn resolve_address(&mut self, binary: &Path, address: Address) -> FdResult<ToolOutput> {
        let hex = format!("{:x}", address);
        self.addr2line
            .run([OsStr::new("-e"), binary.as_os_str(), OsStr::new(&hex)])
    }
}
