pub use crate::core::{
    config::{Config, ToolConfig},
    convert::{convert, convert_file, convert_line, Summary},
    error::{Error, FdResult, ResolveError},
    frame::Frame,
    resolve::{Outcome, Resolver},
    symbols::{SymbolCache, SymbolTable},
    tools::{ExternalTool, SystemToolchain, ToolOutput, Toolchain},
    Address,
};
