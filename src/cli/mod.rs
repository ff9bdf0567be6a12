#[cfg(feature = "tui")]
pub mod interactive;

use crate::{
    core::{
        config::generate_completion,
        convert::{convert_file, Summary},
        error::{Error, FdResult},
        resolve::Resolver,
        tools::Toolchain,
    },
    prelude::Config,
};
use console::style;
use log::LevelFilter;

pub fn init(cfg: &Config) -> FdResult<()> {
    if let Some(shell) = cfg.completions {
        generate_completion(shell);
        std::process::exit(0);
    }

    init_logger(cfg.verbose)?;

    let tools = cfg.tool_config()?.toolchain()?;
    let resolver = Resolver::new(tools);

    if cfg.interactive {
        interactive_mode(cfg, resolver)
    } else {
        files(cfg, resolver)
    }
}

fn init_logger(verbose: u8) -> FdResult<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|err| Error::Other(err.into()))
}

#[cfg(feature = "tui")]
fn interactive_mode<T: Toolchain>(cfg: &Config, resolver: Resolver<T>) -> FdResult<()> {
    interactive::command_line(cfg, resolver)
}

#[cfg(not(feature = "tui"))]
fn interactive_mode<T: Toolchain>(_cfg: &Config, _resolver: Resolver<T>) -> FdResult<()> {
    Err(Error::InteractiveUnavailable)
}

fn files<T: Toolchain>(cfg: &Config, mut resolver: Resolver<T>) -> FdResult<()> {
    let (input, output) = match (&cfg.input, &cfg.output) {
        (Some(input), Some(output)) => (input, output),
        _ => return Err(Error::MissingFiles),
    };

    let summary = convert_file(input, output, &mut resolver)?;
    report(&summary);
    Ok(())
}

fn report(summary: &Summary) {
    let failed = if summary.failed == 0 {
        style(summary.failed).green()
    } else {
        style(summary.failed).red()
    };
    eprintln!(
        "{} {} lines, {} resolved, {} passed through, {} failed",
        style("converted").bold(),
        summary.lines,
        style(summary.resolved).green(),
        summary.passthrough,
        failed
    );
}
