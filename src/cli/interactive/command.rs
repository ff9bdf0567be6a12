use crate::{
    core::{
        convert::convert_line,
        resolve::{single_line, Resolver},
        tools::Toolchain,
    },
    prelude::{Error, FdResult},
};

use super::InteractiveCallback;

pub fn default_actions() -> ActionList {
    ActionList {
        actions: vec![
            Action::new(
                "?",
                vec![Param::with_default("command", "")],
                help_parser,
                "Display help",
            ),
            Action::new("q", vec![], exit_parser, "Quit the program"),
            Action::new(
                "cache",
                vec![],
                cache_parser,
                "List the binaries whose symbols were loaded",
            ),
        ],
    }
}

/// Command syntax:
/// An action name followed by its parameters, e.g. `? cache`.
/// Input that does not start with an action name is resolved
/// as a backtrace line.
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn eval(&self, input: &str) -> FdResult<Commands> {
        // tokenize the input
        let mut split = input.split_whitespace();
        let cmd = split.next().unwrap_or("");
        let args: Vec<&str> = split.collect();

        match self.actions.iter().find(|x| x.name == cmd) {
            Some(action) => action.eval(&args),
            None => Ok(Commands::Resolve(input.into())),
        }
    }

    fn help(&self, f: InteractiveCallback, cmd: &str) -> FdResult<()> {
        let mut printed = false;
        for action in &self.actions {
            if action.name.starts_with(cmd) {
                printed = true;
                action.help(&mut *f)?;
            }
        }
        if printed {
            Ok(())
        } else {
            Err(Error::UnknownCommand(cmd.into()))
        }
    }
}

#[derive(Default)]
pub struct Param {
    name: String,
    default_value: Option<String>,
}

impl Param {
    fn with_default(name: &str, default_value: &str) -> Self {
        Self {
            name: name.into(),
            default_value: Some(default_value.into()),
        }
    }
}

type CommandParser = fn(&[&str], &[Param]) -> FdResult<Commands>;

pub struct Action {
    help: String,
    name: String,
    params: Vec<Param>,
    parser: CommandParser,
}

impl Action {
    fn new(name: &str, params: Vec<Param>, parser: CommandParser, help: &str) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            params,
            parser,
        }
    }

    fn eval(&self, args: &[&str]) -> FdResult<Commands> {
        (self.parser)(args, &self.params)
    }

    fn help(&self, f: InteractiveCallback) -> FdResult<()> {
        f(&self.name)?;
        self.params.iter().try_for_each(|x| {
            if let Some(default_value) = &x.default_value {
                f(&format!(" [{}='{}']", x.name, default_value))
            } else {
                f(&format!(" [{}]", x.name))
            }
        })?;
        f(&format!(" {}\n", self.help))?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Commands {
    Exit,
    Help(String),
    Cache,
    Resolve(String),
}

impl Commands {
    /// Run the command, returning false once the session should end
    pub fn execute<T: Toolchain>(
        &self,
        f: InteractiveCallback,
        resolver: &mut Resolver<T>,
        actions: &ActionList,
    ) -> FdResult<bool> {
        match self {
            Commands::Exit => return Ok(false),
            Commands::Help(cmd) => actions.help(f, cmd)?,
            Commands::Cache => {
                if resolver.cache().is_empty() {
                    f("cache is empty\n")?;
                }
                for (path, entry) in resolver.cache().entries() {
                    match entry {
                        Ok(table) => f(&format!("{}: {} symbols\n", path.display(), table.len()))?,
                        Err(msg) => f(&format!("{}: !! {}\n", path.display(), single_line(msg)))?,
                    }
                }
            }
            Commands::Resolve(line) => {
                let outcome = convert_line(line, resolver);
                f(&format!("{}\n", outcome.render(line)))?;
            }
        }
        Ok(true)
    }
}

/* Command parsers */

fn get_arg_or(args: &[&str], params: &[Param], index: usize) -> FdResult<String> {
    match (args.get(index), params.get(index)) {
        (Some(arg), Some(_)) => Ok(arg.to_string()),
        (None, Some(Param {
            default_value: Some(def),
            ..
        })) => Ok(def.into()),
        _ => Err(Error::InsufficientArguments),
    }
}

fn has_too_many_args(args: &[&str], params: &[Param]) -> FdResult<()> {
    if args.len() > params.len() {
        Err(Error::TooManyArguments)
    } else {
        Ok(())
    }
}

fn help_parser(args: &[&str], params: &[Param]) -> FdResult<Commands> {
    has_too_many_args(args, params)?;

    let cmd = get_arg_or(args, params, 0)?;

    Ok(Commands::Help(cmd))
}

fn exit_parser(args: &[&str], params: &[Param]) -> FdResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Exit)
}

fn cache_parser(args: &[&str], params: &[Param]) -> FdResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Cache)
}
