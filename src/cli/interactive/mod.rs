pub mod command;

use crate::{
    core::{resolve::Resolver, tools::Toolchain},
    prelude::{Config, Error, FdResult},
};
use rustyline::error::ReadlineError;

use self::command::default_actions;

pub type InteractiveCallback<'a> = &'a mut dyn FnMut(&str) -> FdResult<()>;

pub fn default_interactive_callback(s: &str) -> FdResult<()> {
    print!("{}", s);
    Ok(())
}

pub fn command_line<T: Toolchain>(_cfg: &Config, mut resolver: Resolver<T>) -> FdResult<()> {
    let mut rl = rustyline::DefaultEditor::new().map_err(|err| Error::Other(err.into()))?;
    let actions = default_actions();
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())
                    .map_err(|err| Error::Other(err.into()))?;
                let res = actions.eval(&line).and_then(|cmd| {
                    cmd.execute(&mut default_interactive_callback, &mut resolver, &actions)
                });
                match res {
                    Ok(true) => {}
                    Ok(false) => return Ok(()),
                    Err(err) => eprintln!("{}", err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(err) => eprintln!("{:?}", err),
        }
    }
}
