//! Operator commands for the line-oriented form.

use margin_core::FieldName;
use thiserror::Error;

/// Errors produced while reading an operator command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// One action requested by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: FieldName, value: String },
    Clear(FieldName),
    Calculate,
    Reset,
    Show,
    /// Change the log filter, e.g. `log debug`.
    LogLevel(String),
    Help,
    Quit,
}

/// Command summary printed by `help`.
pub const HELP: &str = "\
Commands:
  set <field> <value>   enter a value (comma or point as decimal separator)
  clear <field>         remove a value
  calc                  solve the form (an empty line does the same)
  reset                 clear every field
  show                  print the form
  log <level>           change log verbosity (error, warn, info, debug, trace)
  help                  print this list
  quit                  leave
Fields: cost, net1, added_value, discount, net2, target_margin";

impl Command {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "" | "calc" | "calculate" => Ok(Self::Calculate),
            "reset" => Ok(Self::Reset),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "log" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("log <level>"));
                }
                Ok(Self::LogLevel(rest.to_string()))
            }
            "clear" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("clear <field>"));
                }
                Ok(Self::Clear(parse_field(rest)?))
            }
            "set" => {
                let Some((field, value)) = rest.split_once(char::is_whitespace) else {
                    return Err(CommandError::Usage("set <field> <value>"));
                };
                Ok(Self::Set {
                    field: parse_field(field)?,
                    value: value.trim().to_string(),
                })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_field(name: &str) -> Result<FieldName, CommandError> {
    FieldName::parse(&name.to_ascii_lowercase())
        .ok_or_else(|| CommandError::UnknownField(name.to_string()))
}
