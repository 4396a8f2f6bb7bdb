//! Parsing of the lines typed into the lobby console.

use session::MenuCommand;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  host <name>   host a session called <name>
  refresh       search for sessions
  join <index>  join an entry of the last server list
  start         start the active session
  menu          return to the main menu
  quit          leave the lobby";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a server list index")]
    InvalidIndex(String),
}

pub fn parse(line: &str) -> Result<MenuCommand, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "host" if rest.is_empty() => Err(ParseError::MissingArgument("host")),
        "host" => Ok(MenuCommand::Host(rest.to_owned())),
        "refresh" | "find" => Ok(MenuCommand::RefreshServerList),
        "join" if rest.is_empty() => Err(ParseError::MissingArgument("join")),
        "join" => rest
            .parse()
            .map(MenuCommand::Join)
            .map_err(|_| ParseError::InvalidIndex(rest.to_owned())),
        "start" => Ok(MenuCommand::StartSession),
        "menu" => Ok(MenuCommand::LoadMainMenu),
        "quit" | "exit" => Ok(MenuCommand::Quit),
        _ => Err(ParseError::Unknown(word.to_owned())),
    }
}
