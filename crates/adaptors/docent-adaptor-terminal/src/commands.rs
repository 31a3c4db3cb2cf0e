//! Slash command parsing for the chat shell

/// Index type selection argument of `/use`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSelection {
    /// Select every available index type
    All,
    /// Select by 1-based display numbers
    Picks(Vec<usize>),
}

/// Argument of `/prompt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptArg {
    /// Show the current prompt
    Show,
    /// Deactivate the custom prompt
    Off,
    /// Set and activate a custom prompt
    Set(String),
}

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rooms,
    Open(usize),
    New,
    Rename(String),
    Delete(Option<usize>),
    Search(String),
    Indexes,
    Use(IndexSelection),
    Model(Option<String>),
    Prompt(PromptArg),
    Good,
    Bad,
    History,
    Whoami,
    Help,
    Quit,
}

/// Parse one input line starting with `/`; Err carries the usage message
pub fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match name {
        "/rooms" => Ok(Command::Rooms),
        "/open" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Command::Open(n)),
            _ => Err("usage: /open <room number>".to_string()),
        },
        "/new" => Ok(Command::New),
        "/rename" => {
            if rest.is_empty() {
                Err("usage: /rename <new name>".to_string())
            } else {
                Ok(Command::Rename(rest.to_string()))
            }
        }
        "/delete" => {
            if rest.is_empty() {
                Ok(Command::Delete(None))
            } else {
                match rest.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Command::Delete(Some(n))),
                    _ => Err("usage: /delete [room number]".to_string()),
                }
            }
        }
        "/search" => {
            if rest.is_empty() {
                Err("usage: /search <query>".to_string())
            } else {
                Ok(Command::Search(rest.to_string()))
            }
        }
        "/indexes" => Ok(Command::Indexes),
        "/use" => parse_use(rest),
        "/model" => {
            if rest.is_empty() {
                Ok(Command::Model(None))
            } else {
                Ok(Command::Model(Some(rest.to_string())))
            }
        }
        "/prompt" => {
            if rest.is_empty() {
                Ok(Command::Prompt(PromptArg::Show))
            } else if rest == "off" {
                Ok(Command::Prompt(PromptArg::Off))
            } else {
                Ok(Command::Prompt(PromptArg::Set(rest.to_string())))
            }
        }
        "/good" => Ok(Command::Good),
        "/bad" => Ok(Command::Bad),
        "/history" => Ok(Command::History),
        "/whoami" => Ok(Command::Whoami),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!(
            "unknown command: {}. Type /help for the command list.",
            other
        )),
    }
}

fn parse_use(rest: &str) -> Result<Command, String> {
    if rest.is_empty() {
        return Err("usage: /use all | /use <numbers...>".to_string());
    }
    if rest.eq_ignore_ascii_case("all") {
        return Ok(Command::Use(IndexSelection::All));
    }
    let mut picks = Vec::new();
    for token in rest.split_whitespace() {
        match token.parse::<usize>() {
            Ok(n) if n >= 1 => picks.push(n),
            _ => return Err(format!("not a valid index number: {}", token)),
        }
    }
    Ok(Command::Use(IndexSelection::Picks(picks)))
}

/// The `/help` listing
pub const HELP: &str = "\
commands:
  /rooms              list chat rooms (newest first)
  /open <n>           switch to room n
  /new                create a room and switch to it
  /rename <name>      rename the current room
  /delete [n]         delete room n (default: current room)
  /search <query>     find rooms by name
  /indexes            list search index types
  /use all|<n...>     choose which index types to search
  /model [name]       show models, or switch to one
  /prompt [text|off]  set, show, or deactivate the custom prompt
  /good, /bad         rate the last answer
  /history            reprint the conversation
  /whoami             show the signed-in user
  /help               this list
  /quit               leave";
