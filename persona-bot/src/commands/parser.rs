//! Parses inbound text into a [`Command`] once, at the boundary.

use crate::core::Message;
use crate::mention::get_question;

/// `personality` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalityAction {
    List,
    /// `None` when the name argument is missing.
    Set(Option<String>),
    Current,
    /// No subcommand given.
    Missing,
    Unknown(String),
}

/// `memory` subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryAction {
    View,
    Delete,
    Missing,
    Unknown(String),
}

/// A user command, resolved from its name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ask` / `chat` / `talk`, or an @mention. Text may be empty.
    Ask(String),
    /// `reset` / `clear`.
    Reset,
    /// `personality` / `persona`.
    Personality(PersonalityAction),
    /// `memory` / `mem` / `context`.
    Memory(MemoryAction),
    /// `slap` / `smack` / `bonk`, with an optional target.
    Slap(Option<String>),
    /// `help` / `start`.
    Help,
    Unknown(String),
}

impl Command {
    /// Resolves a command word and its argument string.
    pub fn from_parts(name: &str, args: &str) -> Self {
        let args = args.trim();
        let mut words = args.split_whitespace();
        match name.to_lowercase().as_str() {
            "ask" | "chat" | "talk" => Command::Ask(args.to_string()),
            "reset" | "clear" => Command::Reset,
            "personality" | "persona" => {
                let action = match words.next().map(str::to_lowercase).as_deref() {
                    None => PersonalityAction::Missing,
                    Some("list") => PersonalityAction::List,
                    Some("set") => PersonalityAction::Set(words.next().map(str::to_lowercase)),
                    Some("current") => PersonalityAction::Current,
                    Some(other) => PersonalityAction::Unknown(other.to_string()),
                };
                Command::Personality(action)
            }
            "memory" | "mem" | "context" => {
                let action = match words.next().map(str::to_lowercase).as_deref() {
                    None => MemoryAction::Missing,
                    Some("view") => MemoryAction::View,
                    Some("delete") => MemoryAction::Delete,
                    Some(other) => MemoryAction::Unknown(other.to_string()),
                };
                Command::Memory(action)
            }
            "slap" | "smack" | "bonk" => {
                Command::Slap((!args.is_empty()).then(|| args.to_string()))
            }
            "help" | "start" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Parses a prefixed command (`/ask@my_bot hello` → `Ask("hello")`).
///
/// Returns `None` when `text` does not start with `prefix`, names no command, or is addressed to
/// another bot (`/ask@other_bot`). An `@` suffix is accepted as is while `bot_username` is unknown.
pub fn parse_command(text: &str, prefix: &str, bot_username: Option<&str>) -> Option<Command> {
    let rest = text.trim_start().strip_prefix(prefix)?;
    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args),
        None => (rest, ""),
    };
    // Telegram appends `@botname` in groups.
    let (name, addressee) = match word.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (word, None),
    };
    if name.is_empty() {
        return None;
    }
    if let (Some(addressee), Some(username)) = (addressee, bot_username) {
        if !addressee.eq_ignore_ascii_case(username) {
            return None;
        }
    }
    Some(Command::from_parts(name, args))
}

/// Command for an inbound message: prefixed command first, then @mention or reply-to-bot as `Ask`.
pub fn parse_message(message: &Message, prefix: &str, bot_username: Option<&str>) -> Option<Command> {
    if text_has_prefix(&message.content, prefix) {
        return parse_command(&message.content, prefix, bot_username);
    }
    get_question(message, bot_username).map(Command::Ask)
}

fn text_has_prefix(text: &str, prefix: &str) -> bool {
    text.trim_start().starts_with(prefix)
}
