//! Command surface: parsing, execution and reply formatting.

mod handler;
mod parser;
pub mod reply;

pub use handler::CommandHandler;
pub use parser::{parse_command, parse_message, Command, MemoryAction, PersonalityAction};
