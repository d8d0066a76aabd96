//! User-facing reply texts and message splitting.

use crate::personality::{Personality, PersonalityCatalog};

/// Longest chunk sent in one Telegram message (the API limit is 4096).
pub const MAX_MESSAGE_CHARS: usize = 4000;

pub const INFERENCE_FAILED: &str = "Sorry, I couldn't generate a response. Please try again later.";
pub const STORAGE_FAILED: &str = "Sorry, I couldn't access my memory just now. Please try again later.";
pub const SLAP_FALLBACK: &str = "Ow. That hurt more than usual. 🥲";
pub const RESET_DONE: &str =
    "Your conversation history has been reset. You're starting with a clean slate!";
pub const MEMORY_DELETED: &str =
    "Your conversation memory has been deleted. All your data has been removed from the bot.";

/// Splits `text` into chunks of at most `max_chars` characters, never inside a character.
/// Prefers breaking after a newline when one falls in the second half of a chunk.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.chars().count() > max_chars {
        let hard_end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..hard_end];
        let end = match window.rfind('\n') {
            Some(nl) if window[..nl].chars().count() >= max_chars / 2 => nl + 1,
            _ => hard_end,
        };
        chunks.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

pub fn ask_usage(prefix: &str) -> String {
    format!(
        "Please provide a message. Example: {}ask What is the capital of France?",
        prefix
    )
}

pub fn unknown_command(name: &str, prefix: &str) -> String {
    format!(
        "Unknown command: {}. Try {}ask <message> to talk to me.",
        name, prefix
    )
}

pub fn help_text(prefix: &str) -> String {
    let p = prefix;
    format!(
        "Commands:\n\
         {p}ask <message> (also {p}chat, {p}talk): talk to me\n\
         {p}reset (also {p}clear): forget our conversation\n\
         {p}personality list | set <name> | current (also {p}persona): manage my personality\n\
         {p}memory view | delete (also {p}mem, {p}context): see or delete what I remember\n\
         {p}slap [target] (also {p}smack, {p}bonk): find out\n\
         {p}help: this message\n\n\
         You can also mention me or reply to one of my messages instead of using {p}ask."
    )
}

pub fn personality_subcommand_missing() -> String {
    "Please provide a subcommand. Available subcommands: list, set, current".to_string()
}

pub fn personality_subcommand_unknown(sub: &str) -> String {
    format!(
        "Unknown subcommand: {}. Available subcommands: list, set, current",
        sub
    )
}

pub fn personality_name_missing(prefix: &str) -> String {
    format!(
        "Please provide a personality name. Example: {}personality set coding_tutor",
        prefix
    )
}

pub fn personality_unknown(name: &str, prefix: &str) -> String {
    format!(
        "Unknown personality: {}. Use {}personality list to see available personalities.",
        name, prefix
    )
}

pub fn personality_set(profile: &Personality) -> String {
    format!(
        "Your personality has been set to {}. Future responses will use this personality.",
        profile.display_name
    )
}

/// One block per profile: display name, id, first 100 characters of the prompt.
pub fn personality_list(catalog: &PersonalityCatalog) -> String {
    let entries = catalog
        .profiles()
        .map(|p| {
            let preview: String = p.system_prompt.chars().take(100).collect();
            let ellipsis = if p.system_prompt.chars().count() > 100 { "..." } else { "" };
            format!(
                "{}\nID: {}\nDescription: {}{}",
                p.display_name, p.name, preview, ellipsis
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Available personalities:\n\n{}", entries)
}

pub fn personality_current(profile: &Personality) -> String {
    format!(
        "You are currently using the {} personality.\n\nDescription: {}\nID: {}",
        profile.display_name, profile.system_prompt, profile.name
    )
}

pub fn memory_subcommand_missing() -> String {
    "Please provide a subcommand. Available subcommands: view, delete".to_string()
}

pub fn memory_subcommand_unknown(sub: &str) -> String {
    format!("Unknown subcommand: {}. Available subcommands: view, delete", sub)
}

pub fn memory_empty(prefix: &str) -> String {
    format!(
        "You don't have any conversation history yet. Try talking to me with {}ask first!",
        prefix
    )
}

pub fn memory_view(transcript: &str) -> String {
    format!("Here's what I remember from our conversation:\n\n{}", transcript)
}
