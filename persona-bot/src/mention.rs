//! Pure functions for @-mention detection and question extraction.

use crate::core::Message;

/// Telegram usernames are `[A-Za-z0-9_]`; any other byte ends one.
fn is_username_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offset of the first case-insensitive occurrence of `mention` in `text` that is not the
/// prefix of a longer username (`@bot` does not match inside `@bot2`).
fn find_mention(text: &str, mention: &str) -> Option<usize> {
    text.char_indices().map(|(i, _)| i).find(|&i| {
        let end = i + mention.len();
        text.get(i..end)
            .is_some_and(|s| s.eq_ignore_ascii_case(mention))
            && !text.as_bytes().get(end).copied().is_some_and(is_username_byte)
    })
}

/// Returns true if `text` contains a @mention of the given bot username (case-insensitive).
#[inline]
pub fn is_bot_mentioned(text: &str, bot_username: &str) -> bool {
    find_mention(text, &format!("@{}", bot_username)).is_some()
}

/// Strips every @mention of the bot from `text` and returns the remainder with whitespace collapsed.
pub fn extract_question(text: &str, bot_username: &str) -> String {
    let mention = format!("@{}", bot_username);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_mention(rest, &mention) {
        out.push_str(&rest[..pos]);
        out.push(' ');
        rest = &rest[pos + mention.len()..];
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves the question when a message without a command prefix is addressed to the bot.
///
/// - **Reply to one of the bot's messages**: the whole text.
/// - **@mention**: the text with the mention removed (may be empty).
/// - Otherwise `None`.
pub fn get_question(message: &Message, bot_username: Option<&str>) -> Option<String> {
    if message.reply_to_message_id.is_some() && message.reply_to_message_from_bot {
        return Some(message.content.trim().to_string());
    }
    let username = bot_username?;
    if is_bot_mentioned(&message.content, username) {
        return Some(extract_question(&message.content, username));
    }
    None
}
