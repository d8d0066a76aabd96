//! Unit tests for prompt assembly.
//!
//! External interactions: none (pure function tests).

use prompt::{build_messages, format_system_message, format_transcript, ChatMessage, MessageRole};

/// **Test: system first, history in order, current question last.**
#[test]
fn build_messages_orders_system_history_current() {
    let history = vec![ChatMessage::user("u1"), ChatMessage::assistant("a1")];
    let messages = build_messages("sys", history, "u2");

    let roles: Vec<MessageRole> = messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User
        ]
    );
    assert_eq!(messages[0].content, "sys");
    assert_eq!(messages[3].content, "u2");
}

/// **Test: with no history the sequence is just system + current.**
#[test]
fn build_messages_without_history() {
    let messages = build_messages("sys", Vec::new(), "hello");
    assert_eq!(messages, vec![ChatMessage::system("sys"), ChatMessage::user("hello")]);
}

/// **Test: stray system messages in history are dropped.**
#[test]
fn build_messages_drops_history_system_messages() {
    let history = vec![ChatMessage::system("old persona"), ChatMessage::user("u1")];
    let messages = build_messages("new persona", history, "u2");
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .count(),
        1
    );
}

/// **Test: system message carries the personality header and optional username.**
#[test]
fn system_message_format() {
    assert_eq!(
        format_system_message("Pirate", "Talk like a pirate.", None),
        "Personality: Pirate\n\nTalk like a pirate."
    );
    let with_name = format_system_message("Pirate", "Talk like a pirate.", Some("Ann"));
    assert!(with_name.ends_with("The current user you're talking to is named Ann."));
    let blank_name = format_system_message("Pirate", "Talk like a pirate.", Some("  "));
    assert!(!blank_name.contains("named"));
}

/// **Test: transcript labels user and bot turns and skips system.**
#[test]
fn transcript_labels_roles() {
    let messages = vec![
        ChatMessage::system("hidden"),
        ChatMessage::user("hi"),
        ChatMessage::assistant("hello"),
    ];
    assert_eq!(format_transcript(&messages), "You: hi\n\nBot: hello");
}
