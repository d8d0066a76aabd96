//! Context window sizing and the FIFO trim algorithm.
//!
//! The same [`ContextWindow`] type bounds both the per-request prompt context and the long-term
//! retention cap. Trimming always drops whole turns from the oldest end.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::Turn;

/// Estimates the token count for a text string.
pub fn estimate_tokens(text: &str) -> usize {
    ((text.len() as f64) / 4.0).ceil().max(1.0) as usize
}

/// Size metric a window limit is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    /// Every turn counts as 1.
    #[default]
    Turns,
    /// Unicode scalar values of the turn content.
    Chars,
    /// Estimated tokens, see [`estimate_tokens`].
    Tokens,
}

impl WindowUnit {
    /// Size of a single turn under this metric.
    pub fn size_of(&self, turn: &Turn) -> usize {
        match self {
            WindowUnit::Turns => 1,
            WindowUnit::Chars => turn.content.chars().count(),
            WindowUnit::Tokens => estimate_tokens(&turn.content),
        }
    }
}

impl fmt::Display for WindowUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowUnit::Turns => "turns",
            WindowUnit::Chars => "chars",
            WindowUnit::Tokens => "tokens",
        };
        f.write_str(s)
    }
}

impl FromStr for WindowUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "turns" | "turn" | "messages" => Ok(WindowUnit::Turns),
            "chars" | "characters" => Ok(WindowUnit::Chars),
            "tokens" => Ok(WindowUnit::Tokens),
            other => Err(format!("unknown window unit: {}", other)),
        }
    }
}

/// Upper bound on a sequence of turns, in a given unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub limit: usize,
    pub unit: WindowUnit,
}

impl ContextWindow {
    pub fn new(limit: usize, unit: WindowUnit) -> Self {
        Self { limit, unit }
    }

    pub fn turns(limit: usize) -> Self {
        Self::new(limit, WindowUnit::Turns)
    }

    /// Total size of `turns` under this window's unit.
    pub fn measure(&self, turns: &[Turn]) -> usize {
        turns.iter().map(|t| self.unit.size_of(t)).sum()
    }

    /// Index of the first turn to keep so the kept suffix fits the window.
    ///
    /// Drops oldest turns while the cumulative size exceeds the limit and more than one turn
    /// remains; a single oversized newest turn is kept alone.
    pub fn trim_start(&self, turns: &[Turn]) -> usize {
        let mut total = self.measure(turns);
        let mut start = 0;
        while total > self.limit && turns.len() - start > 1 {
            total -= self.unit.size_of(&turns[start]);
            start += 1;
        }
        start
    }

    /// The newest suffix of `turns` that fits the window.
    pub fn trim<'a>(&self, turns: &'a [Turn]) -> &'a [Turn] {
        &turns[self.trim_start(turns)..]
    }

    /// Number of newest turns to retain, as consumed by `MemoryStore::append_many`.
    pub fn retain_count(&self, turns: &[Turn]) -> usize {
        turns.len() - self.trim_start(turns)
    }
}

impl fmt::Display for ContextWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.limit, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(contents: &[&str]) -> Vec<Turn> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| if i % 2 == 0 { Turn::user(*c) } else { Turn::assistant(*c) })
            .collect()
    }

    fn contents(turns: &[Turn]) -> Vec<&str> {
        turns.iter().map(|t| t.content.as_str()).collect()
    }

    #[test]
    fn test_estimate_tokens_coverage() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("x"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("Hello world"), 3);
    }

    #[test]
    fn test_turn_window_keeps_newest_four() {
        let history = turns(&["u1", "a1", "u2", "a2", "u3", "a3"]);
        let window = ContextWindow::turns(4);
        assert_eq!(contents(window.trim(&history)), vec!["u2", "a2", "u3", "a3"]);
    }

    #[test]
    fn test_window_larger_than_history_keeps_everything() {
        let history = turns(&["u1", "a1"]);
        assert_eq!(ContextWindow::turns(10).trim(&history).len(), 2);
    }

    #[test]
    fn test_empty_history_trims_to_empty() {
        let history: Vec<Turn> = Vec::new();
        assert!(ContextWindow::turns(3).trim(&history).is_empty());
        assert_eq!(ContextWindow::turns(3).retain_count(&history), 0);
    }

    #[test]
    fn test_char_window_never_cuts_mid_turn() {
        let history = turns(&["aaaa", "bbbb", "cc"]);
        let window = ContextWindow::new(7, WindowUnit::Chars);
        let kept = window.trim(&history);
        assert_eq!(contents(kept), vec!["bbbb", "cc"]);
        assert!(window.measure(kept) <= 7);
    }

    #[test]
    fn test_single_oversized_turn_is_kept_alone() {
        let history = turns(&["short", "this one is far longer than the limit"]);
        let window = ContextWindow::new(5, WindowUnit::Chars);
        let kept = window.trim(&history);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "this one is far longer than the limit");
    }

    #[test]
    fn test_token_window_uses_estimate() {
        // 8 bytes -> 2 tokens each
        let history = turns(&["abcdefgh", "abcdefgh", "abcdefgh"]);
        let window = ContextWindow::new(4, WindowUnit::Tokens);
        assert_eq!(window.trim(&history).len(), 2);
        assert_eq!(window.retain_count(&history), 2);
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("Turns".parse::<WindowUnit>().unwrap(), WindowUnit::Turns);
        assert_eq!("chars".parse::<WindowUnit>().unwrap(), WindowUnit::Chars);
        assert_eq!("tokens".parse::<WindowUnit>().unwrap(), WindowUnit::Tokens);
        assert!("bytes".parse::<WindowUnit>().is_err());
    }
}
