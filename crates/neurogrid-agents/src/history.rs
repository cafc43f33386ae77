//! Conversation history - windowing and rendering for the backends

use neurogrid_llm::Message;
use serde::{Deserialize, Serialize};

use crate::persona::Persona;

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One exchange entry as the chat widget sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The most recent `limit` non-blank turns, oldest first
pub fn trailing(history: &[ChatTurn], limit: usize) -> Vec<&ChatTurn> {
    let mut recent: Vec<&ChatTurn> = history
        .iter()
        .rev()
        .filter(|turn| !turn.content.trim().is_empty())
        .take(limit)
        .collect();
    recent.reverse();
    recent
}

/// Chat messages for a tool-capable backend
pub fn to_messages(turns: &[&ChatTurn]) -> Vec<Message> {
    turns
        .iter()
        .map(|turn| match turn.role {
            ChatRole::User => Message::user(turn.content.trim()),
            ChatRole::Assistant => Message::assistant(turn.content.trim()),
        })
        .collect()
}

/// `Speaker: content` lines, the agent speaking under its display name
pub fn render_transcript(turns: &[&ChatTurn], persona: &Persona) -> String {
    turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => persona.display_name,
            };
            format!("{}: {}", speaker, turn.content.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single prompt for a plain text backend
pub fn plain_prompt(persona: &Persona, turns: &[&ChatTurn], message: &str) -> String {
    if turns.is_empty() {
        format!("User: {}\n\n{}:", message, persona.display_name)
    } else {
        format!(
            "Conversation context:\n{}\n\nUser: {}\n\n{}:",
            render_transcript(turns, persona),
            message,
            persona.display_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::AgentId;
    use neurogrid_llm::MessageRole;

    fn history() -> Vec<ChatTurn> {
        (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("q{}", i))
                } else {
                    ChatTurn::assistant(format!("a{}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_trailing_keeps_most_recent_in_order() {
        let history = history();
        let recent = trailing(&history, 4);
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q6", "a7", "q8", "a9"]);
    }

    #[test]
    fn test_trailing_shorter_than_limit() {
        let history = vec![ChatTurn::user("only")];
        assert_eq!(trailing(&history, 6).len(), 1);
        assert!(trailing(&[], 6).is_empty());
    }

    #[test]
    fn test_trailing_skips_blank_turns() {
        let history = vec![
            ChatTurn::user("first"),
            ChatTurn::assistant("   "),
            ChatTurn::user("second"),
        ];
        let recent = trailing(&history, 2);
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_render_uses_display_name() {
        let history = vec![ChatTurn::user("eth?"), ChatTurn::assistant("bullish")];
        let turns = trailing(&history, 6);
        assert_eq!(
            render_transcript(&turns, AgentId::Cto.persona()),
            "User: eth?\nCTO: bullish"
        );
    }

    #[test]
    fn test_plain_prompt_with_and_without_context() {
        let prime = AgentId::Prime.persona();
        assert_eq!(plain_prompt(prime, &[], "sup with sol"), "User: sup with sol\n\nPrime:");

        let history = vec![ChatTurn::user("btc?"), ChatTurn::assistant("ranging")];
        let turns = trailing(&history, 6);
        assert_eq!(
            plain_prompt(prime, &turns, "and eth?"),
            "Conversation context:\nUser: btc?\nPrime: ranging\n\nUser: and eth?\n\nPrime:"
        );
    }

    #[test]
    fn test_to_messages_maps_roles() {
        let history = vec![ChatTurn::user("a"), ChatTurn::assistant("b")];
        let messages = to_messages(&trailing(&history, 8));
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
    }
}
