use crate::error::SourceError;

pub const ASSISTANT_REJECTED: &str = "I couldn't process your request. Try again!";
pub const ASSISTANT_UNAVAILABLE: &str = "Something went wrong. Please try again later!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Conversation about the study material plus the line being typed.
/// At most one question is in flight.
#[derive(Debug, Default, Clone)]
pub struct AssistantChat {
    messages: Vec<ChatMessage>,
    pending: bool,
    pub input_buffer: String,
    pub cursor_position: usize,
    /// Lines scrolled up from the newest message.
    pub scroll_from_bottom: u16,
}

impl AssistantChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Take the typed line as the next question. Blank input, or a question
    /// already waiting for an answer, leaves everything untouched.
    pub fn begin_ask(&mut self) -> Option<String> {
        if self.pending || self.input_buffer.trim().is_empty() {
            return None;
        }
        let query = self.input_buffer.trim().to_string();
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: query.clone(),
        });
        self.input_buffer.clear();
        self.cursor_position = 0;
        self.scroll_from_bottom = 0;
        self.pending = true;
        Some(query)
    }

    /// Record the answer to the pending question. A blank reply or an error
    /// status from the service reads as a rejection; anything else that
    /// failed reads as the service being unreachable.
    pub fn resolve(&mut self, result: Result<String, SourceError>) {
        if !self.pending {
            log::debug!("Dropping assistant reply with nothing pending");
            return;
        }
        self.pending = false;

        let content = match result {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => ASSISTANT_REJECTED.to_string(),
            Err(SourceError::Status { code, message }) => {
                log::warn!("Assistant request rejected ({}): {}", code, message);
                ASSISTANT_REJECTED.to_string()
            }
            Err(e) => {
                log::warn!("Assistant request failed: {}", e);
                ASSISTANT_UNAVAILABLE.to_string()
            }
        };
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content,
        });
        self.scroll_from_bottom = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> AssistantChat {
        let mut chat = AssistantChat::new();
        chat.input_buffer = text.to_string();
        chat.cursor_position = text.len();
        chat
    }

    #[test]
    fn test_begin_ask_moves_input_into_log() {
        let mut chat = typed("  what is ATP? ");
        assert_eq!(chat.begin_ask().as_deref(), Some("what is ATP?"));
        assert!(chat.is_pending());
        assert!(chat.input_buffer.is_empty());
        assert_eq!(chat.cursor_position, 0);
        assert_eq!(
            chat.messages(),
            &[ChatMessage {
                role: ChatRole::User,
                content: "what is ATP?".to_string(),
            }]
        );
    }

    #[test]
    fn test_blank_or_pending_ask_is_ignored() {
        let mut chat = typed("   ");
        assert_eq!(chat.begin_ask(), None);
        assert!(chat.messages().is_empty());

        let mut chat = typed("first");
        chat.begin_ask();
        chat.input_buffer = "second".to_string();
        assert_eq!(chat.begin_ask(), None);
        assert_eq!(chat.input_buffer, "second");
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_reply_is_appended() {
        let mut chat = typed("q");
        chat.begin_ask();
        chat.resolve(Ok(" Energy currency of the cell.\n".to_string()));
        assert!(!chat.is_pending());
        let last = chat.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, "Energy currency of the cell.");
    }

    #[test]
    fn test_fallback_texts() {
        let cases = [
            (Ok("  ".to_string()), ASSISTANT_REJECTED),
            (
                Err(SourceError::Status {
                    code: 500,
                    message: "boom".to_string(),
                }),
                ASSISTANT_REJECTED,
            ),
            (
                Err(SourceError::Transport("refused".to_string())),
                ASSISTANT_UNAVAILABLE,
            ),
            (
                Err(SourceError::Decode("not json".to_string())),
                ASSISTANT_UNAVAILABLE,
            ),
        ];
        for (result, expected) in cases {
            let mut chat = typed("q");
            chat.begin_ask();
            chat.resolve(result);
            assert_eq!(chat.messages().last().unwrap().content, expected);
            assert!(!chat.is_pending());
        }
    }

    #[test]
    fn test_reply_without_question_is_dropped() {
        let mut chat = AssistantChat::new();
        chat.resolve(Ok("stray".to_string()));
        assert!(chat.messages().is_empty());
    }
}
