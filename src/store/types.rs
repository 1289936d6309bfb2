//! Session and message types for the inquiry store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to a session before its first user message arrives
pub const NEW_CHAT_TITLE: &str = "new chat";

/// Maximum title length before truncation
pub const TITLE_MAX_CHARS: usize = 20;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person answering inquiry questions
    User,
    /// The remote inquiry assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Reference to an image the user uploaded during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Where the image can be fetched or displayed from
    pub url: String,
    /// Original file name
    pub name: String,
}

/// One turn of an inquiry conversation
///
/// Messages are owned by their parent [`ChatSession`] and never exist
/// independently. The id is a ULID assigned by the store at insertion,
/// so ids within a session sort by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (ULID, time-ordered)
    pub id: String,

    /// Message author
    pub role: Role,

    /// Message text
    pub content: String,

    /// Creation time
    pub timestamp: DateTime<Utc>,

    /// Selectable answer options offered by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Whether the inquiry concluded with this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<bool>,

    /// Final answer text, present on the concluding turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,

    /// Preview of the retrieved context the assistant consulted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_context_preview: Option<String>,

    /// Whether the next turn expects a file upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_file_upload: Option<bool>,

    /// Free-form detail text associated with the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_detail: Option<String>,

    /// Whether the streaming-reveal animation has already played,
    /// so it is not replayed after a restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_played_streaming_animation: Option<bool>,

    /// Image uploaded with this turn, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_image: Option<UploadedImage>,

    /// Option the user picked, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,

    /// Whether the option buttons have been disabled after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_options_disabled: Option<bool>,

    /// Whether the free-text "other" input is shown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_other_input: Option<bool>,

    /// Content of the free-text "other" input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_input: Option<String>,

    /// Label of the "other" option as presented
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_option_text: Option<String>,

    /// Whether a file has been uploaded for this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_file_uploaded: Option<bool>,
}

/// Fields for a message about to be appended
///
/// The store assigns id and timestamp at insertion; everything else is
/// supplied here. Defaults leave all optional fields unset.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub role: Role,
    pub content: String,
    pub options: Vec<String>,
    pub is_finished: Option<bool>,
    pub final_answer: Option<String>,
    pub retrieved_context_preview: Option<String>,
    pub requires_file_upload: Option<bool>,
    pub llm_detail: Option<String>,
    pub uploaded_image: Option<UploadedImage>,
}

impl Default for MessageDraft {
    fn default() -> Self {
        Self {
            role: Role::User,
            content: String::new(),
            options: Vec::new(),
            is_finished: None,
            final_answer: None,
            retrieved_context_preview: None,
            requires_file_upload: None,
            llm_detail: None,
            uploaded_image: None,
        }
    }
}

impl MessageDraft {
    /// Draft a plain user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Draft a plain assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Partial update of a message's transient UI state
///
/// Only fields set to `Some` are applied; the rest are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ButtonState {
    pub selected_option: Option<String>,
    pub is_options_disabled: Option<bool>,
    pub show_other_input: Option<bool>,
    pub other_input: Option<String>,
    pub other_option_text: Option<String>,
    pub is_file_uploaded: Option<bool>,
}

/// One continuous inquiry conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Opaque identifier issued by the remote service
    pub id: String,

    /// Display title, derived from the first user message
    pub title: String,

    /// Turns in insertion order
    pub messages: Vec<Message>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Truncate a title source string per the title rule
///
/// Strings of at most [`TITLE_MAX_CHARS`] characters are kept verbatim;
/// longer ones keep the first [`TITLE_MAX_CHARS`] characters followed
/// by an ellipsis marker. Counts characters, not bytes, so multi-byte
/// input never splits a code point.
///
/// # Examples
///
/// ```
/// use medquiry::store::truncate_title;
///
/// assert_eq!(truncate_title("Headache"), "Headache");
/// assert_eq!(
///     truncate_title("I have had a persistent cough for two weeks"),
///     "I have had a persist..."
/// );
/// ```
pub fn truncate_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_truncate_title_short_verbatim() {
        assert_eq!(truncate_title("Headache"), "Headache");
        let exactly_twenty = "a".repeat(20);
        assert_eq!(truncate_title(&exactly_twenty), exactly_twenty);
    }

    #[test]
    fn test_truncate_title_long_gets_ellipsis() {
        let long = "a".repeat(21);
        let truncated = truncate_title(&long);
        assert_eq!(truncated, format!("{}...", "a".repeat(20)));
        assert_eq!(truncated.chars().count(), 23);
    }

    #[test]
    fn test_truncate_title_multibyte_safe() {
        let long = "疼".repeat(25);
        let truncated = truncate_title(&long);
        assert_eq!(truncated, format!("{}...", "疼".repeat(20)));
    }

    #[test]
    fn test_message_optional_fields_skipped_in_json() {
        let message = Message {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            role: Role::Assistant,
            content: "What are your symptoms?".to_string(),
            timestamp: Utc::now(),
            options: Vec::new(),
            is_finished: None,
            final_answer: None,
            retrieved_context_preview: None,
            requires_file_upload: None,
            llm_detail: None,
            has_played_streaming_animation: None,
            uploaded_image: None,
            selected_option: None,
            is_options_disabled: None,
            show_other_input: None,
            other_input: None,
            other_option_text: None,
            is_file_uploaded: None,
        };

        let json = serde_json::to_value(&message).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("options"));
        assert!(!obj.contains_key("is_finished"));
        assert!(!obj.contains_key("uploaded_image"));
        assert!(obj.contains_key("content"));
    }

    #[test]
    fn test_message_draft_constructors() {
        let draft = MessageDraft::user("Headache");
        assert_eq!(draft.role, Role::User);
        assert_eq!(draft.content, "Headache");
        assert!(draft.options.is_empty());

        let draft = MessageDraft::assistant("How long has it lasted?");
        assert_eq!(draft.role, Role::Assistant);
    }
}
