//! Session store with local persistence
//!
//! Owns the list of chat sessions and the current-session pointer,
//! synchronizing the full state to an embedded `sled` key-value
//! database after every mutation. Derived views (current session,
//! sessions by recency) are recomputed on demand; there is no hidden
//! reactivity.

use crate::error::{MedquiryError, Result};
use chrono::Utc;
use directories::ProjectDirs;
use sled::Db;
use std::path::{Path, PathBuf};
use ulid::Ulid;

pub mod types;
pub use types::{
    truncate_title, ButtonState, ChatSession, Message, MessageDraft, Role, UploadedImage,
    NEW_CHAT_TITLE, TITLE_MAX_CHARS,
};

/// Key under which the serialized session list is stored
const SESSIONS_KEY: &str = "inquiry-sessions";

/// Key under which the current session id is stored (empty means none)
const CURRENT_SESSION_KEY: &str = "inquiry-current-session";

/// Session store backed by an embedded key-value database
///
/// All mutating operations write the full state back to disk before
/// returning, so a crash can lose at most the mutation in flight and
/// never corrupts the in-memory structure.
///
/// # Examples
///
/// ```
/// use medquiry::store::{MessageDraft, SessionStore};
///
/// # fn main() -> medquiry::error::Result<()> {
/// # let dir = tempfile::TempDir::new().unwrap();
/// let mut store = SessionStore::open(dir.path())?;
/// store.create_session("s1", "What are your symptoms?")?;
/// store.add_message("s1", MessageDraft::user("Headache"))?;
///
/// let session = store.current_session().unwrap();
/// assert_eq!(session.title, "Headache");
/// assert_eq!(session.messages.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct SessionStore {
    db: Db,
    sessions: Vec<ChatSession>,
    current_session_id: Option<String>,
}

impl SessionStore {
    /// Open or create a session store at the given directory
    ///
    /// Previously persisted state is restored; unreadable state is
    /// logged and discarded, starting empty.
    ///
    /// # Errors
    ///
    /// Returns `MedquiryError::Storage` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)
            .map_err(|e| MedquiryError::Storage(format!("Failed to open database: {}", e)))?;

        let mut store = Self {
            db,
            sessions: Vec::new(),
            current_session_id: None,
        };
        store.restore();

        Ok(store)
    }

    /// Open the store in the platform data directory
    ///
    /// The location can be overridden with the `MEDQUIRY_STORE_DIR`
    /// environment variable, which is convenient for tests and for
    /// pointing the binary at an alternate history.
    ///
    /// # Errors
    ///
    /// Returns `MedquiryError::Storage` if no data directory can be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        if let Ok(override_dir) = std::env::var("MEDQUIRY_STORE_DIR") {
            return Self::open(PathBuf::from(override_dir));
        }

        let proj_dirs = ProjectDirs::from("com", "medquiry", "medquiry")
            .ok_or_else(|| MedquiryError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| MedquiryError::Storage(format!("Failed to create data directory: {}", e)))?;

        Self::open(data_dir.join("sessions.db"))
    }

    /// Create a new session and make it current
    ///
    /// Synthesizes the opening assistant message from the initial
    /// question and inserts the session at the front of the list. The
    /// title stays "new chat" until the first user message arrives.
    ///
    /// # Arguments
    ///
    /// * `id` - Opaque session id issued by the remote service
    /// * `initial_question` - The assistant's opening question
    pub fn create_session(&mut self, id: &str, initial_question: &str) -> Result<()> {
        let now = Utc::now();
        let session = ChatSession {
            id: id.to_string(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: vec![Message {
                id: new_message_id(),
                role: Role::Assistant,
                content: initial_question.to_string(),
                timestamp: now,
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
            }],
            created_at: now,
        };

        self.sessions.insert(0, session);
        self.current_session_id = Some(id.to_string());
        self.persist()
    }

    /// Set a session's title, truncating per the title rule
    ///
    /// No-op when the session is unknown.
    pub fn update_title(&mut self, id: &str, text: &str) -> Result<()> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(());
        };
        session.title = truncate_title(text);
        self.persist()
    }

    /// Append a message to a session
    ///
    /// Assigns the message id and timestamp. The first user message on
    /// a still-untitled session re-titles it from the message content.
    /// Returns the stored message, or `None` when the session is
    /// unknown (in which case nothing is written).
    pub fn add_message(&mut self, id: &str, draft: MessageDraft) -> Result<Option<Message>> {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        // Clock regressions must not reorder messages within a session
        let timestamp = match session.messages.last() {
            Some(prev) if prev.timestamp > now => prev.timestamp,
            _ => now,
        };

        let message = Message {
            id: new_message_id(),
            role: draft.role,
            content: draft.content,
            timestamp,
            options: draft.options,
            is_finished: draft.is_finished,
            final_answer: draft.final_answer,
            retrieved_context_preview: draft.retrieved_context_preview,
            requires_file_upload: draft.requires_file_upload,
            llm_detail: draft.llm_detail,
            has_played_streaming_animation: None,
            uploaded_image: draft.uploaded_image,
            selected_option: None,
            is_options_disabled: None,
            show_other_input: None,
            other_input: None,
            other_option_text: None,
            is_file_uploaded: None,
        };

        session.messages.push(message.clone());

        if message.role == Role::User && session.title == NEW_CHAT_TITLE {
            session.title = truncate_title(&message.content);
        }

        self.persist()?;
        Ok(Some(message))
    }

    /// Point the store at a different session
    ///
    /// No existence check is made; a dangling id simply yields no
    /// current session.
    pub fn set_current(&mut self, id: &str) -> Result<()> {
        self.current_session_id = Some(id.to_string());
        self.persist()
    }

    /// Delete a session
    ///
    /// When the deleted session was current, the most recently created
    /// remaining session becomes current, or none when the list is
    /// empty. Unknown ids are a no-op.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            return Ok(());
        };
        self.sessions.remove(index);

        if self.current_session_id.as_deref() == Some(id) {
            self.current_session_id = self
                .sessions
                .iter()
                .max_by_key(|s| s.created_at)
                .map(|s| s.id.clone());
        }

        self.persist()
    }

    /// Record whether a message's streaming-reveal animation has played
    ///
    /// Silent no-op when either the session or the message is unknown.
    pub fn update_streaming_flag(
        &mut self,
        session_id: &str,
        message_id: &str,
        played: bool,
    ) -> Result<()> {
        let Some(message) = self.find_message_mut(session_id, message_id) else {
            return Ok(());
        };
        message.has_played_streaming_animation = Some(played);
        self.persist()
    }

    /// Apply a partial update to a message's transient UI state
    ///
    /// Only fields set in `state` are written. Silent no-op when either
    /// the session or the message is unknown.
    pub fn update_button_state(
        &mut self,
        session_id: &str,
        message_id: &str,
        state: ButtonState,
    ) -> Result<()> {
        let Some(message) = self.find_message_mut(session_id, message_id) else {
            return Ok(());
        };

        if let Some(selected) = state.selected_option {
            message.selected_option = Some(selected);
        }
        if let Some(disabled) = state.is_options_disabled {
            message.is_options_disabled = Some(disabled);
        }
        if let Some(show) = state.show_other_input {
            message.show_other_input = Some(show);
        }
        if let Some(input) = state.other_input {
            message.other_input = Some(input);
        }
        if let Some(text) = state.other_option_text {
            message.other_option_text = Some(text);
        }
        if let Some(uploaded) = state.is_file_uploaded {
            message.is_file_uploaded = Some(uploaded);
        }

        self.persist()
    }

    fn find_message_mut(&mut self, session_id: &str, message_id: &str) -> Option<&mut Message> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)?
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
    }

    /// Serialize the full session list and current id to the database
    ///
    /// # Errors
    ///
    /// Returns `MedquiryError::Storage` if serialization or the write
    /// fails
    pub fn persist(&self) -> Result<()> {
        let sessions_json = serde_json::to_vec(&self.sessions)
            .map_err(|e| MedquiryError::Storage(format!("Serialization failed: {}", e)))?;

        self.db
            .insert(SESSIONS_KEY, sessions_json)
            .map_err(|e| MedquiryError::Storage(format!("Insert failed: {}", e)))?;

        let current = self.current_session_id.as_deref().unwrap_or("");
        self.db
            .insert(CURRENT_SESSION_KEY, current)
            .map_err(|e| MedquiryError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| MedquiryError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// Reload state from the database
    ///
    /// Any read or parse failure is logged and swallowed, leaving the
    /// in-memory state as it was.
    pub fn restore(&mut self) {
        match self.db.get(SESSIONS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<ChatSession>>(&bytes) {
                Ok(sessions) => self.sessions = sessions,
                Err(e) => {
                    tracing::warn!("Failed to parse persisted sessions: {}", e);
                    return;
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to read persisted sessions: {}", e);
                return;
            }
        }

        match self.db.get(CURRENT_SESSION_KEY) {
            Ok(Some(bytes)) => {
                let id = String::from_utf8_lossy(&bytes);
                self.current_session_id = if id.is_empty() {
                    None
                } else {
                    Some(id.into_owned())
                };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to read current session id: {}", e);
            }
        }
    }

    /// Delete all sessions and both persisted keys
    pub fn clear(&mut self) -> Result<()> {
        self.sessions.clear();
        self.current_session_id = None;

        self.db
            .remove(SESSIONS_KEY)
            .map_err(|e| MedquiryError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .remove(CURRENT_SESSION_KEY)
            .map_err(|e| MedquiryError::Storage(format!("Remove failed: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| MedquiryError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// All sessions in insertion order (newest first)
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Id of the current session, if one is set
    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    /// The session the current pointer resolves to, if any
    pub fn current_session(&self) -> Option<&ChatSession> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Sessions ordered by creation time, newest first
    ///
    /// The sort is stable and does not mutate the underlying list.
    pub fn sorted_sessions(&self) -> Vec<&ChatSession> {
        let mut sorted: Vec<&ChatSession> = self.sessions.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

/// Generate a new ULID for a message
///
/// ULIDs are sortable by timestamp, so message ids within a session
/// reflect creation order while staying unique even within the same
/// millisecond.
pub fn new_message_id() -> String {
    Ulid::new().to_string()
}
