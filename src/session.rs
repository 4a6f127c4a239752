//! In-memory chat session store
//!
//! Holds every chat session of the running client together with the
//! selection and title-editing state. Sessions are kept newest first, the
//! same order the session list is displayed in. Nothing here is persisted:
//! all state is dropped when the process exits.
//!
//! Identifiers come from a monotonic ULID generator owned by the store, so
//! sessions and messages created within the same millisecond still get
//! distinct, ordered ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::{Generator, Ulid};

/// Title given to a session before any content has named it
pub const DEFAULT_TITLE: &str = "New Chat";

/// Number of characters kept when a title is derived from a message
pub const TITLE_MAX_CHARS: usize = 30;

/// Characters of a session id shown in listings
const SHORT_ID_CHARS: usize = 8;

/// Opaque identifier of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Ulid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SessionId {
    /// Short form used in listings (last 8 characters of the ULID)
    ///
    /// The leading characters encode the creation time and repeat across
    /// sessions created close together; the tail comes from the random part.
    pub fn short(&self) -> String {
        let full = self.0.to_string();
        full[full.len() - SHORT_ID_CHARS..].to_string()
    }
}

/// Opaque identifier of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Ulid);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person using the client
    User,
    /// Produced by the assistant, including synthesized error notices
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single chat message
///
/// Messages are immutable once created; the store hands out shared
/// references only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Message identifier
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Message text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Who wrote the message
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// When the message was created
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One conversation thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    title: String,
    messages: Vec<Message>,
    last_message: DateTime<Utc>,
}

impl ChatSession {
    /// Session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Committed title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Messages in conversation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Time of the most recent append (creation time for an empty session)
    pub fn last_message(&self) -> DateTime<Utc> {
        self.last_message
    }

    /// Whether the session has no messages yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Where a derived title comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource<'a> {
    /// The text of the first message sent in the session
    Message(&'a str),
    /// The name of the first file uploaded in the session
    Upload(&'a str),
}

/// In-progress title edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEdit {
    /// Session whose title is being edited
    pub session_id: SessionId,
    /// Uncommitted title text
    pub draft: String,
}

/// Build a session title from message text
///
/// Text longer than [`TITLE_MAX_CHARS`] characters is cut to that many
/// characters and suffixed with `"..."`. Shorter text is returned unchanged.
///
/// # Examples
///
/// ```
/// use sonia::session::title_from_text;
///
/// assert_eq!(title_from_text("Hello"), "Hello");
/// assert_eq!(
///     title_from_text("What does chapter three say about retries?"),
///     "What does chapter three say ab..."
/// );
/// ```
pub fn title_from_text(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let head: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Build the title used for a session that starts with an upload
pub fn title_from_upload(filename: &str) -> String {
    format!("Chat about {}", filename)
}

/// Owned collection of chat sessions plus selection and edit state
///
/// # Examples
///
/// ```
/// use sonia::session::{SessionStore, Sender};
///
/// let mut store = SessionStore::new();
/// let id = store.create_session();
/// let message = store.new_message(Sender::User, "Hello");
/// assert!(store.append_message(id, message));
/// assert_eq!(store.current().unwrap().messages().len(), 1);
/// ```
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current: Option<SessionId>,
    editing: Option<TitleEdit>,
    ids: Generator,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions)
            .field("current", &self.current)
            .field("editing", &self.editing)
            .finish_non_exhaustive()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create an empty store with nothing selected
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            current: None,
            editing: None,
            ids: Generator::new(),
        }
    }

    fn next_ulid(&mut self) -> Ulid {
        // The generator only fails when the random part overflows within a
        // single millisecond; a fresh random ULID is still unique there.
        self.ids.generate().unwrap_or_else(|_| Ulid::new())
    }

    /// Insert a new, empty session at the front of the list and select it
    pub fn create_session(&mut self) -> SessionId {
        let id = SessionId(self.next_ulid());
        self.sessions.insert(
            0,
            ChatSession {
                id,
                title: DEFAULT_TITLE.to_string(),
                messages: Vec::new(),
                last_message: Utc::now(),
            },
        );
        self.current = Some(id);
        tracing::debug!(session = %id, "Created chat session");
        id
    }

    /// Make `id` the current session
    ///
    /// Returns `false` and leaves the selection alone when `id` is unknown.
    pub fn select_session(&mut self, id: SessionId) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(session = %id, "Ignoring selection of unknown session");
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Remove a session
    ///
    /// When the removed session was current, the first remaining session
    /// becomes current, or nothing when the list is now empty. Returns
    /// whether a session was removed.
    pub fn delete_session(&mut self, id: SessionId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.sessions.remove(index);

        if self.current == Some(id) {
            self.current = self.sessions.first().map(|session| session.id);
        }
        if self.editing.as_ref().map(|edit| edit.session_id) == Some(id) {
            self.editing = None;
        }

        tracing::debug!(session = %id, remaining = self.sessions.len(), "Deleted chat session");
        true
    }

    /// Commit a new title for a session
    ///
    /// The title is trimmed first; an empty result is rejected without
    /// touching the committed title. Edit state is cleared either way.
    /// Returns whether the title changed.
    pub fn rename_session(&mut self, id: SessionId, title: &str) -> bool {
        self.editing = None;

        let trimmed = title.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self.get_mut(id) {
            Some(session) => {
                session.title = trimmed.to_string();
                true
            }
            None => false,
        }
    }

    /// Start editing the title of `id`, seeding the draft with its title
    ///
    /// Any other edit in progress is abandoned. Returns `false` for an
    /// unknown session.
    pub fn begin_edit(&mut self, id: SessionId) -> bool {
        let Some(session) = self.get(id) else {
            return false;
        };
        self.editing = Some(TitleEdit {
            session_id: id,
            draft: session.title.clone(),
        });
        true
    }

    /// Replace the draft of the edit in progress, if any
    pub fn set_draft(&mut self, text: &str) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = text.to_string();
        }
    }

    /// Commit the edit in progress through [`SessionStore::rename_session`]
    pub fn commit_edit(&mut self) -> bool {
        match self.editing.take() {
            Some(edit) => self.rename_session(edit.session_id, &edit.draft),
            None => false,
        }
    }

    /// Abandon the edit in progress without touching any title
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// The edit in progress, if any
    pub fn editing(&self) -> Option<&TitleEdit> {
        self.editing.as_ref()
    }

    /// Create a message stamped with a fresh id and the current time
    pub fn new_message(&mut self, sender: Sender, content: impl Into<String>) -> Message {
        Message {
            id: MessageId(self.next_ulid()),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    /// Append a message to a session and refresh its activity time
    ///
    /// A session id that no longer exists is tolerated: nothing happens and
    /// `false` is returned.
    pub fn append_message(&mut self, id: SessionId, message: Message) -> bool {
        let Some(session) = self.get_mut(id) else {
            tracing::debug!(session = %id, "Dropping message for missing session");
            return false;
        };
        let stamp = message.timestamp.max(Utc::now());
        session.last_message = session.last_message.max(stamp);
        session.messages.push(message);
        true
    }

    /// Name a session after its first content
    ///
    /// Only applies while the session has no messages; once anything has
    /// been appended the title is left to the user. Returns whether the
    /// title was set.
    pub fn derive_title(&mut self, id: SessionId, source: TitleSource<'_>) -> bool {
        let Some(session) = self.get_mut(id) else {
            return false;
        };
        if !session.messages.is_empty() {
            return false;
        }
        self.apply_title(id, source)
    }

    /// Name a session after its content regardless of its messages
    ///
    /// Used when emptiness was decided earlier, e.g. when an upload started.
    /// Returns `false` for an unknown session.
    pub fn apply_title(&mut self, id: SessionId, source: TitleSource<'_>) -> bool {
        let Some(session) = self.get_mut(id) else {
            return false;
        };
        session.title = match source {
            TitleSource::Message(text) => title_from_text(text),
            TitleSource::Upload(filename) => title_from_upload(filename),
        };
        true
    }

    /// Sessions in display order (newest first)
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Identifier of the current session
    pub fn current_id(&self) -> Option<SessionId> {
        self.current
    }

    /// The current session
    pub fn current(&self) -> Option<&ChatSession> {
        self.current.and_then(|id| self.get(id))
    }

    /// Look up a session by id
    pub fn get(&self, id: SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|session| session.id == id)
    }

    fn get_mut(&mut self, id: SessionId) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|session| session.id == id)
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|session| session.id == id)
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Resolve a user-typed session reference
    ///
    /// Accepts a 1-based position in the session list, a full session id,
    /// the short id shown in listings, or an unambiguous id prefix or suffix
    /// (case-insensitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use sonia::session::SessionStore;
    ///
    /// let mut store = SessionStore::new();
    /// let older = store.create_session();
    /// let newer = store.create_session();
    /// assert_eq!(store.resolve("1"), Some(newer));
    /// assert_eq!(store.resolve("2"), Some(older));
    /// assert_eq!(store.resolve(&older.to_string()), Some(older));
    /// assert_eq!(store.resolve(&newer.short()), Some(newer));
    /// assert_eq!(store.resolve("3"), None);
    /// ```
    pub fn resolve(&self, reference: &str) -> Option<SessionId> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        if let Ok(position) = reference.parse::<usize>() {
            if position >= 1 && position <= self.sessions.len() {
                return Some(self.sessions[position - 1].id);
            }
        }

        let needle = reference.to_uppercase();
        let mut matches = self
            .sessions
            .iter()
            .filter(|session| {
                let id = session.id.to_string();
                id.starts_with(&needle) || id.ends_with(&needle)
            });
        match (matches.next(), matches.next()) {
            (Some(session), None) => Some(session.id),
            _ => None,
        }
    }
}
