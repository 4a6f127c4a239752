//! Chat interaction state machine
//!
//! Sending a message and uploading a document both follow the same shape:
//!
//! ```text
//! idle -> sending   -> idle (bot answer appended | bot error notice appended)
//! idle -> uploading -> idle (upload summary appended | bot error notice appended)
//! ```
//!
//! Each interaction is split into a `begin_*` step that mutates the store
//! synchronously and hands back a ticket, and a `complete_*` step that folds
//! the service result into the ticket's session. The async `send_message`
//! and `upload_pdf` helpers chain the two around the [`Assistant`] call.
//! A send and an upload may be in flight together; their completions land
//! in whatever order they resolve.

use crate::client::{
    display_file_name, Assistant, ChatResponse, HealthResponse, PdfUpload, UploadResponse,
};
use crate::error::{handle_api_error, Result, SoniaError};
use crate::session::{Message, Sender, SessionId, SessionStore, TitleSource};

use std::path::{Path, PathBuf};

/// Shown when the selected file is not a PDF
pub const UPLOAD_VALIDATION_MESSAGE: &str = "Please select a PDF file.";

/// Bot notice appended when a question could not be answered
pub fn send_failure_message(error: &anyhow::Error) -> String {
    format!(
        "Sorry, I encountered an error: {}. Please make sure the backend is running.",
        handle_api_error(error)
    )
}

/// Bot notice appended after a successful upload
pub fn upload_success_message(filename: &str, chunks_stored: u64) -> String {
    format!(
        "Successfully uploaded \"{}\" - {} chunks processed. You can now ask questions about this document!",
        filename, chunks_stored
    )
}

/// Bot notice appended when an upload failed
pub fn upload_failure_message(error: &anyhow::Error) -> String {
    format!(
        "Upload failed: {}. Please make sure the backend is running and try again.",
        handle_api_error(error)
    )
}

/// Whether a file name has the `.pdf` extension (case-insensitive)
pub fn is_pdf_file_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// A question that has been recorded and awaits its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Session the answer belongs to
    pub session_id: SessionId,
    /// Text sent to the assistant
    pub query: String,
}

/// An upload that has been accepted and awaits the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Session the upload summary belongs to
    pub session_id: SessionId,
    /// File to read and send
    pub path: PathBuf,
    /// File name shown in messages and titles
    pub filename: String,
    /// Whether the session had no messages when the upload started
    pub was_empty: bool,
}

/// Drives chat interactions against an [`Assistant`]
///
/// # Examples
///
/// ```no_run
/// use sonia::chat::ChatController;
/// use sonia::client::AssistantClient;
/// use sonia::config::ApiConfig;
///
/// # async fn example() -> sonia::error::Result<()> {
/// let client = AssistantClient::new(&ApiConfig::default())?;
/// let mut chat = ChatController::new(Box::new(client));
/// if let Some(reply) = chat.send_message("Summarize the document").await? {
///     println!("{}", reply.content());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatController {
    assistant: Box<dyn Assistant>,
    store: SessionStore,
    sending: bool,
    uploading: bool,
}

impl ChatController {
    /// Create a controller with an empty session store
    pub fn new(assistant: Box<dyn Assistant>) -> Self {
        Self::with_store(assistant, SessionStore::new())
    }

    /// Create a controller around an existing store
    pub fn with_store(assistant: Box<dyn Assistant>, store: SessionStore) -> Self {
        Self {
            assistant,
            store,
            sending: false,
            uploading: false,
        }
    }

    /// Session state
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mutable session state, for sidebar-style actions
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Whether a question is awaiting its answer
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Whether an upload is awaiting the service
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    fn current_or_new_session(&mut self) -> SessionId {
        match self.store.current_id() {
            Some(id) => id,
            None => self.store.create_session(),
        }
    }

    /// Record a question and enter the `sending` state
    ///
    /// Blank input is ignored (`Ok(None)`). A session is created when none
    /// is selected, and the session is named after the question when it is
    /// the first message.
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Busy`] while another send is in flight.
    pub fn begin_send(&mut self, input: &str) -> Result<Option<PendingSend>> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        if self.sending {
            return Err(SoniaError::Busy("send").into());
        }

        let session_id = self.current_or_new_session();
        self.store
            .derive_title(session_id, TitleSource::Message(input));
        let message = self.store.new_message(Sender::User, input);
        self.store.append_message(session_id, message);

        self.sending = true;
        tracing::debug!(session = %session_id, "Sending question");

        Ok(Some(PendingSend {
            session_id,
            query: input.to_string(),
        }))
    }

    /// Fold an answer (or failure) into the ticket's session
    ///
    /// Returns the appended bot message, or `None` when the session was
    /// deleted while the request was in flight.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<ChatResponse>,
    ) -> Option<Message> {
        self.sending = false;

        let content = match result {
            Ok(reply) => reply.answer,
            Err(e) => {
                tracing::warn!(session = %pending.session_id, "Question failed: {:#}", e);
                send_failure_message(&e)
            }
        };
        self.append_bot_message(pending.session_id, content)
    }

    /// Send a question and wait for the answer
    ///
    /// Returns the appended bot message (the answer or an error notice), or
    /// `None` when the input was blank.
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Busy`] while another send is in flight. Service
    /// failures are not errors here; they become bot messages.
    pub async fn send_message(&mut self, input: &str) -> Result<Option<Message>> {
        let Some(pending) = self.begin_send(input)? else {
            return Ok(None);
        };
        let result = self.assistant.send_message(&pending.query).await;
        Ok(self.complete_send(pending, result))
    }

    /// Validate a file and enter the `uploading` state
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Validation`] for a non-PDF file name (nothing is
    /// created or appended), or [`SoniaError::Busy`] while another upload is
    /// in flight.
    pub fn begin_upload(&mut self, path: &Path) -> Result<PendingUpload> {
        let filename = display_file_name(path);
        if !is_pdf_file_name(&filename) {
            tracing::debug!(file = %filename, "Rejected non-PDF upload");
            return Err(SoniaError::Validation(UPLOAD_VALIDATION_MESSAGE.to_string()).into());
        }
        if self.uploading {
            return Err(SoniaError::Busy("upload").into());
        }

        let session_id = self.current_or_new_session();
        let was_empty = self
            .store
            .get(session_id)
            .map(|session| session.is_empty())
            .unwrap_or(true);
        self.uploading = true;
        tracing::debug!(session = %session_id, file = %filename, "Uploading document");

        Ok(PendingUpload {
            session_id,
            path: path.to_path_buf(),
            filename,
            was_empty,
        })
    }

    /// Fold an upload result into the ticket's session
    ///
    /// A successful upload names the session after the file when the
    /// session was empty as the upload started, even if a question landed
    /// in it meanwhile. Returns the appended bot message, or `None` when the
    /// session was deleted while the upload was in flight.
    pub fn complete_upload(
        &mut self,
        pending: PendingUpload,
        result: Result<UploadResponse>,
    ) -> Option<Message> {
        self.uploading = false;

        let content = match result {
            Ok(reply) => {
                if pending.was_empty {
                    self.store
                        .apply_title(pending.session_id, TitleSource::Upload(&pending.filename));
                }
                upload_success_message(&pending.filename, reply.chunks_stored)
            }
            Err(e) => {
                tracing::warn!(file = %pending.filename, "Upload failed: {:#}", e);
                upload_failure_message(&e)
            }
        };
        self.append_bot_message(pending.session_id, content)
    }

    /// Validate, read and upload a PDF, then record the outcome
    ///
    /// # Errors
    ///
    /// Returns the validation or busy errors of
    /// [`ChatController::begin_upload`]. Read and service failures become
    /// bot messages instead.
    pub async fn upload_pdf(&mut self, path: &Path) -> Result<Option<Message>> {
        let pending = self.begin_upload(path)?;
        let result = match PdfUpload::from_path(&pending.path).await {
            Ok(upload) => self.assistant.upload_pdf(upload).await,
            Err(e) => Err(e),
        };
        Ok(self.complete_upload(pending, result))
    }

    /// Check the assistant service
    pub async fn health_check(&self) -> Result<HealthResponse> {
        self.assistant.health_check().await
    }

    fn append_bot_message(&mut self, session_id: SessionId, content: String) -> Option<Message> {
        let message = self.store.new_message(Sender::Bot, content);
        if self.store.append_message(session_id, message.clone()) {
            Some(message)
        } else {
            tracing::debug!(session = %session_id, "Session deleted before reply arrived");
            None
        }
    }
}
