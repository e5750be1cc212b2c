//! Chat panel: one reducer over document selection, message list and the pending flags.
//!
//! [`ChatPanel::apply`] is synchronous and returns the side effect the caller must run next.
//! [`PanelDriver`] runs those effects against [`Actions`], which is what fixes the ordering:
//! the history refresh is only requested by `AnswerResolved`, so it cannot start before the
//! answer is in.

use std::sync::Arc;

use serde::Serialize;

use crate::actions::Actions;
use crate::error::ActionResult;
use crate::session::SessionContext;
use crate::types::{Answer, ChatMessage, Document, DocumentId, FileUpload, QaPair, Role};

const NO_ANSWER: &str = "Sorry, I couldn't find an answer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrigin {
    Uploaded,
    FromHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelDocument {
    #[serde(flatten)]
    pub document: Document,
    pub origin: DocumentOrigin,
}

impl PanelDocument {
    pub fn id(&self) -> DocumentId {
        self.document.id
    }
}

/// Toast raised by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    InputChanged(String),
    NewChat,
    SelectDocument(DocumentId),
    OpenHistoryItem(i64),
    UploadStarted,
    UploadFinished(ActionResult<Document>),
    Submit,
    /// Always followed by `RefreshHistory`, failed answers included, so the history list
    /// reflects whatever the API recorded for the attempt.
    AnswerResolved(ActionResult<Answer>),
    HistoryRefreshed(Vec<QaPair>),
}

/// Work the caller must perform after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Ask { document_id: DocumentId, question: String },
    RefreshHistory,
}

#[derive(Debug, Clone, Default)]
pub struct ChatPanel {
    is_guest: bool,
    history: Vec<QaPair>,
    documents: Vec<PanelDocument>,
    selected: Option<DocumentId>,
    messages: Vec<ChatMessage>,
    input: String,
    uploading: bool,
    asking: bool,
    notices: Vec<Notice>,
    next_message_id: u64,
}

/// Serializable initial view served by `GET /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub is_guest: bool,
    pub history: Vec<QaPair>,
    pub documents: Vec<PanelDocument>,
    pub selected: Option<DocumentId>,
}

/// One entry per document id mentioned in history, in first-seen order.
fn documents_from_history(history: &[QaPair]) -> Vec<PanelDocument> {
    let mut documents: Vec<PanelDocument> = Vec::new();
    for item in history {
        if documents.iter().any(|d| d.id() == item.document_id) {
            continue;
        }
        documents.push(PanelDocument {
            document: Document {
                id: item.document_id,
                filename: format!("Document #{}", item.document_id),
                mime_type: String::new(),
                file_size: 0,
                uploaded_at: item.created_at.clone(),
            },
            origin: DocumentOrigin::FromHistory,
        });
    }
    documents
}

impl ChatPanel {
    pub fn new(history: Vec<QaPair>, is_guest: bool) -> Self {
        Self {
            is_guest,
            documents: documents_from_history(&history),
            history,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ChatView {
        ChatView {
            is_guest: self.is_guest,
            history: self.history.clone(),
            documents: self.documents.clone(),
            selected: self.selected,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.is_guest
    }

    pub fn history(&self) -> &[QaPair] {
        &self.history
    }

    pub fn documents(&self) -> &[PanelDocument] {
        &self.documents
    }

    pub fn selected(&self) -> Option<&PanelDocument> {
        let id = self.selected?;
        self.documents.iter().find(|d| d.id() == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn is_asking(&self) -> bool {
        self.asking
    }

    /// The input accepts a question only with a selection and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.asking && !self.input.trim().is_empty()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn push_message(&mut self, role: Role, content: String, loading: bool) {
        self.next_message_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_message_id,
            role,
            content,
            loading,
        });
    }

    fn notify(&mut self, title: &str, description: String, destructive: bool) {
        self.notices.push(Notice {
            title: title.to_string(),
            description,
            destructive,
        });
    }

    pub fn apply(&mut self, event: PanelEvent) -> Option<Effect> {
        match event {
            PanelEvent::InputChanged(text) => {
                self.input = text;
                None
            }
            PanelEvent::NewChat => {
                self.selected = None;
                self.messages.clear();
                self.input.clear();
                None
            }
            PanelEvent::SelectDocument(id) => {
                if self.documents.iter().any(|d| d.id() == id) {
                    self.selected = Some(id);
                    self.messages.clear();
                }
                None
            }
            PanelEvent::OpenHistoryItem(id) => {
                if let Some(item) = self.history.iter().find(|h| h.id == id) {
                    let description = format!("Q: {}\nA: {}", item.question, item.answer);
                    self.notify("History", description, false);
                }
                None
            }
            PanelEvent::UploadStarted => {
                self.uploading = true;
                None
            }
            PanelEvent::UploadFinished(result) => {
                self.uploading = false;
                match result {
                    ActionResult::Success(document) => {
                        self.notify("Upload successful", document.filename.clone(), false);
                        self.documents.retain(|d| d.id() != document.id);
                        self.selected = Some(document.id);
                        self.documents.insert(
                            0,
                            PanelDocument {
                                document,
                                origin: DocumentOrigin::Uploaded,
                            },
                        );
                        self.messages.clear();
                    }
                    ActionResult::Failure(error) => {
                        self.notify("Upload failed", error, true);
                    }
                }
                None
            }
            PanelEvent::Submit => {
                if !self.can_submit() {
                    return None;
                }
                let document_id = self.selected?;
                let question = std::mem::take(&mut self.input);
                self.push_message(Role::User, question.clone(), false);
                self.push_message(Role::Assistant, String::new(), true);
                self.asking = true;
                Some(Effect::Ask {
                    document_id,
                    question,
                })
            }
            PanelEvent::AnswerResolved(result) => {
                self.asking = false;
                let content = match result {
                    ActionResult::Success(answer) if answer.answer.trim().is_empty() => NO_ANSWER.to_string(),
                    ActionResult::Success(answer) => answer.answer,
                    ActionResult::Failure(error) => format!("Error: {}", error),
                };
                for message in self.messages.iter_mut().filter(|m| m.loading) {
                    message.loading = false;
                    message.content = content.clone();
                }
                Some(Effect::RefreshHistory)
            }
            PanelEvent::HistoryRefreshed(history) => {
                self.history = history;
                None
            }
        }
    }
}

/// Drives a [`ChatPanel`] for one session, running its effects through [`Actions`].
pub struct PanelDriver {
    panel: ChatPanel,
    actions: Arc<Actions>,
    session: SessionContext,
}

impl PanelDriver {
    /// Loads the initial history; an unavailable history renders as empty.
    pub async fn open(actions: Arc<Actions>, session: SessionContext) -> Self {
        let history = actions.chat_view_history(&session).await;
        let panel = ChatPanel::new(history, session.is_guest());
        Self {
            panel,
            actions,
            session,
        }
    }

    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ChatPanel {
        &mut self.panel
    }

    /// Applies an event and runs whatever effects it produces.
    pub async fn dispatch(&mut self, event: PanelEvent) {
        let mut next = self.panel.apply(event);
        while let Some(effect) = next.take() {
            next = self.run(effect).await;
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::Ask {
                document_id,
                question,
            } => {
                let result = self.actions.ask(&self.session, document_id, &question).await;
                self.panel.apply(PanelEvent::AnswerResolved(result))
            }
            Effect::RefreshHistory => match self.actions.history(&self.session).await {
                ActionResult::Success(history) => self.panel.apply(PanelEvent::HistoryRefreshed(history)),
                ActionResult::Failure(error) => {
                    tracing::warn!("History refresh failed: {}", error);
                    None
                }
            },
        }
    }

    pub async fn upload(&mut self, file: Option<FileUpload>) {
        self.panel.apply(PanelEvent::UploadStarted);
        let result = self.actions.upload(&self.session, file).await;
        self.dispatch(PanelEvent::UploadFinished(result)).await;
    }

    /// Sets the input and submits it. Returns false when the panel refused the question.
    pub async fn ask(&mut self, question: &str) -> bool {
        self.panel.apply(PanelEvent::InputChanged(question.to_string()));
        if !self.panel.can_submit() {
            return false;
        }
        self.dispatch(PanelEvent::Submit).await;
        true
    }
}
