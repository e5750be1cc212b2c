//! Server actions: validate, attach the session's bearer token, call the data source, and
//! settle every outcome into an [`ActionResult`].
//!
//! Nothing here returns `Err` to the caller. Failures become `ActionResult::Failure` with the
//! user-visible message; transport details only go to the log.

use std::sync::Arc;

use crate::api::{DocumentApi, Operation};
use crate::cache::ChatViewCache;
use crate::error::{ActionError, ActionResult};
use crate::session::{SessionChange, SessionContext, SessionToken};
use crate::types::{Answer, Document, DocumentId, FileUpload, QaPair};
use crate::validation::{Credentials, PasswordRule};

/// Result of an action that may also change the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub result: ActionResult<T>,
    pub session: SessionChange,
}

impl<T> Outcome<T> {
    fn keep(result: ActionResult<T>) -> Self {
        Self {
            result,
            session: SessionChange::Keep,
        }
    }
}

pub struct Actions {
    api: Arc<dyn DocumentApi>,
    cache: ChatViewCache,
}

fn require_token(ctx: &SessionContext) -> Result<&SessionToken, ActionError> {
    ctx.token().ok_or(ActionError::Unauthorized)
}

fn settle<T>(op: Operation, result: Result<T, ActionError>) -> ActionResult<T> {
    match &result {
        Err(ActionError::Transport(e)) => {
            tracing::error!(operation = ?op, "Document QA API unreachable: {}", e);
        }
        Err(ActionError::Decode(e)) => {
            tracing::error!(operation = ?op, "Unexpected Document QA API response: {}", e);
        }
        Err(e) if e.is_local() => {
            tracing::debug!(operation = ?op, "Rejected before network: {}", e);
        }
        _ => {}
    }
    result.into()
}

impl Actions {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self::with_cache(api, ChatViewCache::new())
    }

    pub fn with_cache(api: Arc<dyn DocumentApi>, cache: ChatViewCache) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &Arc<dyn DocumentApi> {
        &self.api
    }

    pub fn cache(&self) -> &ChatViewCache {
        &self.cache
    }

    /// Fresh history for the session; refreshes the chat view cache on success.
    pub async fn history(&self, ctx: &SessionContext) -> ActionResult<Vec<QaPair>> {
        let result = async {
            let token = require_token(ctx)?;
            let history = self.api.history(token).await?;
            self.cache.store(token, history.clone());
            Ok::<_, ActionError>(history)
        }
        .await;
        settle(Operation::History, result)
    }

    /// History as shown by the chat page: cached when possible, empty when unavailable.
    pub async fn chat_view_history(&self, ctx: &SessionContext) -> Vec<QaPair> {
        if let Some(cached) = ctx.token().and_then(|token| self.cache.get(token)) {
            return cached;
        }
        match self.history(ctx).await {
            ActionResult::Success(history) => history,
            ActionResult::Failure(_) => Vec::new(),
        }
    }

    pub async fn upload(&self, ctx: &SessionContext, file: Option<FileUpload>) -> ActionResult<Document> {
        let result = async {
            let token = require_token(ctx)?;
            let file = file.filter(|f| !f.is_empty()).ok_or(ActionError::NoFile)?;
            tracing::info!(file = %file.file_name, bytes = file.size(), "Uploading document");
            let document = self.api.upload(token, file).await?;
            self.cache.invalidate(token);
            Ok::<_, ActionError>(document)
        }
        .await;
        settle(Operation::Upload, result)
    }

    pub async fn ask(&self, ctx: &SessionContext, document_id: DocumentId, question: &str) -> ActionResult<Answer> {
        let result = async {
            let token = require_token(ctx)?;
            let answer = self.api.ask(token, document_id, question).await?;
            self.cache.invalidate(token);
            Ok::<_, ActionError>(answer)
        }
        .await;
        settle(Operation::Ask, result)
    }

    pub async fn login(&self, ctx: &SessionContext, credentials: &Credentials) -> Outcome<()> {
        self.authenticate(Operation::Login, ctx, credentials).await
    }

    pub async fn signup(&self, ctx: &SessionContext, credentials: &Credentials) -> Outcome<()> {
        self.authenticate(Operation::Signup, ctx, credentials).await
    }

    async fn authenticate(&self, op: Operation, ctx: &SessionContext, credentials: &Credentials) -> Outcome<()> {
        let rule = match op {
            Operation::Signup => PasswordRule::SIGNUP,
            _ => PasswordRule::NonEmpty,
        };
        let result = async {
            credentials.validate(rule)?;
            match op {
                Operation::Signup => self.api.signup(credentials).await,
                _ => self.api.login(credentials).await,
            }
        }
        .await;

        match result {
            Ok(token) => {
                if let Some(previous) = ctx.token() {
                    self.cache.invalidate(previous);
                }
                tracing::info!(operation = ?op, email = %credentials.email, "Session established");
                Outcome {
                    result: ActionResult::Success(()),
                    session: SessionChange::Set(token),
                }
            }
            Err(e) => Outcome::keep(settle(op, Err(e))),
        }
    }

    /// Always clears the session; the caller navigates to the login page.
    pub fn logout(&self, ctx: &SessionContext) -> SessionChange {
        if let Some(token) = ctx.token() {
            self.cache.invalidate(token);
        }
        tracing::info!("Session cleared");
        SessionChange::Clear
    }
}
