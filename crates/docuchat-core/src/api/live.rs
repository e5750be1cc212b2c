//! HTTP client for the Document QA API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiMode, DocumentApi, Operation};
use crate::error::ActionError;
use crate::session::SessionToken;
use crate::types::{Answer, Document, DocumentId, FileUpload, QaPair};
use crate::validation::Credentials;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Serialize)]
struct AskRequest<'a> {
    document_id: DocumentId,
    question: &'a str,
}

/// Live data source. The base URL is used verbatim (scheme included) and joined with each
/// operation's path.
pub struct LiveApi {
    base_url: String,
    client: reqwest::Client,
}

impl LiveApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, op: Operation) -> String {
        format!("{}{}", self.base_url, op.path())
    }

    /// Non-2xx: take `detail` from the JSON body, else the operation fallback.
    async fn decode<T: DeserializeOwned>(op: Operation, res: Response) -> Result<T, ActionError> {
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_else(|| op.fallback_error().to_string());
            tracing::warn!(
                operation = ?op,
                status = status.as_u16(),
                "Document QA API rejected request: {}",
                message
            );
            return Err(ActionError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| ActionError::Decode(format!("{:?}: {}", op, e)))
    }

    async fn decode_token(op: Operation, res: Response) -> Result<SessionToken, ActionError> {
        let body: serde_json::Value = Self::decode(op, res).await?;
        body.get("access_token")
            .and_then(|t| t.as_str())
            .map(SessionToken::new)
            .ok_or(ActionError::InvalidToken)
    }
}

#[async_trait]
impl DocumentApi for LiveApi {
    fn mode(&self) -> ApiMode {
        ApiMode::Live
    }

    async fn history(&self, token: &SessionToken) -> Result<Vec<QaPair>, ActionError> {
        let res = self
            .client
            .get(self.url(Operation::History))
            .bearer_auth(token.as_str())
            .send()
            .await?;
        Self::decode(Operation::History, res).await
    }

    async fn upload(&self, token: &SessionToken, file: FileUpload) -> Result<Document, ActionError> {
        let mime = if file.mime_type.trim().is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            file.mime_type
        };
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&mime)?;
        let form = Form::new().part("file", part);

        let res = self
            .client
            .post(self.url(Operation::Upload))
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await?;
        Self::decode(Operation::Upload, res).await
    }

    async fn ask(
        &self,
        token: &SessionToken,
        document_id: DocumentId,
        question: &str,
    ) -> Result<Answer, ActionError> {
        let res = self
            .client
            .post(self.url(Operation::Ask))
            .bearer_auth(token.as_str())
            .json(&AskRequest {
                document_id,
                question,
            })
            .send()
            .await?;
        Self::decode(Operation::Ask, res).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ActionError> {
        let form = [
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let res = self
            .client
            .post(self.url(Operation::Login))
            .form(&form)
            .send()
            .await?;
        Self::decode_token(Operation::Login, res).await
    }

    async fn signup(&self, credentials: &Credentials) -> Result<SessionToken, ActionError> {
        let res = self
            .client
            .post(self.url(Operation::Signup))
            .json(credentials)
            .send()
            .await?;
        Self::decode_token(Operation::Signup, res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_used_verbatim() {
        let api = LiveApi::new("http://api.local:9000/");
        assert_eq!(api.base_url(), "http://api.local:9000");
        assert_eq!(api.url(Operation::Ask), "http://api.local:9000/ask");
        assert_eq!(api.url(Operation::Login), "http://api.local:9000/token");
    }
}
