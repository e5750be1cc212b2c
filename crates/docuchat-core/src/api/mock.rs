//! Mock data source: canned history, fabricated uploads and templated answers.
//! Never touches the network.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ApiMode, DocumentApi};
use crate::error::ActionError;
use crate::session::SessionToken;
use crate::types::{Answer, Document, DocumentId, FileUpload, QaPair};
use crate::validation::Credentials;

const MOCK_LOGIN_PREFIX: &str = "mock_token_";
const MOCK_SIGNUP_TOKEN: &str = "mock-signup-token";

const MOCK_HISTORY: &[(i64, DocumentId, &str, &str)] = &[
    (
        1,
        101,
        "What is the main theme of the document?",
        "The document discusses the future of renewable energy.",
    ),
    (
        2,
        101,
        "What are the key takeaways?",
        "Solar and wind power are leading the charge.",
    ),
    (
        3,
        102,
        "How does the mock API work?",
        "It returns pre-defined data without calling a real server.",
    ),
];

pub struct MockApi {
    /// Simulated answer latency.
    latency: Duration,
}

impl MockApi {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn answer_for(document_id: DocumentId, question: &str) -> String {
        format!(
            "This is a mocked answer for document {} to your question: \"{}\"",
            document_id, question
        )
    }
}

fn random_document_id() -> DocumentId {
    (Uuid::new_v4().as_u128() % 1000) as DocumentId + 1
}

#[async_trait]
impl DocumentApi for MockApi {
    fn mode(&self) -> ApiMode {
        ApiMode::Mock
    }

    async fn history(&self, _token: &SessionToken) -> Result<Vec<QaPair>, ActionError> {
        let now = Utc::now().to_rfc3339();
        Ok(MOCK_HISTORY
            .iter()
            .map(|&(id, document_id, question, answer)| QaPair {
                id,
                document_id,
                question: question.to_string(),
                answer: answer.to_string(),
                created_at: now.clone(),
            })
            .collect())
    }

    async fn upload(&self, _token: &SessionToken, file: FileUpload) -> Result<Document, ActionError> {
        Ok(Document {
            id: random_document_id(),
            file_size: file.size(),
            filename: file.file_name,
            mime_type: file.mime_type,
            uploaded_at: Utc::now().to_rfc3339(),
        })
    }

    async fn ask(
        &self,
        _token: &SessionToken,
        document_id: DocumentId,
        question: &str,
    ) -> Result<Answer, ActionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(Answer {
            answer: Self::answer_for(document_id, question),
        })
    }

    async fn login(&self, _credentials: &Credentials) -> Result<SessionToken, ActionError> {
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(13).collect();
        Ok(SessionToken::new(format!("{}{}", MOCK_LOGIN_PREFIX, suffix)))
    }

    async fn signup(&self, _credentials: &Credentials) -> Result<SessionToken, ActionError> {
        Ok(SessionToken::new(MOCK_SIGNUP_TOKEN))
    }
}
