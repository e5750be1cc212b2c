//! Wire types shared with the Document QA API and the chat panel.

use serde::{Deserialize, Deserializer, Serialize};

pub type DocumentId = i64;

/// Document metadata as returned by `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub mime_type: String,
    pub file_size: u64,
    pub uploaded_at: String,
}

/// One question/answer pair from `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub id: i64,
    pub document_id: DocumentId,
    pub question: String,
    pub answer: String,
    pub created_at: String,
}

/// Body of a successful `POST /ask`. A missing or null `answer` decodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Client-only chat message. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub loading: bool,
}

/// A file picked by the user, buffered in memory before it is forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Browsers submit an unnamed, empty part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() && self.bytes.is_empty()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_tolerates_missing_and_null() {
        let missing: Answer = serde_json::from_str("{}").unwrap();
        let null: Answer = serde_json::from_str(r#"{"answer": null}"#).unwrap();
        let text: Answer = serde_json::from_str(r#"{"answer": "42"}"#).unwrap();
        assert_eq!(missing.answer, "");
        assert_eq!(null.answer, "");
        assert_eq!(text.answer, "42");
    }
}
