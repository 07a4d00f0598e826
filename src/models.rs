// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The acting author a result is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub full_name: String,
}

/// Caller-supplied attribution carried into every extraction.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub author: Author,
}

impl ExtractionContext {
    pub fn new(author_id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            author: Author {
                id: author_id.into(),
                full_name: full_name.into(),
            },
        }
    }
}

/// Extracted content. Articles store named fields, repositories store
/// relative path -> file content, social posts store plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ContentPayload {
    Text(String),
    Mapping(BTreeMap<String, String>),
}

impl ContentPayload {
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ContentPayload::Mapping(map) => Some(map),
            ContentPayload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPayload::Text(text) => Some(text),
            ContentPayload::Mapping(_) => None,
        }
    }
}

/// The persisted record. `link` is the logical unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub link: String,
    pub name: Option<String>,
    pub content: ContentPayload,
    pub platform: String,
    pub author_id: String,
    pub author_full_name: String,
    pub created_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// Builds a record stamped with the current time and the context's author.
    pub fn new(
        link: &str,
        name: Option<String>,
        content: ContentPayload,
        platform: &str,
        ctx: &ExtractionContext,
    ) -> Self {
        Self {
            link: link.to_string(),
            name,
            content,
            platform: platform.to_string(),
            author_id: ctx.author.id.clone(),
            author_full_name: ctx.author.full_name.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Successful result of a single `extract` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A new record was saved for the link.
    Persisted { platform: String },
    /// The link was already stored; nothing was done.
    AlreadyProcessed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_takes_author_from_context() {
        let ctx = ExtractionContext::new("u-1", "Ada Lovelace");
        let record = ExtractionResult::new(
            "https://example.com/post",
            None,
            ContentPayload::Text("body".to_string()),
            "example.com",
            &ctx,
        );

        assert_eq!(record.author_id, "u-1");
        assert_eq!(record.author_full_name, "Ada Lovelace");
        assert_eq!(record.content.as_text(), Some("body"));
        assert!(record.content.as_mapping().is_none());
    }

    #[test]
    fn test_payload_serializes_with_kind_tag() {
        let mut files = BTreeMap::new();
        files.insert("a.txt".to_string(), "helloworld".to_string());
        let json = serde_json::to_value(ContentPayload::Mapping(files)).unwrap();

        assert_eq!(json["kind"], "mapping");
        assert_eq!(json["data"]["a.txt"], "helloworld");
    }
}
