//! Atlassian Document Format (ADF) data model.
//!
//! Nodes keep their `type` as a plain string so that documents carrying
//! node or mark types outside the supported vocabulary can still be
//! represented, rendered leniently and reported by the validator.

pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const ADF_VERSION: u64 = 1;
pub const DOC: &str = "doc";

/// Node and mark type names produced or consumed by the converters.
pub mod types {
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const CODE_BLOCK: &str = "codeBlock";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const BULLET_LIST: &str = "bulletList";
    pub const ORDERED_LIST: &str = "orderedList";
    pub const LIST_ITEM: &str = "listItem";
    pub const TASK_LIST: &str = "taskList";
    pub const TASK_ITEM: &str = "taskItem";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const TABLE_HEADER: &str = "tableHeader";
    pub const TABLE_CELL: &str = "tableCell";
    pub const MEDIA_SINGLE: &str = "mediaSingle";
    pub const MEDIA: &str = "media";
    pub const RULE: &str = "rule";
    pub const PANEL: &str = "panel";
    pub const EXPAND: &str = "expand";
    pub const BLOCK_CARD: &str = "blockCard";

    pub const TEXT: &str = "text";
    pub const HARD_BREAK: &str = "hardBreak";
    pub const MENTION: &str = "mention";
    pub const EMOJI: &str = "emoji";
    pub const INLINE_CARD: &str = "inlineCard";

    pub const STRONG: &str = "strong";
    pub const EM: &str = "em";
    pub const CODE: &str = "code";
    pub const STRIKE: &str = "strike";
    pub const UNDERLINE: &str = "underline";
    pub const SUBSUP: &str = "subsup";
    pub const LINK: &str = "link";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Self {
            version: ADF_VERSION,
            kind: DOC.to_string(),
            content,
        }
    }

    /// Fails with `MalformedDocument` unless this is a version-1 `doc`.
    pub fn check_root(&self) -> Result<()> {
        if self.kind != DOC {
            return Err(Error::MalformedDocument(format!(
                "type must be 'doc', got '{}'",
                self.kind
            )));
        }
        if self.version != ADF_VERSION {
            return Err(Error::MalformedDocument(format!(
                "version must be {}, got {}",
                ADF_VERSION, self.version
            )));
        }
        Ok(())
    }
}

impl TryFrom<&Value> for Document {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        check_root(value)?;
        let doc: Document = serde_json::from_value(value.clone())
            .map_err(|e| Error::MalformedDocument(e.to_string()))?;
        Ok(doc)
    }
}

/// Checks the top-level discriminators of a raw ADF value.
///
/// Only `type`, `version` and the shape of `content` are inspected; node
/// level checks belong to [`validate::validate`].
pub fn check_root(value: &Value) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedDocument("must be an object".into()))?;

    let doc_type = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::MalformedDocument("missing required field 'type'".into()))?;

    if doc_type != DOC {
        return Err(Error::MalformedDocument(format!(
            "type must be 'doc', got '{}'",
            doc_type
        )));
    }

    let version = obj
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| Error::MalformedDocument("missing required field 'version'".into()))?;

    if version != ADF_VERSION {
        return Err(Error::MalformedDocument(format!(
            "version must be {}, got {}",
            ADF_VERSION, version
        )));
    }

    if let Some(content) = obj.get("content")
        && !content.is_array()
    {
        return Err(Error::MalformedDocument("content must be array".into()));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Mark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attrs: None,
            content: None,
            marks: None,
            text: None,
        }
    }

    /// A text leaf; an empty mark slice leaves `marks` unset.
    pub fn text(text: impl Into<String>, marks: &[Mark]) -> Self {
        Self {
            text: Some(text.into()),
            marks: (!marks.is_empty()).then(|| marks.to_vec()),
            ..Self::new(types::TEXT)
        }
    }

    /// Sets `attrs` from a JSON object; any other value clears them.
    pub fn with_attrs(mut self, attrs: Value) -> Self {
        self.attrs = match attrs {
            Value::Object(map) => Some(map),
            _ => None,
        };
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = Some(content);
        self
    }

    /// Like [`Node::with_content`], but an empty list leaves `content` unset.
    pub fn with_optional_content(mut self, content: Vec<Node>) -> Self {
        self.content = (!content.is_empty()).then_some(content);
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn marks(&self) -> &[Mark] {
        self.marks.as_deref().unwrap_or_default()
    }

    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|a| a.get(name))
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|v| v.as_str())
    }

    pub fn attr_u64(&self, name: &str) -> Option<u64> {
        self.attr(name).and_then(|v| v.as_u64())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

impl Mark {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attrs: None,
        }
    }

    pub fn link(href: &str, title: Option<&str>) -> Self {
        let mut attrs = Map::new();
        attrs.insert("href".into(), Value::String(href.to_string()));
        if let Some(title) = title {
            attrs.insert("title".into(), Value::String(title.to_string()));
        }
        Self {
            kind: types::LINK.to_string(),
            attrs: Some(attrs),
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|a| a.get(name))
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_root_valid_document() {
        let adf = json!({"type": "doc", "version": 1, "content": []});
        assert!(check_root(&adf).is_ok());
    }

    #[test]
    fn test_check_root_missing_type() {
        let adf = json!({"version": 1, "content": []});
        let err = check_root(&adf).unwrap_err();
        assert!(err.to_string().contains("missing required field 'type'"));
    }

    #[test]
    fn test_check_root_wrong_type() {
        let adf = json!({"type": "paragraph", "version": 1, "content": []});
        let err = check_root(&adf).unwrap_err();
        assert!(err.to_string().contains("type must be 'doc'"));
    }

    #[test]
    fn test_check_root_missing_version() {
        let adf = json!({"type": "doc", "content": []});
        let err = check_root(&adf).unwrap_err();
        assert!(err.to_string().contains("missing required field 'version'"));
    }

    #[test]
    fn test_check_root_version_as_string() {
        let adf = json!({"type": "doc", "version": "1", "content": []});
        assert!(matches!(
            check_root(&adf),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_check_root_wrong_version() {
        let adf = json!({"type": "doc", "version": 2, "content": []});
        let err = check_root(&adf).unwrap_err();
        assert!(err.to_string().contains("version must be 1"));
    }

    #[test]
    fn test_check_root_content_not_array() {
        let adf = json!({"type": "doc", "version": 1, "content": "invalid"});
        let err = check_root(&adf).unwrap_err();
        assert!(err.to_string().contains("content must be array"));
    }

    #[test]
    fn test_check_root_not_object() {
        let err = check_root(&json!("not an object")).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_document_serializes_without_empty_fields() {
        let doc = Document::new(vec![
            Node::new(types::PARAGRAPH).with_content(vec![Node::text("Hello", &[])]),
            Node::new(types::RULE),
        ]);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 1,
                "type": "doc",
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "Hello"}]},
                    {"type": "rule"}
                ]
            })
        );
    }

    #[test]
    fn test_document_from_value() {
        let value = json!({
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "heading",
                "attrs": {"level": 2},
                "content": [{"type": "text", "text": "Title", "marks": [{"type": "strong"}]}]
            }]
        });
        let doc = Document::try_from(&value).unwrap();
        let heading = &doc.content[0];
        assert!(heading.is(types::HEADING));
        assert_eq!(heading.attr_u64("level"), Some(2));
        assert_eq!(heading.children()[0].text_str(), "Title");
        assert!(heading.children()[0].marks()[0].is(types::STRONG));
    }

    #[test]
    fn test_document_from_value_without_content() {
        let doc = Document::try_from(&json!({"type": "doc", "version": 1})).unwrap();
        assert!(doc.content.is_empty());
    }

    #[test]
    fn test_link_mark_title_is_optional() {
        let mark = Mark::link("https://example.com", None);
        assert_eq!(mark.attr_str("href"), Some("https://example.com"));
        assert_eq!(mark.attr_str("title"), None);
    }
}
