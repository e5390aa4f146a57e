//! Domain types shared by the snapshot, fusion and launcher layers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Badge value that marks a display item as an error.
pub const ERROR_BADGE: &str = "Error";

/// One raw hit produced by the similarity collaborator.
///
/// - `source_path`: location of the indexed document; empty hits are never ranked
/// - `doc_id`: attachment key when the index knows it
/// - `title`: display title from the index
/// - `fusion_score`: engine-specific relevance, higher is better
///
/// Missing and `null` fields both read as empty (or zero for the score).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityHit {
    #[serde(deserialize_with = "null_as_default")]
    pub source_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub doc_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fusion_score: f64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SimilarityHit {
    pub fn new(source_path: impl Into<String>, doc_id: impl Into<String>, title: impl Into<String>, fusion_score: f64) -> Self {
        Self {
            source_path: source_path.into().trim().to_string(),
            doc_id: doc_id.into().trim().to_string(),
            title: title.into().trim().to_string(),
            fusion_score,
        }
    }

    /// Copy with surrounding whitespace stripped from every string field.
    pub fn normalized(self) -> Self {
        Self::new(self.source_path, self.doc_id, self.title, self.fusion_score)
    }
}

/// Bibliographic and path metadata joined from the reference database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub parent_title: String,
    /// Ordered author names joined with `", "`; empty when the item has none.
    pub authors: String,
    pub date: String,
    pub publication: String,
    pub resolved_pdf_path: Option<PathBuf>,
}

/// Fields recovered from a document's companion text file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarMeta {
    pub attachment_key: Option<String>,
    pub source_pdf: Option<String>,
    pub external_link: Option<String>,
}

impl SidecarMeta {
    pub fn is_complete(&self) -> bool {
        self.attachment_key.is_some() && self.source_pdf.is_some() && self.external_link.is_some()
    }
}

/// A display item in the launcher's JSON protocol.
///
/// Stored as the JSON object itself so items produced elsewhere (icons, actions,
/// numeric labels, explicit `false` flags) are written back out exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseItem(Map<String, Value>);

impl ResponseItem {
    pub fn info(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".into(), Value::String(title.into()));
        fields.insert("subtitle".into(), Value::String(subtitle.into()));
        Self(fields)
    }

    pub fn error(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self::info(title, subtitle).with("badge", ERROR_BADGE)
    }

    /// File target; also used as the quick-look preview.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.with("path", path.clone()).with("quickLookURL", path)
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.with("url", url.into())
    }

    /// Rank label shown next to the item.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with("label", label.into())
    }

    pub fn always_show_subtitle(self) -> Self {
        self.with("alwaysShowsSubtitle", true)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Append ` | note` to the subtitle.
    pub fn append_subtitle(mut self, note: &str) -> Self {
        let subtitle = format!("{} | {note}", self.subtitle());
        self.0.insert("subtitle".into(), Value::String(subtitle));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`; `None` when absent or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> &str {
        self.str_field("title").unwrap_or_default()
    }

    pub fn subtitle(&self) -> &str {
        self.str_field("subtitle").unwrap_or_default()
    }

    pub fn path(&self) -> Option<&str> {
        self.str_field("path")
    }

    pub fn quick_look_url(&self) -> Option<&str> {
        self.str_field("quickLookURL")
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn label(&self) -> Option<&str> {
        self.str_field("label")
    }

    pub fn is_error(&self) -> bool {
        self.str_field("badge") == Some(ERROR_BADGE)
    }
}

/// Where the similarity backend computes embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Local,
    Remote,
}

impl BackendKind {
    pub fn from_use_local(use_local: bool) -> Self {
        if use_local { Self::Local } else { Self::Remote }
    }
}
