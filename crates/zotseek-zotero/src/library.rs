//! Batched attachment metadata lookup against a Zotero database snapshot.
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::debug;

use zotseek_core::error::{Error, Result};
use zotseek_core::traits::MetadataSource;
use zotseek_core::types::AttachmentRecord;

use crate::paths::PathResolver;
use crate::snapshot::Snapshot;

/// `fields.fieldID` values in the Zotero schema.
pub const TITLE_FIELD_ID: i64 = 1;
pub const DATE_FIELD_ID: i64 = 6;
pub const PUBLICATION_FIELD_ID: i64 = 38;

pub const UNTITLED_PARENT: &str = "(no title)";

/// Placeholder for the `IN (...)` list; one `?` per key.
const KEYS_PLACEHOLDER: &str = "{keys}";

const ATTACHMENT_METADATA_SQL: &str = "
    SELECT
        ai.key AS attachment_key,
        parent_title.value AS parent_title,
        COALESCE(authors.value, '') AS authors,
        COALESCE(date_value.value, '') AS date,
        COALESCE(pub.value, '') AS publication,
        COALESCE(ia.path, '') AS raw_path
    FROM itemAttachments ia
    JOIN items ai ON ai.itemID = ia.itemID
    JOIN items ip ON ip.itemID = ia.parentItemID
    LEFT JOIN itemData id_title ON id_title.itemID = ip.itemID AND id_title.fieldID = ?1
    LEFT JOIN itemDataValues parent_title ON parent_title.valueID = id_title.valueID
    LEFT JOIN itemData id_date ON id_date.itemID = ip.itemID AND id_date.fieldID = ?2
    LEFT JOIN itemDataValues date_value ON date_value.valueID = id_date.valueID
    LEFT JOIN itemData id_pub ON id_pub.itemID = ip.itemID AND id_pub.fieldID = ?3
    LEFT JOIN itemDataValues pub ON pub.valueID = id_pub.valueID
    LEFT JOIN (
        SELECT
            ic.itemID,
            GROUP_CONCAT(
                CASE
                    WHEN COALESCE(c.lastName, '') != '' AND COALESCE(c.firstName, '') != '' THEN c.lastName || ' ' || c.firstName
                    WHEN COALESCE(c.lastName, '') != '' THEN c.lastName
                    ELSE c.firstName
                END,
                ', ' ORDER BY ic.orderIndex
            ) AS value
        FROM itemCreators ic
        JOIN creators c ON c.creatorID = ic.creatorID
        JOIN creatorTypes ct ON ct.creatorTypeID = ic.creatorTypeID
        WHERE ct.creatorType = 'author'
        GROUP BY ic.itemID
    ) authors ON authors.itemID = ip.itemID
    WHERE ia.parentItemID IS NOT NULL
      AND ai.key IN ({keys})
";

/// A Zotero library on disk: its database and its storage directory.
#[derive(Debug, Clone)]
pub struct ZoteroLibrary {
    db_path: PathBuf,
    resolver: PathResolver,
}

impl ZoteroLibrary {
    pub fn new(db_path: impl Into<PathBuf>, storage_dir: impl Into<PathBuf>) -> Self {
        Self { db_path: db_path.into(), resolver: PathResolver::new(storage_dir) }
    }

    /// Look up the parent item metadata for each attachment key.
    ///
    /// Blank keys are ignored. When nothing remains, no snapshot is taken.
    /// Attachments without a parent item are left out of the result.
    pub fn load_attachment_meta(&self, keys: &BTreeSet<String>) -> Result<HashMap<String, AttachmentRecord>> {
        let keys: Vec<&str> = keys.iter().map(|k| k.trim()).filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let snapshot = Snapshot::create(&self.db_path)?;
        let conn = snapshot.open().map_err(lookup_error)?;
        let records = self.query(&conn, &keys).map_err(lookup_error)?;
        debug!(requested = keys.len(), found = records.len(), "attachment metadata loaded");
        Ok(records)
    }

    fn query(&self, conn: &Connection, keys: &[&str]) -> rusqlite::Result<HashMap<String, AttachmentRecord>> {
        // ?1..?3 are the field ids; keys follow from ?4
        let placeholders = (0..keys.len()).map(|i| format!("?{}", i + 4)).collect::<Vec<_>>().join(",");
        let sql = ATTACHMENT_METADATA_SQL.replace(KEYS_PLACEHOLDER, &placeholders);
        let mut stmt = conn.prepare(&sql)?;

        let field_ids = [TITLE_FIELD_ID, DATE_FIELD_ID, PUBLICATION_FIELD_ID].map(rusqlite::types::Value::Integer);
        let key_values = keys.iter().map(|k| rusqlite::types::Value::Text((*k).to_string()));
        let params = field_ids.into_iter().chain(key_values);

        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>("attachment_key")?,
                row.get::<_, Option<String>>("parent_title")?,
                row.get::<_, Option<String>>("authors")?,
                row.get::<_, Option<String>>("date")?,
                row.get::<_, Option<String>>("publication")?,
                row.get::<_, Option<String>>("raw_path")?,
            ))
        })?;

        let mut out = HashMap::new();
        for row in rows {
            let (key, parent_title, authors, date, publication, raw_path) = row?;
            let key = key.trim().to_string();
            if key.is_empty() {
                continue;
            }
            let parent_title = trimmed(parent_title);
            let record = AttachmentRecord {
                parent_title: if parent_title.is_empty() { UNTITLED_PARENT.to_string() } else { parent_title },
                authors: trimmed(authors),
                date: trimmed(date),
                publication: trimmed(publication),
                resolved_pdf_path: self.resolver.resolve(&trimmed(raw_path), &key),
            };
            out.insert(key, record);
        }
        Ok(out)
    }
}

impl MetadataSource for ZoteroLibrary {
    fn load_metadata(&self, keys: &BTreeSet<String>) -> Result<HashMap<String, AttachmentRecord>> {
        self.load_attachment_meta(keys)
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn lookup_error(err: rusqlite::Error) -> Error {
    Error::MetadataLookup(Box::new(err))
}
