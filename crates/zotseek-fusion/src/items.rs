//! Launcher items for one ranked document.
use std::path::Path;

use zotseek_core::types::{AttachmentRecord, ResponseItem, SidecarMeta, SimilarityHit};
use zotseek_zotero::open_pdf_url;

pub const NO_RESULTS_TITLE: &str = "No matching results";
pub const NO_RESULTS_SUBTITLE: &str = "Try different keywords.";

const FULL_DOCUMENT_PREFIX: &str = "Full PDF";
const OPEN_IN_APP_PREFIX: &str = "Open in Zotero";
const MISSING_PATH_NOTE: &str = "PDF path not found";
const MISSING_LINK_NOTE: &str = "Zotero link not found";
const UNTITLED: &str = "(untitled)";
const META_SEPARATOR: &str = " · ";
const PART_SEPARATOR: &str = " | ";

/// Everything known about one surviving hit when its items are built.
#[derive(Debug, Clone, Copy)]
pub struct DocumentView<'a> {
    pub rank: usize,
    pub hit: &'a SimilarityHit,
    pub attachment_key: Option<&'a str>,
    pub record: Option<&'a AttachmentRecord>,
    pub sidecar: Option<&'a SidecarMeta>,
}

impl DocumentView<'_> {
    /// The "open the file" item followed by the "open in Zotero" item.
    pub fn items(&self) -> [ResponseItem; 2] {
        let subtitle = self.base_subtitle();
        let pdf_path = self.pdf_path();
        let file_title = pdf_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.hit_title());

        let full = ResponseItem::info(file_title.clone(), format!("{FULL_DOCUMENT_PREFIX}{PART_SEPARATOR}{subtitle}"))
            .always_show_subtitle()
            .with_label(self.rank.to_string());
        let full = match pdf_path {
            Some(path) => full.with_path(path),
            None => full.append_subtitle(MISSING_PATH_NOTE),
        };

        let open = ResponseItem::info(file_title, format!("{OPEN_IN_APP_PREFIX}{PART_SEPARATOR}{subtitle}")).always_show_subtitle();
        let open = match self.zotero_url() {
            Some(url) => open.with_url(url),
            None => open.append_subtitle(MISSING_LINK_NOTE),
        };

        [full, open]
    }

    /// `paper title | score=0.1234 | authors · date · publication`
    pub fn base_subtitle(&self) -> String {
        let paper_title = self
            .record
            .map(|r| r.parent_title.as_str())
            .filter(|t| !t.is_empty())
            .map_or_else(|| self.hit_title(), str::to_string);
        let mut parts = vec![paper_title, format_score(self.hit.fusion_score)];
        if let Some(meta) = self.record.and_then(meta_line) {
            parts.push(meta);
        }
        parts.join(PART_SEPARATOR)
    }

    fn hit_title(&self) -> String {
        if !self.hit.title.is_empty() {
            return self.hit.title.clone();
        }
        Path::new(&self.hit.source_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    fn pdf_path(&self) -> Option<String> {
        self.record
            .and_then(|r| r.resolved_pdf_path.as_deref())
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| self.sidecar.and_then(|s| s.source_pdf.clone()))
            .filter(|p| !p.trim().is_empty())
    }

    fn zotero_url(&self) -> Option<String> {
        match self.attachment_key {
            Some(key) => Some(open_pdf_url(key)),
            None => self.sidecar.and_then(|s| s.external_link.clone()),
        }
    }
}

pub fn format_score(score: f64) -> String {
    format!("score={score:.4}")
}

/// Non-empty authors, date and publication joined by a middle dot.
fn meta_line(record: &AttachmentRecord) -> Option<String> {
    let parts: Vec<&str> = [record.authors.as_str(), record.date.as_str(), record.publication.as_str()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(META_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(pdf: Option<&str>) -> AttachmentRecord {
        AttachmentRecord {
            parent_title: "Paper One".into(),
            authors: "Doe J".into(),
            date: String::new(),
            publication: "Nature".into(),
            resolved_pdf_path: pdf.map(PathBuf::from),
        }
    }

    #[test]
    fn score_has_four_decimals() {
        assert_eq!(format_score(0.91), "score=0.9100");
        assert_eq!(format_score(1.0 / 3.0), "score=0.3333");
    }

    #[test]
    fn empty_meta_fields_are_skipped() {
        let hit = SimilarityHit::new("/i/K1.md", "K1", "T", 0.5);
        let rec = record(None);
        let view = DocumentView { rank: 1, hit: &hit, attachment_key: Some("K1"), record: Some(&rec), sidecar: None };
        assert_eq!(view.base_subtitle(), "Paper One | score=0.5000 | Doe J · Nature");

        let bare = AttachmentRecord { parent_title: "P".into(), ..AttachmentRecord::default() };
        let view = DocumentView { record: Some(&bare), ..view };
        assert_eq!(view.base_subtitle(), "P | score=0.5000");
    }

    #[test]
    fn unresolved_document_discloses_missing_path_and_link() {
        let hit = SimilarityHit::new("/i/notes.md", "", "", 0.25);
        let view = DocumentView { rank: 3, hit: &hit, attachment_key: None, record: None, sidecar: None };
        let [full, open] = view.items();

        assert_eq!(full.title(), "notes");
        assert_eq!(full.path(), None);
        assert!(full.subtitle().ends_with(MISSING_PATH_NOTE), "{}", full.subtitle());
        assert_eq!(full.label(), Some("3"));
        assert_eq!(open.url(), None);
        assert!(open.subtitle().ends_with(MISSING_LINK_NOTE), "{}", open.subtitle());
        assert!(!full.is_error() && !open.is_error());
    }

    #[test]
    fn sidecar_supplies_path_and_link() {
        let hit = SimilarityHit::new("/i/doc.md", "", "Doc", 0.7);
        let side = SidecarMeta {
            attachment_key: None,
            source_pdf: Some("/s/X/paper.pdf".into()),
            external_link: Some("zotero://select/library/items/X".into()),
        };
        let view = DocumentView { rank: 1, hit: &hit, attachment_key: None, record: None, sidecar: Some(&side) };
        let [full, open] = view.items();
        assert_eq!(full.title(), "paper.pdf");
        assert_eq!(full.quick_look_url(), Some("/s/X/paper.pdf"));
        assert_eq!(open.url(), Some("zotero://select/library/items/X"));
    }
}
