//! Integration tests for the export pipeline and share-text generator.

use chrono::NaiveDate;
use pdf_clipper::catalog::{Clip, ClipCatalog, ClipProvenance};
use pdf_clipper::compositor::ComposedImage;
use pdf_clipper::error::{Error, Result};
use pdf_clipper::export::{
    export_daily, share_text, ExportArtifact, PdfAuthor, PdfPageSpec, ZipArchiver,
};
use pdf_clipper::geometry::NormRect;
use pdf_clipper::slots::NewspaperCategory;
use std::cell::RefCell;
use std::io::Cursor;

const PREFIX: &str = "【共有事項】";

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

fn push_clip(
    catalog: &mut ClipCatalog,
    title: &str,
    clip_date: NaiveDate,
    category: NewspaperCategory,
) {
    let id = catalog.allocate_id();
    catalog.push(Clip {
        id,
        image: ComposedImage {
            // Tag the bytes with the title so recorded pages are traceable.
            data: title.as_bytes().to_vec(),
            width: 300,
            height: 400,
            content_type: "image/jpeg".to_string(),
        },
        aspect_ratio: 0.75,
        title: title.to_string(),
        display_scale_percent: 100,
        date: clip_date,
        category,
        analyzing: false,
        provenance: ClipProvenance {
            file_index: 0,
            page_number: 1,
            crop: NormRect::new(0.1, 0.1, 0.5, 0.5),
            masks: vec![],
            rotation_degrees: 0.0,
        },
    });
}

/// Records every build call; each PDF's bytes are the page count.
#[derive(Default)]
struct RecordingAuthor {
    calls: RefCell<Vec<Vec<PdfPageSpec>>>,
}

impl PdfAuthor for RecordingAuthor {
    fn build(&self, pages: &[PdfPageSpec]) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(pages.to_vec());
        Ok(vec![pages.len() as u8])
    }
}

struct FailingAuthor;

impl PdfAuthor for FailingAuthor {
    fn build(&self, _pages: &[PdfPageSpec]) -> Result<Vec<u8>> {
        Err(Error::EncodeFailure("author unavailable".to_string()))
    }
}

mod export_tests {
    use super::*;

    #[test]
    fn test_empty_catalog_rejected() {
        let catalog = ClipCatalog::new();
        let err = export_daily(&catalog, &RecordingAuthor::default(), &ZipArchiver, PREFIX)
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog));
    }

    #[test]
    fn test_single_date_yields_pdf() {
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "a", date(8, 3), NewspaperCategory::Nikkei);
        push_clip(&mut catalog, "b", date(8, 3), NewspaperCategory::NikkeiMj);

        let author = RecordingAuthor::default();
        let artifact = export_daily(&catalog, &author, &ZipArchiver, PREFIX).unwrap();
        match artifact {
            ExportArtifact::Pdf { file_name, bytes } => {
                assert_eq!(file_name, "【共有事項】2026.8.3.pdf");
                assert_eq!(bytes, vec![2]);
            }
            other => panic!("expected a single PDF, got {:?}", other.file_name()),
        }
        assert_eq!(author.calls.borrow().len(), 1);
    }

    #[test]
    fn test_multiple_dates_grouped_and_ordered() {
        let mut catalog = ClipCatalog::new();
        // Two clips on 8/1 inserted in reverse canonical order, one on 8/2.
        push_clip(&mut catalog, "mj", date(8, 1), NewspaperCategory::NikkeiMj);
        push_clip(&mut catalog, "nikkei", date(8, 1), NewspaperCategory::Nikkei);
        push_clip(&mut catalog, "solo", date(8, 2), NewspaperCategory::Nikkei);

        let author = RecordingAuthor::default();
        let artifact = export_daily(&catalog, &author, &ZipArchiver, PREFIX).unwrap();
        assert!(matches!(artifact, ExportArtifact::Archive { .. }));
        assert_eq!(
            artifact.file_name(),
            "【共有事項】2026.8.1-2026.8.2.zip"
        );

        let calls = author.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[1].len(), 1);
        // Within 8/1 the Nikkei clip must precede the NikkeiMj clip.
        assert_eq!(calls[0][0].image_jpeg, b"nikkei");
        assert_eq!(calls[0][1].image_jpeg, b"mj");
    }

    #[test]
    fn test_archive_entry_names() {
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "a", date(8, 1), NewspaperCategory::Nikkei);
        push_clip(&mut catalog, "b", date(8, 2), NewspaperCategory::Nikkei);

        let artifact =
            export_daily(&catalog, &RecordingAuthor::default(), &ZipArchiver, PREFIX).unwrap();
        let ExportArtifact::Archive { bytes, .. } = artifact else {
            panic!("expected an archive");
        };

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["【共有事項】2026.8.1.pdf", "【共有事項】2026.8.2.pdf"]
        );
    }

    #[test]
    fn test_author_failure_aborts_export() {
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "a", date(8, 1), NewspaperCategory::Nikkei);
        push_clip(&mut catalog, "b", date(8, 2), NewspaperCategory::Nikkei);
        let err = export_daily(&catalog, &FailingAuthor, &ZipArchiver, PREFIX).unwrap_err();
        assert!(matches!(err, Error::EncodeFailure(_)));
    }
}

mod share_text_tests {
    use super::*;

    #[test]
    fn test_header_omitted_when_only_today() {
        let today = date(8, 30);
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "記事A", today, NewspaperCategory::Nikkei);

        let text = share_text(&catalog, today);
        assert_eq!(text, "■日本経済新聞\n・記事A（8/30）\n");
    }

    #[test]
    fn test_single_other_date_header() {
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "記事A", date(8, 2), NewspaperCategory::Nikkei);

        let text = share_text(&catalog, date(8, 30));
        assert!(text.starts_with("8/2分\n\n"));
    }

    #[test]
    fn test_date_range_header() {
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "a", date(8, 2), NewspaperCategory::Nikkei);
        push_clip(&mut catalog, "b", date(8, 3), NewspaperCategory::NikkeiMj);

        let text = share_text(&catalog, date(8, 30));
        assert!(text.starts_with("8/2〜8/3分\n\n"));
    }

    #[test]
    fn test_blocks_in_canonical_order_with_untitled_placeholder() {
        let today = date(8, 30);
        let mut catalog = ClipCatalog::new();
        push_clip(&mut catalog, "", today, NewspaperCategory::NikkeiMj);
        push_clip(&mut catalog, "農業記事", today, NewspaperCategory::NihonNogyo);

        let text = share_text(&catalog, today);
        assert_eq!(
            text,
            "■日本農業新聞\n・農業記事（8/30）\n\n■日経MJ\n・無題（8/30）\n"
        );
    }

    #[test]
    fn test_empty_catalog_yields_empty_text() {
        let catalog = ClipCatalog::new();
        assert_eq!(share_text(&catalog, date(8, 30)), "");
    }
}
