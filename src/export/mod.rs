//! Export pipeline: per-date PDF grouping, archive bundling, share text.
//!
//! PDF assembly itself is an external capability behind [`PdfAuthor`]; this
//! module owns everything deterministic around it — grouping clips by date,
//! ordering within a group, page layout math, artifact naming — plus a
//! zip-backed [`Archiver`] for multi-date exports.

use crate::catalog::{Clip, ClipCatalog};
use crate::error::{Error, Result};
use crate::slots::NewspaperCategory;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A4 page width in PDF points.
pub const A4_WIDTH: f64 = 595.28;
/// A4 page height in PDF points.
pub const A4_HEIGHT: f64 = 841.89;
/// Fixed margin on all page sides, points.
pub const PAGE_MARGIN: f64 = 20.0;

/// One output page: an image placed on a fixed-size page.
///
/// Coordinates are PDF points with the origin at the bottom-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPageSpec {
    /// Page width in points
    pub page_width: f64,
    /// Page height in points
    pub page_height: f64,
    /// JPEG bytes of the image to place
    pub image_jpeg: Vec<u8>,
    /// Image placement x (left), points
    pub image_x: f64,
    /// Image placement y (bottom), points
    pub image_y: f64,
    /// Placed image width, points
    pub image_width: f64,
    /// Placed image height, points
    pub image_height: f64,
}

/// External PDF-authoring capability.
pub trait PdfAuthor {
    /// Assemble one PDF from an ordered list of pages.
    ///
    /// Fails with [`Error::EncodeFailure`]; on failure no partial artifact
    /// exists.
    fn build(&self, pages: &[PdfPageSpec]) -> Result<Vec<u8>>;
}

/// A named file inside an export archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File name inside the archive
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Archive-bundling capability.
pub trait Archiver {
    /// Bundle named entries into a single archive's bytes.
    fn bundle(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;
}

/// Deflate-compressed zip [`Archiver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn bundle(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in entries {
            writer
                .start_file(&entry.name, options)
                .map_err(|e| Error::EncodeFailure(format!("zip entry '{}': {}", entry.name, e)))?;
            writer.write_all(&entry.bytes)?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| Error::EncodeFailure(format!("zip finalize: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// The export call's product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArtifact {
    /// A single merged PDF (exactly one date group)
    Pdf {
        /// Download file name
        file_name: String,
        /// PDF bytes
        bytes: Vec<u8>,
    },
    /// A zip of per-date PDFs (two or more date groups)
    Archive {
        /// Download file name
        file_name: String,
        /// Archive bytes
        bytes: Vec<u8>,
    },
}

impl ExportArtifact {
    /// The artifact's download file name.
    pub fn file_name(&self) -> &str {
        match self {
            ExportArtifact::Pdf { file_name, .. } | ExportArtifact::Archive { file_name, .. } => {
                file_name
            }
        }
    }
}

/// `2026.8.30`-style date, no zero padding.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}.{}.{}", date.year(), date.month(), date.day())
}

/// `8/30`-style short date.
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

/// Compute the page size and centered placement for one clip image.
///
/// The image's pixel dimensions are taken as points (72 dpi). Landscape
/// images get a landscape A4 page. The image is fit inside the margins and
/// further scaled by the clip's display-scale percent.
pub fn layout_page(image_width: u32, image_height: u32, display_scale_percent: u8) -> PdfPageSpec {
    let (img_w, img_h) = (image_width as f64, image_height as f64);
    let landscape = img_w > img_h;
    let (page_w, page_h) = if landscape {
        (A4_HEIGHT, A4_WIDTH)
    } else {
        (A4_WIDTH, A4_HEIGHT)
    };
    let avail_w = page_w - PAGE_MARGIN * 2.0;
    let avail_h = page_h - PAGE_MARGIN * 2.0;
    let base_scale = (avail_w / img_w).min(avail_h / img_h);
    let scale = base_scale * display_scale_percent as f64 / 100.0;
    let (draw_w, draw_h) = (img_w * scale, img_h * scale);
    PdfPageSpec {
        page_width: page_w,
        page_height: page_h,
        image_jpeg: Vec::new(),
        image_x: (page_w - draw_w) / 2.0,
        image_y: (page_h - draw_h) / 2.0,
        image_width: draw_w,
        image_height: draw_h,
    }
}

/// Clips grouped by date (ascending), each group stable-sorted by canonical
/// newspaper order.
fn group_by_date(catalog: &ClipCatalog) -> BTreeMap<NaiveDate, Vec<&Clip>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Clip>> = BTreeMap::new();
    for clip in catalog.iter() {
        groups.entry(clip.date).or_default().push(clip);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|c| c.category.display_order());
    }
    groups
}

fn build_group(author: &dyn PdfAuthor, clips: &[&Clip]) -> Result<Vec<u8>> {
    let pages: Vec<PdfPageSpec> = clips
        .iter()
        .map(|clip| {
            let mut page = layout_page(
                clip.image.width,
                clip.image.height,
                clip.display_scale_percent,
            );
            page.image_jpeg = clip.image.data.clone();
            page
        })
        .collect();
    author.build(&pages)
}

/// Export the catalog as one PDF per distinct date.
///
/// A single date group is returned directly as PDF bytes; multiple groups are
/// bundled into one archive with entries named `{prefix}{date}.pdf`. Fails
/// atomically: [`Error::EmptyCatalog`] with no clips, and any
/// author/archiver failure aborts with no partial artifact.
pub fn export_daily(
    catalog: &ClipCatalog,
    author: &dyn PdfAuthor,
    archiver: &dyn Archiver,
    file_name_prefix: &str,
) -> Result<ExportArtifact> {
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    let groups = group_by_date(catalog);
    log::info!(
        "Exporting {} clips across {} date group(s)",
        catalog.len(),
        groups.len()
    );

    let mut built: Vec<(NaiveDate, Vec<u8>)> = Vec::new();
    for (date, clips) in &groups {
        built.push((*date, build_group(author, clips)?));
    }

    if built.len() == 1 {
        let (date, bytes) = built.remove(0);
        return Ok(ExportArtifact::Pdf {
            file_name: format!("{}{}.pdf", file_name_prefix, format_date(date)),
            bytes,
        });
    }

    let entries: Vec<ArchiveEntry> = built
        .iter()
        .map(|(date, bytes)| ArchiveEntry {
            name: format!("{}{}.pdf", file_name_prefix, format_date(*date)),
            bytes: bytes.clone(),
        })
        .collect();
    let first = built.first().map(|(d, _)| *d).unwrap_or_default();
    let last = built.last().map(|(d, _)| *d).unwrap_or_default();
    let bytes = archiver.bundle(&entries)?;
    Ok(ExportArtifact::Archive {
        file_name: format!(
            "{}{}-{}.zip",
            file_name_prefix,
            format_date(first),
            format_date(last)
        ),
        bytes,
    })
}

/// Untitled-clip placeholder in share text.
const UNTITLED: &str = "無題";

/// Plain-text share summary of the catalog.
///
/// A header names the date or date range covered (omitted entirely when the
/// only date is `today`), followed by one block per newspaper category that
/// has clips, each clip listed as `・title（M/D）`.
pub fn share_text(catalog: &ClipCatalog, today: NaiveDate) -> String {
    let mut dates: Vec<NaiveDate> = catalog.iter().map(|c| c.date).collect();
    dates.sort();
    dates.dedup();

    let mut out = String::new();
    match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) if !(first == today && last == today) => {
            if first == last {
                out.push_str(&format!("{}分\n\n", format_short_date(first)));
            } else {
                out.push_str(&format!(
                    "{}〜{}分\n\n",
                    format_short_date(first),
                    format_short_date(last)
                ));
            }
        }
        _ => {}
    }

    let mut first_block = true;
    for category in NewspaperCategory::ALL {
        let clips: Vec<&Clip> = catalog.iter().filter(|c| c.category == category).collect();
        if clips.is_empty() {
            continue;
        }
        if !first_block {
            out.push('\n');
        }
        first_block = false;
        out.push_str(&format!("■{}\n", category.label()));
        for clip in clips {
            let title = if clip.title.is_empty() {
                UNTITLED
            } else {
                clip.title.as_str()
            };
            out.push_str(&format!(
                "・{}（{}）\n",
                title,
                format_short_date(clip.date)
            ));
        }
    }
    out
}
