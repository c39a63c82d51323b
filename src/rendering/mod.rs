//! Page raster adapter: the seam to the external PDF renderer.
//!
//! This crate does not decode or rasterize PDFs itself. A backend (pdf.js in
//! a browser shell, pdfium on desktop, a fixture in tests) implements
//! [`DocumentOpener`] and [`RenderSource`], and everything downstream works
//! on the returned [`PageRaster`] pixels.
//!
//! Rotation is the renderer's job: `render_page` returns the raster with the
//! requested rotation already baked in, sized to the axis-aligned bounding
//! box of the rotated page (see [`crate::geometry::rotated_raster_size`]).

use crate::error::{Error, Result};
use image::RgbaImage;

/// Fixed compose scale for export-quality rasters, independent of the
/// on-screen zoom.
pub const EXPORT_SCALE: f64 = 3.0;

/// A rendered page raster (RGBA pixels, rotation baked in).
#[derive(Debug, Clone)]
pub struct PageRaster {
    image: RgbaImage,
}

impl PageRaster {
    /// Wrap an RGBA buffer.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Render capability for one opened document.
pub trait RenderSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Rasterize a page (1-based) at `scale` with `rotation_degrees` applied
    /// around the page center.
    ///
    /// Fails with [`Error::PageOutOfRange`] for a page number past the
    /// document, and [`Error::RenderFailure`] when the backend cannot
    /// produce the raster.
    fn render_page(&self, page_number: u32, scale: f64, rotation_degrees: f64)
        -> Result<PageRaster>;
}

/// Decode capability: raw bytes in, a renderable document out.
pub trait DocumentOpener {
    /// Open raw PDF bytes.
    ///
    /// Fails with [`Error::DecodeFailure`] for unreadable/non-PDF input.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderSource>>;
}

/// One opened document in the store.
pub struct LoadedDocument {
    /// Display name (usually the uploaded file name)
    pub name: String,
    /// Render backend for this document
    pub source: Box<dyn RenderSource>,
}

impl LoadedDocument {
    /// Page count, delegated to the backend.
    pub fn page_count(&self) -> u32 {
        self.source.page_count()
    }
}

/// Generation stamp captured when an asynchronous render is requested.
///
/// A page or document switch invalidates all earlier tickets; a completion
/// holding a stale ticket must discard its raster instead of painting it
/// over the new selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

/// Ordered collection of opened documents.
///
/// Owns the decode-failure policy: a batch of uploads skips unreadable files
/// and keeps the rest.
#[derive(Default)]
pub struct DocumentStore {
    docs: Vec<LoadedDocument>,
    generation: u64,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and append a batch of files; unreadable ones are skipped.
    ///
    /// Returns the number of documents actually added.
    pub fn add_files(&mut self, opener: &dyn DocumentOpener, files: &[(String, Vec<u8>)]) -> usize {
        let mut added = 0;
        for (name, bytes) in files {
            match opener.open(bytes) {
                Ok(source) => {
                    log::info!("Opened document '{}'", name);
                    self.docs.push(LoadedDocument {
                        name: name.clone(),
                        source,
                    });
                    added += 1;
                }
                Err(e) => {
                    log::warn!("Skipping '{}': {}", name, e);
                }
            }
        }
        added
    }

    /// Number of opened documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Borrow a document by index.
    pub fn get(&self, index: usize) -> Option<&LoadedDocument> {
        self.docs.get(index)
    }

    /// Borrow a document or fail with [`Error::NoDocument`].
    pub fn require(&self, index: usize) -> Result<&LoadedDocument> {
        self.docs.get(index).ok_or(Error::NoDocument)
    }

    /// Iterate documents in upload order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedDocument> {
        self.docs.iter()
    }

    /// Ticket for a render requested against the current selection.
    pub fn current_ticket(&self) -> RenderTicket {
        RenderTicket(self.generation)
    }

    /// Invalidate all outstanding tickets (selection changed).
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether a previously captured ticket is still current.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.generation
    }
}
