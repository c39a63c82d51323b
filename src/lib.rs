//! # PDF Clipper
//!
//! Clip rectangular regions out of rendered PDF pages, redact sub-regions
//! with opaque masks, arrange the clips into an ordered list, and re-export
//! them as merged per-date PDFs or share-ready text.
//!
//! ## Core Pieces
//!
//! - **Geometry** ([`geometry`]): normalized rectangles, resize handles, and
//!   hit-testing math. Rectangles live in resolution-independent `[0,1]` page
//!   space so they survive zoom, rotation, and page re-rendering.
//! - **Rectangle Editor** ([`editor`]): a pointer-driven state machine for
//!   drawing, moving, and resizing the crop rectangle and mask rectangles.
//! - **Clip Compositor** ([`compositor`]): deterministic pipeline turning a
//!   page raster + crop + masks + rotation into final JPEG bytes.
//! - **Clip Catalog** ([`catalog`]): ordered collection of saved clips with
//!   by-id apply-or-no-op mutations.
//! - **Slot Assignment** ([`slots`]): auto-classifies clips into (calendar
//!   day, newspaper) slots against user-declared target counts over a
//!   trailing 5-day window.
//! - **Export Pipeline** ([`export`]): per-date PDF grouping, page layout,
//!   zip bundling, and the share-text generator.
//! - **Inference Client** ([`inference`]): OpenRouter-style vision-model
//!   wrapper for title extraction and clip explanation.
//! - **Session** ([`session`]): the orchestration layer a UI shell drives.
//!
//! PDF decoding/rasterization and PDF authoring are external capabilities
//! behind the [`rendering::RenderSource`]/[`rendering::DocumentOpener`] and
//! [`export::PdfAuthor`] traits; this crate implements neither.
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_clipper::editor::{CanvasSize, EditorMode, PointerButton};
//! use pdf_clipper::geometry::Point;
//! use pdf_clipper::session::ClipSession;
//!
//! let mut session = ClipSession::new();
//! session.add_files(&opener, &uploaded);
//! session.toggle_mode(EditorMode::Crop);
//!
//! let canvas = CanvasSize::new(800.0, 1100.0);
//! let editor = session.editor_mut();
//! editor.pointer_down(Point::new(0.1, 0.1), EditorMode::Crop, PointerButton::Primary, canvas);
//! editor.pointer_move(Point::new(0.6, 0.4));
//! editor.pointer_up();
//!
//! let clip_id = session.save_clip(today)?;
//! let artifact = session.export(&author, &archiver, "【共有事項】")?;
//! ```

pub mod catalog;
pub mod compositor;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod inference;
pub mod rendering;
pub mod session;
pub mod slots;

pub use catalog::{Clip, ClipCatalog, ClipId, ClipProvenance};
pub use compositor::{compose, ComposedImage};
pub use config::{JsonSettingsStore, Settings, SettingsStore};
pub use editor::{EditorMode, Interaction, PageViewState, PointerButton, RectangleEditor};
pub use error::{Error, Result};
pub use export::{export_daily, share_text, ExportArtifact};
pub use geometry::{Handle, NormRect, Point};
pub use inference::{OpenRouterClient, VisionModel};
pub use rendering::{DocumentOpener, DocumentStore, PageRaster, RenderSource};
pub use session::ClipSession;
pub use slots::{MatrixCounts, NewspaperCategory, Slot, SlotWindow};
