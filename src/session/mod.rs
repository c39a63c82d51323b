//! Editing session: the glue a UI shell drives.
//!
//! Owns the document store, page view state, rectangle editor, clip catalog,
//! and slot matrix, and sequences the flows between them — save, re-edit,
//! selection changes, slot reassignment, export. The session holds no UI
//! state beyond the active tool; rendering and input stay in the shell.

use crate::catalog::{Clip, ClipCatalog, ClipId, ClipProvenance};
use crate::compositor::compose;
use crate::editor::{EditorMode, PageViewState, RectangleEditor};
use crate::error::{Error, Result};
use crate::export::{export_daily, share_text, Archiver, ExportArtifact, PdfAuthor};
use crate::rendering::{DocumentOpener, DocumentStore};
use crate::slots::{next_slot_for_catalog, reassign_all, MatrixCounts, SlotWindow};
use chrono::NaiveDate;

/// One user's editing session.
#[derive(Default)]
pub struct ClipSession {
    store: DocumentStore,
    view: PageViewState,
    mode: EditorMode,
    editor: RectangleEditor,
    catalog: ClipCatalog,
    counts: MatrixCounts,
    editing_clip: Option<ClipId>,
}

impl ClipSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The document store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Mutable document store (ticket invalidation from the shell).
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    /// Current page view state.
    pub fn view(&self) -> &PageViewState {
        &self.view
    }

    /// Mutable view state (rotation/zoom adjustments).
    pub fn view_mut(&mut self) -> &mut PageViewState {
        &mut self.view
    }

    /// The rectangle editor.
    pub fn editor(&self) -> &RectangleEditor {
        &self.editor
    }

    /// Mutable rectangle editor (pointer event delivery).
    pub fn editor_mut(&mut self) -> &mut RectangleEditor {
        &mut self.editor
    }

    /// The clip catalog.
    pub fn catalog(&self) -> &ClipCatalog {
        &self.catalog
    }

    /// Mutable clip catalog (title edits, reorder, analysis).
    pub fn catalog_mut(&mut self) -> &mut ClipCatalog {
        &mut self.catalog
    }

    /// The slot target matrix.
    pub fn counts(&self) -> &MatrixCounts {
        &self.counts
    }

    /// Mutable slot target matrix (increment/decrement actions).
    pub fn counts_mut(&mut self) -> &mut MatrixCounts {
        &mut self.counts
    }

    /// Active editing tool.
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Toggle a tool: selecting the active tool returns to view mode.
    pub fn toggle_mode(&mut self, mode: EditorMode) {
        self.mode = if self.mode == mode {
            EditorMode::View
        } else {
            mode
        };
    }

    /// Clip currently being re-edited, if any.
    pub fn editing_clip(&self) -> Option<ClipId> {
        self.editing_clip
    }

    /// Open a batch of uploaded files; unreadable ones are skipped.
    ///
    /// When nothing was selected yet, the first newly added document becomes
    /// the selection.
    pub fn add_files(&mut self, opener: &dyn DocumentOpener, files: &[(String, Vec<u8>)]) -> usize {
        let before = self.store.len();
        let added = self.store.add_files(opener, files);
        if self.view.file_index.is_none() && added > 0 {
            // select_file can't fail here: the index was just added.
            let _ = self.select_file(before);
        }
        added
    }

    /// Switch the selected document.
    ///
    /// Clears crop/masks, resets view state, abandons any re-edit, and
    /// invalidates outstanding render tickets.
    pub fn select_file(&mut self, index: usize) -> Result<()> {
        self.store.require(index)?;
        self.editing_clip = None;
        self.view.select_file(index);
        self.editor.clear();
        self.mode = EditorMode::View;
        self.store.invalidate();
        Ok(())
    }

    /// Step the current page by `delta` pages.
    ///
    /// A page change clears crop/masks and invalidates render tickets.
    /// Returns whether the page changed.
    pub fn change_page(&mut self, delta: i32) -> Result<bool> {
        let index = self.view.file_index.ok_or(Error::NoDocument)?;
        let page_count = self.store.require(index)?.page_count();
        let changed = self.view.change_page(delta, page_count);
        if changed {
            self.editor.clear();
            self.store.invalidate();
        }
        Ok(changed)
    }

    /// Compose the current crop/masks into a clip and store it.
    ///
    /// The crop rectangle and mask list are snapshotted before compositing,
    /// so edits made while the (potentially slow) render runs cannot leak
    /// into the saved clip. On a re-edit save the existing clip is replaced
    /// in place, keeping its title, scale, and slot; otherwise the new clip
    /// is appended with an auto-assigned slot.
    pub fn save_clip(&mut self, today: NaiveDate) -> Result<ClipId> {
        let file_index = self.view.file_index.ok_or(Error::NoDocument)?;
        let crop = self.editor.crop();
        if crop.is_empty() {
            return Err(Error::EmptyCropRect);
        }
        let masks = self.editor.masks().to_vec();
        let page_number = self.view.page_number;
        let rotation = self.view.rotation_degrees;

        let document = self.store.require(file_index)?;
        let image = compose(&*document.source, page_number, rotation, crop, &masks)?;
        let aspect_ratio = image.width as f64 / image.height.max(1) as f64;
        let provenance = ClipProvenance {
            file_index,
            page_number,
            crop,
            masks,
            rotation_degrees: rotation,
        };

        let id = match self.editing_clip.take().and_then(|id| self.catalog.get(id).cloned()) {
            Some(existing) => {
                let updated = Clip {
                    image,
                    aspect_ratio,
                    provenance,
                    ..existing
                };
                let id = updated.id;
                self.catalog.replace(updated);
                log::info!("Replaced clip {} in place", id.0);
                id
            }
            None => {
                let window = SlotWindow::trailing(today);
                let slot = next_slot_for_catalog(&self.catalog, &self.counts, &window);
                let id = self.catalog.allocate_id();
                self.catalog.push(Clip {
                    id,
                    image,
                    aspect_ratio,
                    title: String::new(),
                    display_scale_percent: 100,
                    date: slot.date,
                    category: slot.category,
                    analyzing: false,
                    provenance,
                });
                log::info!(
                    "Saved clip {} to slot {} / {}",
                    id.0,
                    slot.date,
                    slot.category.label()
                );
                id
            }
        };

        self.editor.clear();
        self.mode = EditorMode::View;
        self.view.zoom = 1.0;
        Ok(id)
    }

    /// Re-open a saved clip for editing.
    ///
    /// Re-seeds the view and editor from the clip's provenance; the next
    /// [`ClipSession::save_clip`] replaces the clip in place.
    pub fn edit_clip(&mut self, id: ClipId) -> Result<()> {
        let clip = self.catalog.get(id).ok_or(Error::UnknownClip(id.0))?;
        let provenance = clip.provenance.clone();
        self.store.require(provenance.file_index)?;
        self.view.file_index = Some(provenance.file_index);
        self.view.page_number = provenance.page_number;
        self.view.rotation_degrees = provenance.rotation_degrees;
        self.editor.seed(provenance.crop, provenance.masks);
        self.editing_clip = Some(id);
        self.mode = EditorMode::View;
        self.store.invalidate();
        Ok(())
    }

    /// Abandon an in-progress re-edit.
    pub fn cancel_edit(&mut self) {
        self.editing_clip = None;
    }

    /// Remove a clip; also abandons a re-edit that targeted it.
    pub fn remove_clip(&mut self, id: ClipId) {
        self.catalog.remove(id);
        if self.editing_clip == Some(id) {
            self.editing_clip = None;
        }
    }

    /// Re-derive every clip's slot from the matrix (see
    /// [`crate::slots::reassign_all`]).
    pub fn reassign_slots(&mut self, today: NaiveDate) {
        let window = SlotWindow::trailing(today);
        reassign_all(&mut self.catalog, &self.counts, &window);
    }

    /// Export the catalog as per-date PDFs (see
    /// [`crate::export::export_daily`]).
    pub fn export(
        &self,
        author: &dyn PdfAuthor,
        archiver: &dyn Archiver,
        file_name_prefix: &str,
    ) -> Result<ExportArtifact> {
        export_daily(&self.catalog, author, archiver, file_name_prefix)
    }

    /// Plain-text share summary of the catalog.
    pub fn share_text(&self, today: NaiveDate) -> String {
        share_text(&self.catalog, today)
    }
}
