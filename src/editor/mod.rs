//! Pointer-driven rectangle editor.
//!
//! The editor is a reducer: pointer events go in, the crop rectangle and mask
//! list come out. It owns exactly one crop rectangle and any number of mask
//! rectangles, all in normalized page space, and a single in-flight
//! [`Interaction`]. No operation suspends; every handler completes within one
//! event turn.
//!
//! ## Interaction lifecycle
//!
//! 1. `pointer_down` hit-tests existing rectangles. A handle grab starts
//!    `Resizing`, a body grab starts `Moving`, a miss starts `Creating` a new
//!    zero-size rectangle anchored at the pointer.
//! 2. `pointer_move` updates the target from a snapshot of its pre-drag
//!    geometry plus the total pointer delta, never from cumulative deltas.
//! 3. `pointer_up` discards a freshly created rectangle that is too small to
//!    be intentional, and always returns to `Interaction::None`.

use crate::geometry::{
    hit_body, hit_handle, resize, Handle, NormRect, Point, HANDLE_RADIUS_PX,
};

/// Which rectangle class a pointer interaction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectTarget {
    /// The single crop rectangle
    Crop,
    /// A mask rectangle, by index into the mask list
    Mask(usize),
}

/// The editor's current pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    /// No drag in progress
    #[default]
    None,
    /// Drawing a new rectangle from a fixed anchor
    Creating {
        /// Rectangle being created
        target: RectTarget,
    },
    /// Translating an existing rectangle
    Moving {
        /// Rectangle being moved
        target: RectTarget,
    },
    /// Adjusting one or two edges of an existing rectangle
    Resizing {
        /// Rectangle being resized
        target: RectTarget,
        /// Which edges the drag adjusts
        handle: Handle,
    },
}

/// Active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    /// Pan/inspect only, pointer input ignored
    #[default]
    View,
    /// Draw/adjust the crop rectangle
    Crop,
    /// Draw/adjust mask rectangles
    Mask,
}

/// Pointer button that started a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left/primary button
    Primary,
    /// Right/secondary button
    Secondary,
}

/// Resolve the mode a pointer-down actually edits in.
///
/// A secondary-button drag always draws masks, regardless of the active tool;
/// the primary button uses the active tool unchanged.
pub fn effective_mode(mode: EditorMode, button: PointerButton) -> EditorMode {
    match button {
        PointerButton::Secondary => EditorMode::Mask,
        PointerButton::Primary => mode,
    }
}

/// Canvas dimensions in pixels, needed to express the fixed-pixel handle grab
/// radius in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl CanvasSize {
    /// Create a new canvas size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The rectangle editor state machine.
///
/// Owns the in-progress crop rectangle and mask list. These are transient
/// editing state; they become part of a clip only when the session saves them.
#[derive(Debug, Default)]
pub struct RectangleEditor {
    crop: NormRect,
    masks: Vec<NormRect>,
    interaction: Interaction,
    start_pos: Point,
    initial_rect: Option<NormRect>,
}

impl RectangleEditor {
    /// Create an empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current crop rectangle ([`NormRect::EMPTY`] when unset).
    pub fn crop(&self) -> NormRect {
        self.crop
    }

    /// Current mask list, oldest first.
    pub fn masks(&self) -> &[NormRect] {
        &self.masks
    }

    /// Current interaction.
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Seed the editor from a saved clip's rectangles for re-editing.
    pub fn seed(&mut self, crop: NormRect, masks: Vec<NormRect>) {
        self.crop = crop;
        self.masks = masks;
        self.interaction = Interaction::None;
        self.initial_rect = None;
    }

    /// Clear crop and masks (page or document switch).
    pub fn clear(&mut self) {
        self.seed(NormRect::EMPTY, Vec::new());
    }

    /// Remove a single mask by index (the overlay's delete affordance).
    pub fn remove_mask(&mut self, index: usize) {
        if index < self.masks.len() {
            self.masks.remove(index);
        }
    }

    /// Pure hover query: which resize handle (if any) the pointer is over.
    ///
    /// Drives the cursor affordance while idle; hit priority matches
    /// [`RectangleEditor::pointer_down`].
    pub fn hover_handle(&self, pos: Point, mode: EditorMode, canvas: CanvasSize) -> Option<Handle> {
        let (px, py) = (pos.x * canvas.width, pos.y * canvas.height);
        match mode {
            EditorMode::View => None,
            EditorMode::Crop => {
                hit_handle(&self.crop, px, py, canvas.width, canvas.height, HANDLE_RADIUS_PX)
            }
            EditorMode::Mask => self.masks.iter().rev().find_map(|m| {
                hit_handle(m, px, py, canvas.width, canvas.height, HANDLE_RADIUS_PX)
            }),
        }
    }

    /// Begin an interaction at a pointer-down.
    ///
    /// Masks are hit-tested newest-first so the top-most (last-drawn) mask
    /// wins overlaps. Returns the interaction that was started.
    pub fn pointer_down(
        &mut self,
        pos: Point,
        mode: EditorMode,
        button: PointerButton,
        canvas: CanvasSize,
    ) -> Interaction {
        let pos = pos.clamped();
        let mode = effective_mode(mode, button);
        if mode == EditorMode::View {
            return Interaction::None;
        }
        let (px, py) = (pos.x * canvas.width, pos.y * canvas.height);

        let hit = match mode {
            EditorMode::Mask => self.hit_masks(px, py, canvas),
            EditorMode::Crop => self.hit_crop(px, py, canvas),
            EditorMode::View => unreachable!(),
        };

        self.start_pos = pos;
        match hit {
            Interaction::Moving { target } | Interaction::Resizing { target, .. } => {
                self.initial_rect = Some(self.target_rect(target));
            }
            Interaction::Creating { target } => {
                let anchor = NormRect::new(pos.x, pos.y, 0.0, 0.0);
                self.initial_rect = Some(anchor);
                match target {
                    RectTarget::Crop => self.crop = anchor,
                    RectTarget::Mask(_) => self.masks.push(anchor),
                }
            }
            Interaction::None => {}
        }
        self.interaction = hit;
        hit
    }

    /// Advance the current interaction to a new pointer position.
    ///
    /// After every update the target rectangle has non-negative extents and
    /// lies inside the unit square.
    pub fn pointer_move(&mut self, pos: Point) {
        let Some(initial) = self.initial_rect else {
            return;
        };
        let pos = pos.clamped();
        let dx = pos.x - self.start_pos.x;
        let dy = pos.y - self.start_pos.y;

        let (target, updated) = match self.interaction {
            Interaction::None => return,
            Interaction::Moving { target } => (target, initial.translated(dx, dy)),
            Interaction::Resizing { target, handle } => (target, resize(initial, handle, dx, dy)),
            Interaction::Creating { target } => (target, NormRect::from_drag(self.start_pos, pos)),
        };
        let updated = updated.clamped_to_page();
        match target {
            RectTarget::Crop => self.crop = updated,
            RectTarget::Mask(i) => {
                if let Some(slot) = self.masks.get_mut(i) {
                    *slot = updated;
                }
            }
        }
    }

    /// Finish the current interaction at pointer-up.
    ///
    /// A created rectangle below the minimum size in either axis is discarded:
    /// a mask is removed from the list, the crop rectangle resets to empty.
    pub fn pointer_up(&mut self) {
        if let Interaction::Creating { target } = self.interaction {
            match target {
                RectTarget::Mask(i) => {
                    if self.masks.get(i).is_some_and(|m| !m.is_intentional()) {
                        self.masks.remove(i);
                    }
                }
                RectTarget::Crop => {
                    if !self.crop.is_intentional() {
                        self.crop = NormRect::EMPTY;
                    }
                }
            }
        }
        self.interaction = Interaction::None;
        self.initial_rect = None;
    }

    fn target_rect(&self, target: RectTarget) -> NormRect {
        match target {
            RectTarget::Crop => self.crop,
            RectTarget::Mask(i) => self.masks[i],
        }
    }

    fn hit_masks(&self, px: f64, py: f64, canvas: CanvasSize) -> Interaction {
        for (i, mask) in self.masks.iter().enumerate().rev() {
            if let Some(handle) =
                hit_handle(mask, px, py, canvas.width, canvas.height, HANDLE_RADIUS_PX)
            {
                return Interaction::Resizing {
                    target: RectTarget::Mask(i),
                    handle,
                };
            }
            if hit_body(mask, px, py, canvas.width, canvas.height) {
                return Interaction::Moving {
                    target: RectTarget::Mask(i),
                };
            }
        }
        Interaction::Creating {
            target: RectTarget::Mask(self.masks.len()),
        }
    }

    fn hit_crop(&self, px: f64, py: f64, canvas: CanvasSize) -> Interaction {
        if !self.crop.is_empty() {
            if let Some(handle) =
                hit_handle(&self.crop, px, py, canvas.width, canvas.height, HANDLE_RADIUS_PX)
            {
                return Interaction::Resizing {
                    target: RectTarget::Crop,
                    handle,
                };
            }
            if hit_body(&self.crop, px, py, canvas.width, canvas.height) {
                return Interaction::Moving {
                    target: RectTarget::Crop,
                };
            }
        }
        Interaction::Creating {
            target: RectTarget::Crop,
        }
    }
}

/// Zoom bounds for the page view.
pub const MIN_ZOOM: f64 = 0.5;
/// Upper zoom bound.
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom wheel/button step.
pub const ZOOM_STEP: f64 = 0.05;

/// View state for the currently displayed page.
///
/// Rotation is continuous degrees, not limited to multiples of 90, and is
/// applied only when a raster is produced; rectangles always live in
/// unrotated page space.
#[derive(Debug, Clone, PartialEq)]
pub struct PageViewState {
    /// Selected document index, if any
    pub file_index: Option<usize>,
    /// Current 1-based page number
    pub page_number: u32,
    /// Rotation in degrees
    pub rotation_degrees: f64,
    /// Display zoom factor
    pub zoom: f64,
}

impl Default for PageViewState {
    fn default() -> Self {
        Self {
            file_index: None,
            page_number: 1,
            rotation_degrees: 0.0,
            zoom: 1.0,
        }
    }
}

impl PageViewState {
    /// Create a fresh view state with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a document, resetting page, rotation, and zoom.
    pub fn select_file(&mut self, index: usize) {
        self.file_index = Some(index);
        self.page_number = 1;
        self.rotation_degrees = 0.0;
        self.zoom = 1.0;
    }

    /// Step the page number by `delta`, clamped to `1..=page_count`.
    ///
    /// Returns whether the page actually changed.
    pub fn change_page(&mut self, delta: i32, page_count: u32) -> bool {
        let next = self.page_number as i64 + delta as i64;
        if next >= 1 && next <= page_count as i64 && next != self.page_number as i64 {
            self.page_number = next as u32;
            true
        } else {
            false
        }
    }

    /// Adjust rotation by a delta in degrees, kept to one decimal place the
    /// way the slider reports it.
    pub fn rotate_by(&mut self, delta: f64) {
        self.rotation_degrees = ((self.rotation_degrees + delta) * 10.0).round() / 10.0;
    }

    /// Step zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_by(&mut self, steps: i32) {
        self.zoom = (self.zoom + steps as f64 * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
