//! Ordered catalog of saved clips.
//!
//! The catalog exclusively owns its clip list. Insertion order is meaningful
//! (it is the export/display order) and user-reorderable. Every mutation is
//! keyed by clip id and applies-or-no-ops, so a completion arriving after the
//! clip was reordered or deleted cannot corrupt the list.

use crate::compositor::ComposedImage;
use crate::geometry::NormRect;
use crate::slots::NewspaperCategory;
use chrono::{NaiveDate, Utc};

/// Bounds for a clip's user-adjustable display scale (percent).
pub const SCALE_MIN: u8 = 10;
/// Upper display-scale bound.
pub const SCALE_MAX: u8 = 100;

/// Unique, monotonically increasing clip identifier.
///
/// Time-seeded (milliseconds since epoch) and bumped past the previous id so
/// two saves within the same millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ClipId(pub u64);

/// Where a clip came from, kept to support re-opening it for re-edit.
///
/// Immutable once the clip is created.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipProvenance {
    /// Index of the source document in the store
    pub file_index: usize,
    /// 1-based page number
    pub page_number: u32,
    /// Crop rectangle at save time
    pub crop: NormRect,
    /// Mask list at save time
    pub masks: Vec<NormRect>,
    /// Rotation at save time, degrees
    pub rotation_degrees: f64,
}

/// A saved clip.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Clip {
    /// Unique id
    pub id: ClipId,
    /// Composed image bytes and dimensions
    pub image: ComposedImage,
    /// Width/height ratio of the crop (landscape when `> 1`)
    pub aspect_ratio: f64,
    /// User- or AI-assigned title (empty when untitled)
    pub title: String,
    /// Display scale percent, 10–100
    pub display_scale_percent: u8,
    /// Assigned calendar day
    pub date: NaiveDate,
    /// Assigned newspaper category
    pub category: NewspaperCategory,
    /// Whether an inference request for this clip is outstanding
    pub analyzing: bool,
    /// Re-edit provenance
    pub provenance: ClipProvenance,
}

/// Insertion-ordered collection of saved clips.
#[derive(Debug, Default)]
pub struct ClipCatalog {
    clips: Vec<Clip>,
    last_id: u64,
}

impl ClipCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next clip id.
    pub fn allocate_id(&mut self) -> ClipId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(self.last_id + 1);
        ClipId(self.last_id)
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the catalog has no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Iterate clips in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    /// Borrow a clip by id.
    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Append a new clip at the end of the list.
    ///
    /// New clips are never inserted out of order.
    pub fn push(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    /// Replace a clip in place (re-edit save), keyed by id.
    ///
    /// Returns whether a clip with that id existed.
    pub fn replace(&mut self, clip: Clip) -> bool {
        match self.clips.iter_mut().find(|c| c.id == clip.id) {
            Some(slot) => {
                *slot = clip;
                true
            }
            None => false,
        }
    }

    /// Remove a clip by id.
    pub fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let index = self.clips.iter().position(|c| c.id == id)?;
        Some(self.clips.remove(index))
    }

    /// Move the clip at `from` to position `to` (drag reorder).
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from < self.clips.len() && to < self.clips.len() && from != to {
            let clip = self.clips.remove(from);
            self.clips.insert(to, clip);
        }
    }

    /// Set a clip's title; no-op for unknown ids.
    pub fn set_title(&mut self, id: ClipId, title: impl Into<String>) {
        if let Some(clip) = self.get_mut(id) {
            clip.title = title.into();
        }
    }

    /// Set a clip's display scale, clamped to `[SCALE_MIN, SCALE_MAX]`.
    pub fn set_scale(&mut self, id: ClipId, percent: u8) {
        if let Some(clip) = self.get_mut(id) {
            clip.display_scale_percent = percent.clamp(SCALE_MIN, SCALE_MAX);
        }
    }

    /// Set a clip's (date, category) slot; no-op for unknown ids.
    pub fn set_slot(&mut self, id: ClipId, date: NaiveDate, category: NewspaperCategory) {
        if let Some(clip) = self.get_mut(id) {
            clip.date = date;
            clip.category = category;
        }
    }

    /// Latch an inference request for a clip.
    ///
    /// Returns `false` (and fires nothing) when the clip is unknown or a
    /// request for it is already outstanding, so concurrent re-invocation is
    /// rejected harmlessly rather than racing.
    pub fn begin_analysis(&mut self, id: ClipId) -> bool {
        match self.get_mut(id) {
            Some(clip) if !clip.analyzing => {
                clip.analyzing = true;
                true
            }
            Some(_) => {
                log::debug!("Analysis already in flight for clip {}", id.0);
                false
            }
            None => false,
        }
    }

    /// Release the analysis latch, optionally applying a new title.
    ///
    /// Safe against out-of-order completion: if the clip was deleted in the
    /// meantime this is a no-op.
    pub fn end_analysis(&mut self, id: ClipId, title: Option<String>) {
        if let Some(clip) = self.get_mut(id) {
            clip.analyzing = false;
            if let Some(title) = title {
                clip.title = title;
            }
        }
    }

    /// Ids in current display order (stable snapshot for batch operations).
    pub fn ids(&self) -> Vec<ClipId> {
        self.clips.iter().map(|c| c.id).collect()
    }

    fn get_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_clip(catalog: &mut ClipCatalog) -> Clip {
        Clip {
            id: catalog.allocate_id(),
            image: ComposedImage {
                data: vec![0xFF, 0xD8],
                width: 100,
                height: 50,
                content_type: "image/jpeg".to_string(),
            },
            aspect_ratio: 2.0,
            title: String::new(),
            display_scale_percent: 100,
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            category: NewspaperCategory::Nikkei,
            analyzing: false,
            provenance: ClipProvenance {
                file_index: 0,
                page_number: 1,
                crop: NormRect::new(0.1, 0.1, 0.5, 0.5),
                masks: vec![],
                rotation_degrees: 0.0,
            },
        }
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut catalog = ClipCatalog::new();
        let a = catalog.allocate_id();
        let b = catalog.allocate_id();
        let c = catalog.allocate_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut catalog = ClipCatalog::new();
        let first = test_clip(&mut catalog);
        let second = test_clip(&mut catalog);
        let first_id = first.id;
        catalog.push(first.clone());
        catalog.push(second);

        let mut updated = first;
        updated.title = "updated".to_string();
        assert!(catalog.replace(updated));
        assert_eq!(catalog.iter().next().unwrap().id, first_id);
        assert_eq!(catalog.iter().next().unwrap().title, "updated");
    }

    #[test]
    fn test_analysis_latch_rejects_reentry() {
        let mut catalog = ClipCatalog::new();
        let clip = test_clip(&mut catalog);
        let id = clip.id;
        catalog.push(clip);

        assert!(catalog.begin_analysis(id));
        assert!(!catalog.begin_analysis(id));
        catalog.end_analysis(id, Some("title".to_string()));
        assert!(!catalog.get(id).unwrap().analyzing);
        assert!(catalog.begin_analysis(id));
    }

    #[test]
    fn test_late_completion_noops_after_delete() {
        let mut catalog = ClipCatalog::new();
        let clip = test_clip(&mut catalog);
        let id = clip.id;
        catalog.push(clip);
        assert!(catalog.begin_analysis(id));
        catalog.remove(id);
        catalog.end_analysis(id, Some("ghost".to_string()));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_reorder_moves_clip() {
        let mut catalog = ClipCatalog::new();
        let a = test_clip(&mut catalog);
        let b = test_clip(&mut catalog);
        let c = test_clip(&mut catalog);
        let (ia, ib, ic) = (a.id, b.id, c.id);
        catalog.push(a);
        catalog.push(b);
        catalog.push(c);
        catalog.reorder(2, 0);
        assert_eq!(catalog.ids(), vec![ic, ia, ib]);
    }

    #[test]
    fn test_scale_clamped() {
        let mut catalog = ClipCatalog::new();
        let clip = test_clip(&mut catalog);
        let id = clip.id;
        catalog.push(clip);
        catalog.set_scale(id, 5);
        assert_eq!(catalog.get(id).unwrap().display_scale_percent, SCALE_MIN);
        catalog.set_scale(id, 200);
        assert_eq!(catalog.get(id).unwrap().display_scale_percent, SCALE_MAX);
    }
}
