//! Day × newspaper slot matrix and deterministic clip assignment.
//!
//! The user declares how many clips they expect per (calendar day, newspaper)
//! pair over a trailing 5-day window. Saved clips are auto-classified into
//! the first under-target slot, oldest day first, newspapers in canonical
//! display order; a bulk reassignment can later re-derive every clip's slot
//! from the declared counts and the catalog's display order.

use crate::catalog::ClipCatalog;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// The fixed newspaper set, in canonical display order.
///
/// The order drives both the counter table and slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum NewspaperCategory {
    /// 日本経済新聞 — the general economic daily
    Nikkei,
    /// 日本農業新聞 — the agriculture daily
    NihonNogyo,
    /// 日経MJ — marketing/retail sub-brand
    NikkeiMj,
    /// 商業施設新聞 — commercial facilities trade paper
    ShogyoShisetsu,
}

impl NewspaperCategory {
    /// All categories in canonical display order.
    pub const ALL: [NewspaperCategory; 4] = [
        NewspaperCategory::Nikkei,
        NewspaperCategory::NihonNogyo,
        NewspaperCategory::NikkeiMj,
        NewspaperCategory::ShogyoShisetsu,
    ];

    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            NewspaperCategory::Nikkei => "日本経済新聞",
            NewspaperCategory::NihonNogyo => "日本農業新聞",
            NewspaperCategory::NikkeiMj => "日経MJ",
            NewspaperCategory::ShogyoShisetsu => "商業施設新聞",
        }
    }

    /// Position in the canonical display order.
    pub fn display_order(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// A (calendar day, newspaper) classification slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Slot {
    /// Calendar day key
    pub date: NaiveDate,
    /// Newspaper category
    pub category: NewspaperCategory,
}

impl Slot {
    /// Create a new slot.
    pub fn new(date: NaiveDate, category: NewspaperCategory) -> Self {
        Self { date, category }
    }
}

/// User-declared target counts per (day, category).
///
/// Counts never go negative; decrementing at zero is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatrixCounts {
    counts: BTreeMap<NaiveDate, BTreeMap<NewspaperCategory, u32>>,
}

impl MatrixCounts {
    /// Create an empty matrix (all targets zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Target count for a (day, category) pair; absent entries are zero.
    pub fn get(&self, date: NaiveDate, category: NewspaperCategory) -> u32 {
        self.counts
            .get(&date)
            .and_then(|row| row.get(&category))
            .copied()
            .unwrap_or(0)
    }

    /// Increment a target count (uncapped).
    pub fn increment(&mut self, date: NaiveDate, category: NewspaperCategory) {
        *self
            .counts
            .entry(date)
            .or_default()
            .entry(category)
            .or_insert(0) += 1;
    }

    /// Decrement a target count, floored at zero.
    pub fn decrement(&mut self, date: NaiveDate, category: NewspaperCategory) {
        if let Some(count) = self.counts.get_mut(&date).and_then(|row| row.get_mut(&category)) {
            *count = count.saturating_sub(1);
        }
    }

    /// Sum of all targets inside a window.
    pub fn total_in(&self, window: &SlotWindow) -> u32 {
        window
            .days()
            .map(|d| {
                NewspaperCategory::ALL
                    .iter()
                    .map(|c| self.get(d, *c))
                    .sum::<u32>()
            })
            .sum()
    }
}

/// The trailing window of days slots are assigned over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    oldest: NaiveDate,
    newest: NaiveDate,
}

/// Window length in days (today plus the preceding days).
pub const WINDOW_DAYS: i64 = 5;

impl SlotWindow {
    /// The 5-day trailing window ending at `today`.
    pub fn trailing(today: NaiveDate) -> Self {
        Self {
            oldest: today - Duration::days(WINDOW_DAYS - 1),
            newest: today,
        }
    }

    /// Days oldest to newest.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let oldest = self.oldest;
        (0..(self.newest - self.oldest).num_days() + 1).map(move |i| oldest + Duration::days(i))
    }

    /// Newest day in the window ("today").
    pub fn today(&self) -> NaiveDate {
        self.newest
    }
}

/// First under-target slot, or the default on exhaustion.
///
/// Iterates days oldest to newest and categories in canonical order; the
/// first pair whose assigned count is below its target wins. When every
/// target is met, falls back to (today, first canonical category).
///
/// `assigned` reports how many clips currently occupy a slot.
pub fn next_slot<F>(counts: &MatrixCounts, window: &SlotWindow, assigned: F) -> Slot
where
    F: Fn(Slot) -> u32,
{
    for date in window.days() {
        for category in NewspaperCategory::ALL {
            let slot = Slot::new(date, category);
            let target = counts.get(date, category);
            if target > 0 && assigned(slot) < target {
                return slot;
            }
        }
    }
    Slot::new(window.today(), NewspaperCategory::ALL[0])
}

/// The complete ordered slot sequence implied by the matrix.
///
/// Each target `n` expands to `n` consecutive copies of its slot, days oldest
/// to newest, categories in canonical order within a day.
pub fn assignment_plan(counts: &MatrixCounts, window: &SlotWindow) -> Vec<Slot> {
    let mut plan = Vec::new();
    for date in window.days() {
        for category in NewspaperCategory::ALL {
            for _ in 0..counts.get(date, category) {
                plan.push(Slot::new(date, category));
            }
        }
    }
    plan
}

/// Reassign every clip to the slot sequence implied by the matrix.
///
/// The i-th clip in display order gets the i-th planned slot; clips beyond
/// the plan keep their prior assignment. Idempotent for unchanged counts and
/// clip order.
pub fn reassign_all(catalog: &mut ClipCatalog, counts: &MatrixCounts, window: &SlotWindow) {
    let plan = assignment_plan(counts, window);
    let updates: Vec<_> = catalog
        .iter()
        .zip(plan.iter())
        .map(|(clip, slot)| (clip.id, *slot))
        .collect();
    log::debug!(
        "Reassigning {} of {} clips from a {}-slot plan",
        updates.len(),
        catalog.len(),
        plan.len()
    );
    for (id, slot) in updates {
        catalog.set_slot(id, slot.date, slot.category);
    }
}

/// Convenience for auto-assignment at save time: counts occupancy from the
/// catalog itself.
pub fn next_slot_for_catalog(
    catalog: &ClipCatalog,
    counts: &MatrixCounts,
    window: &SlotWindow,
) -> Slot {
    next_slot(counts, window, |slot| {
        catalog
            .iter()
            .filter(|c| c.date == slot.date && c.category == slot.category)
            .count() as u32
    })
}
