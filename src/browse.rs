use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::catalog::title;
use crate::catalog::{Catalog, LoopRecord};
use crate::player::PlayerState;

/// Fixed page size of the loop table.
pub const LOOPS_PER_PAGE: usize = 7;

/// Half-open tempo range: `min <= tempo < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoRange {
    pub min: u32,
    pub max: u32,
}

impl TempoRange {
    pub fn contains(&self, tempo: u32) -> bool {
        tempo >= self.min && tempo < self.max
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("tempo range must be \"min-max\", got {0:?}")]
pub struct ParseTempoRangeError(String);

impl FromStr for TempoRange {
    type Err = ParseTempoRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTempoRangeError(s.to_string());
        let (min, max) = s.split_once('-').ok_or_else(err)?;
        Ok(Self {
            min: min.trim().parse().map_err(|_| err())?,
            max: max.trim().parse().map_err(|_| err())?,
        })
    }
}

impl fmt::Display for TempoRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One browsing filter. Every field is independently optional; an absent or
/// empty field is a predicate that always passes. Present predicates are
/// ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Case-insensitive substring match against the full title.
    pub search: Option<String>,
    /// Case-insensitive substring match against the derived note letter.
    pub note: Option<String>,
    /// Case-insensitive substring match against the derived key.
    pub key: Option<String>,
    /// Derived tempo must fall in this half-open range.
    pub tempo: Option<TempoRange>,
    /// Derived pack number must equal this exactly.
    pub pack: Option<u32>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        present(&self.search).is_none()
            && present(&self.note).is_none()
            && present(&self.key).is_none()
            && self.tempo.is_none()
            && self.pack.is_none()
    }

    fn matches(&self, record: &LoopRecord) -> bool {
        if let Some(search) = present(&self.search) {
            if !record.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }

        if let Some(note) = present(&self.note) {
            let matched = title::extract_note(&record.title)
                .is_some_and(|n| n.to_lowercase().contains(&note.to_lowercase()));
            if !matched {
                return false;
            }
        }

        if let Some(key) = present(&self.key) {
            let matched = title::extract_key(&record.title)
                .is_some_and(|k| k.to_lowercase().contains(&key.to_lowercase()));
            if !matched {
                return false;
            }
        }

        if let Some(range) = self.tempo {
            if !range.contains(title::extract_tempo(&record.title)) {
                return false;
            }
        }

        if let Some(pack) = self.pack {
            if title::extract_pack_number(&record.url) != pack {
                return false;
            }
        }

        true
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// The ordered subsequence of records satisfying every present predicate.
/// Filtering never reorders.
pub fn filter_loops(loops: &[LoopRecord], filters: &FilterSpec) -> Vec<LoopRecord> {
    loops.iter().filter(|l| filters.matches(l)).cloned().collect()
}

/// Number of pages needed for `total` filtered records.
pub fn page_count(total: usize) -> usize {
    total.div_ceil(LOOPS_PER_PAGE)
}

/// The records on a zero-based page. A page past the end is empty, not an
/// error.
pub fn page_slice(loops: &[LoopRecord], page: usize) -> &[LoopRecord] {
    let start = page.saturating_mul(LOOPS_PER_PAGE);
    if start >= loops.len() {
        return &[];
    }
    let end = (start + LOOPS_PER_PAGE).min(loops.len());
    &loops[start..end]
}

/// Stateful view over the flattened catalog: current filter, current page,
/// and the single playing loop. The page index resets to 0 whenever the
/// filter or the underlying catalog changes; a new filter invalidates the
/// user's position.
#[derive(Debug, Default)]
pub struct LoopBrowser {
    loops: Vec<LoopRecord>,
    pack_numbers: Vec<u32>,
    newest_pack: Option<u32>,
    filters: FilterSpec,
    filtered: Vec<LoopRecord>,
    page: usize,
    player: PlayerState,
}

impl LoopBrowser {
    pub fn new(catalog: &Catalog) -> Self {
        let mut browser = Self::default();
        browser.set_catalog(catalog);
        browser
    }

    /// Replace the underlying catalog, re-filtering and resetting the page.
    pub fn set_catalog(&mut self, catalog: &Catalog) {
        self.loops = catalog.all_loops();
        self.pack_numbers = catalog.pack_numbers();
        self.newest_pack = catalog.newest_pack();
        self.apply_filters();
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(FilterSpec::default());
    }

    fn apply_filters(&mut self) {
        self.filtered = filter_loops(&self.loops, &self.filters);
        self.page = 0;
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn filtered(&self) -> &[LoopRecord] {
        &self.filtered
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered.len())
    }

    /// Move to a zero-based page. Changing pages never alters the filtered
    /// set, and stops whatever was playing.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.player.stop();
    }

    /// The records visible on the current page.
    pub fn visible(&self) -> &[LoopRecord] {
        page_slice(&self.filtered, self.page)
    }

    /// All pack numbers known to the catalog, regardless of active filters.
    pub fn pack_numbers(&self) -> &[u32] {
        &self.pack_numbers
    }

    /// Display hint: is this record part of the newest pack? Computed
    /// against all known packs, never just the filtered subset.
    pub fn is_newest(&self, record: &LoopRecord) -> bool {
        self.newest_pack
            .is_some_and(|max| title::extract_pack_number(&record.url) == max)
    }

    pub fn play(&mut self, url: impl Into<String>) {
        self.player.play(url);
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }
}
