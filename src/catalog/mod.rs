pub mod cache;
pub mod fetch;
pub mod title;

use serde::{Deserialize, Serialize};

/// A single downloadable loop as published in the catalog document.
/// The title is free text, conventionally ending in `"<NN>bpm <key>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopRecord {
    pub url: String,
    pub title: String,
}

/// A released bundle of loops. Pack numbers are strings in the document
/// (the generator writes them from integers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRecord {
    pub pack_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_url: Option<String>,
    pub loops: Vec<LoopRecord>,
}

/// The full fetched catalog: packs in document order (newest prepended by
/// the generator, but nothing here relies on position).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub packs: Vec<PackRecord>,
}

impl Catalog {
    pub fn new(packs: Vec<PackRecord>) -> Self {
        Self { packs }
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// All loops from all packs, flattened in catalog order.
    pub fn all_loops(&self) -> Vec<LoopRecord> {
        self.packs.iter().flat_map(|p| p.loops.iter().cloned()).collect()
    }

    /// Unique pack numbers in document order. Entries whose `pack_number`
    /// doesn't parse as an integer are skipped.
    pub fn pack_numbers(&self) -> Vec<u32> {
        let mut numbers = Vec::new();
        for pack in &self.packs {
            if let Ok(n) = pack.pack_number.trim().parse::<u32>() {
                if !numbers.contains(&n) {
                    numbers.push(n);
                }
            }
        }
        numbers
    }

    /// The newest pack is the numeric maximum over all known pack numbers,
    /// not the first entry in the document.
    pub fn newest_pack(&self) -> Option<u32> {
        self.pack_numbers().into_iter().max()
    }

    pub fn loop_count(&self) -> usize {
        self.packs.iter().map(|p| p.loops.len()).sum()
    }
}
