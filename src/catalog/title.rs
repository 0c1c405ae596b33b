use regex::Regex;
use std::sync::LazyLock;

use crate::PACK_SEGMENT;
use crate::catalog::LoopRecord;

/// Structured fields derived from a loop's free-text title and URL.
/// Pure functions of the record: derivation never fails, malformed titles
/// resolve to the absent/zero defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub note: Option<String>,
    pub key: Option<String>,
    pub tempo: u32,
    pub pack_number: u32,
}

// Integer immediately preceding the first "bpm", any case: "120bpm", "90BPM"
static TEMPO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)bpm").unwrap());

// Pack number embedded in the URL path segment, e.g. .../RIGHTER_PACK39/...
static PACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{PACK_SEGMENT}(\d+)")).unwrap());

/// Derive all structured fields for one record.
pub fn derive_fields(record: &LoopRecord) -> DerivedFields {
    DerivedFields {
        note: extract_note(&record.title).map(str::to_string),
        key: extract_key(&record.title).map(str::to_string),
        tempo: extract_tempo(&record.title),
        pack_number: extract_pack_number(&record.url),
    }
}

/// First whitespace-delimited token that is a single letter A-G (any case).
pub fn extract_note(title: &str) -> Option<&str> {
    title
        .split_whitespace()
        .find(|t| t.len() == 1 && matches!(t.as_bytes()[0], b'A'..=b'G' | b'a'..=b'g'))
}

/// Everything after the first literal "bpm", trimmed. Deliberately lenient:
/// no validation that the remainder looks like a musical key, so a "bpm"
/// buried in an unrelated word still splits the title there.
pub fn extract_key(title: &str) -> Option<&str> {
    title
        .split_once("bpm")
        .map(|(_, rest)| rest.trim())
        .filter(|k| !k.is_empty())
}

/// Integer preceding the first "bpm" (case-insensitive), 0 if absent.
pub fn extract_tempo(title: &str) -> u32 {
    TEMPO_RE
        .captures(title)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// Pack number from the URL's `RIGHTER_PACK<N>` segment, 0 if absent.
pub fn extract_pack_number(url: &str) -> u32 {
    PACK_RE
        .captures(url)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// Title with the trailing "<NN>bpm <key>" tokens stripped for display.
/// Titles with two or fewer tokens are shown unchanged.
pub fn display_title(title: &str) -> String {
    let parts: Vec<&str> = title.split(' ').collect();
    if parts.len() > 2 {
        parts[..parts.len() - 2].join(" ")
    } else {
        title.to_string()
    }
}
