use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::catalog::fetch::{CatalogSource, FetchError};
use crate::catalog::{Catalog, LoopRecord, PackRecord};
use crate::config::AppConfig;
use crate::{PACK_SEGMENT, SUPPORTED_EXTENSIONS};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("directory '{0}' does not exist")]
    MissingDirectory(PathBuf),
    #[error("no audio files found in '{0}'")]
    NoAudioFiles(PathBuf),
    #[error("failed to fetch existing catalog: {0}")]
    Fetch(#[from] FetchError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize catalog: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

pub struct GenerateResult {
    pub output: PathBuf,
    pub new_loops: usize,
    pub existing_packs: usize,
    pub total_packs: usize,
}

// BPM and key embedded in a loop filename: "Song-Name-120bpm-C#min.wav"
static LOOP_STEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)bpm-([A-G]#?[a-z]+)").unwrap());

/// BPM/key info parsed from a loop file's stem.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedStem {
    pub title: String,
    pub bpm: Option<String>,
    pub key: Option<String>,
}

impl ParsedStem {
    /// Catalog title: `"<title> <bpm>bpm <key>"` when both parsed, otherwise
    /// the bare title.
    pub fn catalog_title(&self) -> String {
        match (&self.bpm, &self.key) {
            (Some(bpm), Some(key)) => format!("{} {bpm}bpm {key}", self.title),
            _ => self.title.clone(),
        }
    }
}

/// Parse a file stem for the `-<bpm>bpm-<key>` pattern. The title is the
/// stem with the pattern removed and hyphens turned into spaces; files
/// without the pattern fall back to the bare hyphens-to-spaces title.
pub fn parse_stem(stem: &str) -> ParsedStem {
    if let Some(caps) = LOOP_STEM_RE.captures(stem) {
        ParsedStem {
            title: LOOP_STEM_RE.replace(stem, "").replace('-', " "),
            bpm: Some(caps[1].to_string()),
            key: Some(caps[2].to_string()),
        }
    } else {
        ParsedStem {
            title: stem.replace('-', " "),
            bpm: None,
            key: None,
        }
    }
}

/// Percent-encoded download URL for one loop file. Sharp keys put `#` in
/// filenames, which must become `%23` to survive as a URL.
pub fn loop_url(base_url: &str, filename: &str) -> String {
    format!("{base_url}/{}", urlencoding::encode(filename))
}

/// CDN base URL for a pack's files.
pub fn pack_base_url(config: &AppConfig, pack_number: u32) -> String {
    format!("{}{PACK_SEGMENT}{pack_number}", config.cdn_prefix)
}

fn output_filename(pack_number: u32) -> String {
    format!("combined_loops_pack_{pack_number}.json")
}

/// Scan one directory (non-recursive) for audio files and build the new
/// pack record. Fails if the directory is missing or holds no audio files.
pub fn scan_new_loops(directory: &Path, pack_number: u32, config: &AppConfig) -> Result<PackRecord> {
    if !directory.is_dir() {
        return Err(GenerateError::MissingDirectory(directory.to_path_buf()));
    }

    let base_url = pack_base_url(config, pack_number);

    let mut audio_files: Vec<walkdir::DirEntry> = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            audio_files.push(entry);
        }
    }

    if audio_files.is_empty() {
        return Err(GenerateError::NoAudioFiles(directory.to_path_buf()));
    }

    let pb = ProgressBar::new(audio_files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Scanning...");

    let mut loops = Vec::with_capacity(audio_files.len());
    for entry in &audio_files {
        let filename = entry.file_name().to_string_lossy();
        let stem = entry
            .path()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let parsed = parse_stem(stem);
        let title = parsed.catalog_title();
        let url = loop_url(&base_url, &filename);

        log::info!("Added: {title} -> {filename}");
        loops.push(LoopRecord { url, title });
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} loops", loops.len()));

    Ok(PackRecord {
        pack_number: pack_number.to_string(),
        pack_url: Some(format!("{base_url}/{PACK_SEGMENT}{pack_number}.zip")),
        loops,
    })
}

/// Combine: the newly scanned pack prepended to the existing catalog.
pub fn build_combined(new_pack: PackRecord, existing: Catalog) -> Catalog {
    let mut packs = Vec::with_capacity(existing.packs.len() + 1);
    packs.push(new_pack);
    packs.extend(existing.packs);
    Catalog::new(packs)
}

/// Write the combined catalog under the fixed output name. The document is
/// serialized in full before anything touches the filesystem, so a failure
/// never leaves a partial file behind.
pub fn write_combined(combined: &Catalog, pack_number: u32, out_dir: &Path) -> Result<PathBuf> {
    let output = out_dir.join(output_filename(pack_number));
    let json = serde_json::to_string_pretty(combined)?;
    std::fs::write(&output, json)?;
    Ok(output)
}

/// Full generator run: fetch the published catalog (failures are fatal here,
/// there is no empty fallback for the generator), scan the directory, and
/// write the combined document to the current directory.
pub fn run(
    directory: &Path,
    pack_number: u32,
    source: &dyn CatalogSource,
    config: &AppConfig,
) -> Result<GenerateResult> {
    println!("Fetching existing loops from {}...", config.catalog_url);
    let existing = source.fetch()?;
    let existing_packs = existing.packs.len();
    println!("Found {existing_packs} existing packs");

    println!(
        "Scanning new loops in '{}' for pack {pack_number}...",
        directory.display()
    );
    let new_pack = scan_new_loops(directory, pack_number, config)?;
    let new_loops = new_pack.loops.len();
    println!("Found {new_loops} new loops");

    let combined = build_combined(new_pack, existing);
    let total_packs = combined.packs.len();
    let output = write_combined(&combined, pack_number, Path::new("."))?;

    Ok(GenerateResult {
        output,
        new_loops,
        existing_packs,
        total_packs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stem_with_bpm_and_key() {
        let parsed = parse_stem("Song-Name-120bpm-C#min");
        assert_eq!(parsed.title, "Song Name");
        assert_eq!(parsed.bpm.as_deref(), Some("120"));
        assert_eq!(parsed.key.as_deref(), Some("C#min"));
        assert_eq!(parsed.catalog_title(), "Song Name 120bpm C#min");
    }

    #[test]
    fn test_parse_stem_pattern_mid_name() {
        let parsed = parse_stem("Front-90bpm-Amaj-Back");
        assert_eq!(parsed.title, "Front Back");
        assert_eq!(parsed.bpm.as_deref(), Some("90"));
        assert_eq!(parsed.key.as_deref(), Some("Amaj"));
    }

    #[test]
    fn test_parse_stem_fallback_without_pattern() {
        let parsed = parse_stem("just-a-loop");
        assert_eq!(parsed.title, "just a loop");
        assert_eq!(parsed.bpm, None);
        assert_eq!(parsed.key, None);
        assert_eq!(parsed.catalog_title(), "just a loop");
    }

    #[test]
    fn test_loop_url_percent_encodes() {
        let url = loop_url(
            "https://d23vnzhpxwsomk.cloudfront.net/RIGHTER_PACK39",
            "Song-Name-120bpm-C#min.wav",
        );
        assert_eq!(
            url,
            "https://d23vnzhpxwsomk.cloudfront.net/RIGHTER_PACK39/Song-Name-120bpm-C%23min.wav"
        );
    }

    #[test]
    fn test_scan_builds_pack_record() {
        let config = AppConfig::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Riff-90bpm-Amin.wav"), b"").unwrap();
        std::fs::write(dir.path().join("Other-120bpm-C#min.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let pack = scan_new_loops(dir.path(), 41, &config).unwrap();
        assert_eq!(pack.pack_number, "41");
        assert_eq!(
            pack.pack_url.as_deref(),
            Some("https://d23vnzhpxwsomk.cloudfront.net/RIGHTER_PACK41/RIGHTER_PACK41.zip")
        );
        // Sorted by filename, non-audio files and directories skipped
        assert_eq!(pack.loops.len(), 2);
        assert_eq!(pack.loops[0].title, "Other 120bpm C#min");
        assert!(pack.loops[0].url.ends_with("Other-120bpm-C%23min.mp3"));
        assert_eq!(pack.loops[1].title, "Riff 90bpm Amin");
    }

    #[test]
    fn test_scan_uppercase_extension_accepted() {
        let config = AppConfig::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Riff-90bpm-Amin.WAV"), b"").unwrap();
        let pack = scan_new_loops(dir.path(), 41, &config).unwrap();
        assert_eq!(pack.loops.len(), 1);
    }

    #[test]
    fn test_scan_missing_directory_is_fatal() {
        let config = AppConfig::default();
        let err = scan_new_loops(Path::new("/no/such/dir"), 41, &config).unwrap_err();
        assert!(matches!(err, GenerateError::MissingDirectory(_)));
    }

    #[test]
    fn test_scan_no_audio_files_is_fatal() {
        let config = AppConfig::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let err = scan_new_loops(dir.path(), 41, &config).unwrap_err();
        assert!(matches!(err, GenerateError::NoAudioFiles(_)));
    }

    #[test]
    fn test_combined_puts_new_pack_first() {
        let new_pack = PackRecord {
            pack_number: "41".to_string(),
            pack_url: None,
            loops: vec![],
        };
        let existing = Catalog::new(vec![PackRecord {
            pack_number: "40".to_string(),
            pack_url: None,
            loops: vec![],
        }]);
        let combined = build_combined(new_pack, existing);
        assert_eq!(combined.packs[0].pack_number, "41");
        assert_eq!(combined.packs[1].pack_number, "40");
    }

    #[test]
    fn test_write_combined_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let combined = Catalog::new(vec![PackRecord {
            pack_number: "41".to_string(),
            pack_url: Some("https://cdn.example/RIGHTER_PACK41/RIGHTER_PACK41.zip".to_string()),
            loops: vec![LoopRecord {
                url: "https://cdn.example/RIGHTER_PACK41/Riff-90bpm-Amin.wav".to_string(),
                title: "Riff 90bpm Amin".to_string(),
            }],
        }]);

        let output = write_combined(&combined, 41, dir.path()).unwrap();
        assert_eq!(
            output.file_name().unwrap().to_str().unwrap(),
            "combined_loops_pack_41.json"
        );
        let read: Catalog =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(read, combined);
    }
}
